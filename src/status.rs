use ratatui::prelude::*;

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum RunStatus {
  #[default]
  Idle,
  Running,
  Paused,
}

impl std::fmt::Display for RunStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      RunStatus::Idle => write!(f, "Idle"),
      RunStatus::Running => write!(f, "Running"),
      RunStatus::Paused => write!(f, "Paused"),
    }
  }
}

pub trait StatusDisplay {
  fn colored(&self) -> (&str, Color);
}

impl StatusDisplay for RunStatus {
  fn colored(&self) -> (&str, Color) {
    match self {
      RunStatus::Idle => ("■", Color::White),
      RunStatus::Running => ("▶", Color::Green),
      RunStatus::Paused => ("⏸", Color::Yellow),
    }
  }
}
