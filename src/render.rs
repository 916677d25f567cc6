use crate::config::Mode;
use crate::model::StateModel;
use crate::status::StatusDisplay;

use ratatui::{
  prelude::*,
  widgets::{Block, Borders, Clear, Paragraph},
};

const GLYPH_HEIGHT: usize = 5;

// Цифры 3x5 для большого циферблата
fn glyph(c: char) -> [&'static str; GLYPH_HEIGHT] {
  match c {
    '0' => ["███", "█ █", "█ █", "█ █", "███"],
    '1' => ["  █", "  █", "  █", "  █", "  █"],
    '2' => ["███", "  █", "███", "█  ", "███"],
    '3' => ["███", "  █", "███", "  █", "███"],
    '4' => ["█ █", "█ █", "███", "  █", "  █"],
    '5' => ["███", "█  ", "███", "  █", "███"],
    '6' => ["███", "█  ", "███", "█ █", "███"],
    '7' => ["███", "  █", "  █", "  █", "  █"],
    '8' => ["███", "█ █", "███", "█ █", "███"],
    '9' => ["███", "█ █", "███", "  █", "███"],
    ':' => [" ", "█", " ", "█", " "],
    _ => [" ", " ", " ", " ", " "],
  }
}

/// Lines of large block text for a clock face such as `01:30:00`.
pub fn big_digits(text: &str) -> Vec<String> {
  (0..GLYPH_HEIGHT)
    .map(|row| {
      text
        .chars()
        .map(|c| glyph(c)[row])
        .collect::<Vec<_>>()
        .join(" ")
    })
    .collect()
}

fn clock_color(model: &StateModel) -> Color {
  match model.flash_phase {
    Some(true) => Color::Red,
    Some(false) => Color::DarkGray,
    None if model.mode == Mode::Advanced => model.status.colored().1,
    None => Color::White,
  }
}

fn render_clock(model: &StateModel) -> Paragraph<'_> {
  let color = clock_color(model);
  let lines: Vec<Line> = big_digits(&model.clock)
    .into_iter()
    .map(|row| Line::from(row).style(Style::default().fg(color).add_modifier(Modifier::BOLD)))
    .collect();

  Paragraph::new(lines).alignment(Alignment::Center)
}

fn render_status(model: &StateModel) -> Paragraph<'_> {
  let (symbol, color) = model.status.colored();

  Paragraph::new(format!("{} {}  {}", symbol, model.status, model.clock))
    .alignment(Alignment::Center)
    .style(Style::default().fg(color))
}

fn render_button<'a>(key: &'a str, label: &'a str, enabled: bool) -> Paragraph<'a> {
  let style = if enabled {
    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::DarkGray)
  };

  Paragraph::new(format!("[{}] {}", key, label))
    .alignment(Alignment::Center)
    .style(style)
    .block(Block::default().borders(Borders::ALL).border_style(style))
}

fn render_footer(model: &StateModel) -> Paragraph<'_> {
  let text = match (&model.message, &model.sound) {
    (Some(message), _) => message.clone(),
    (None, Some(sound)) => format!("Alarm: {}  |  [s] Set  [q] Quit", sound),
    (None, None) => "No alarm sound  |  [s] Set  [q] Quit".to_string(),
  };

  Paragraph::new(text)
    .alignment(Alignment::Center)
    .style(Style::default().fg(Color::Cyan))
}

fn render_entry<'a>(model: &StateModel, text: &'a str) -> Paragraph<'a> {
  let prompt = match model.mode {
    Mode::Basic => "Enter minutes:",
    Mode::Advanced => "Minutes, H:M:S or 1h 30m:",
  };

  Paragraph::new(vec![
    Line::from(prompt),
    Line::from(format!("> {}_", text)).bold(),
    Line::from("[Enter] OK  [Esc] Cancel").fg(Color::DarkGray),
  ])
  .block(Block::default().borders(Borders::ALL).title("Set Timer"))
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);

  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}

pub fn render_frame(frame: &mut Frame, model: &StateModel) {
  let areas = Layout::default()
    .direction(Direction::Vertical)
    .margin(1)
    .constraints([
      Constraint::Min(0),
      Constraint::Length(3),
      Constraint::Length(1),
    ])
    .split(frame.area());

  let clock_areas = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Fill(1),
      Constraint::Length(GLYPH_HEIGHT as u16),
      Constraint::Length(2),
      Constraint::Length(1),
      Constraint::Fill(1),
    ])
    .split(areas[0]);

  frame.render_widget(render_clock(model), clock_areas[1]);
  frame.render_widget(render_status(model), clock_areas[3]);

  let buttons = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([
      Constraint::Ratio(1, 3),
      Constraint::Ratio(1, 3),
      Constraint::Ratio(1, 3),
    ])
    .split(areas[1]);

  frame.render_widget(render_button("Enter", "Start", model.start_enabled), buttons[0]);
  frame.render_widget(render_button("p", "Pause", model.pause_enabled), buttons[1]);
  frame.render_widget(render_button("r", "Reset", true), buttons[2]);

  frame.render_widget(render_footer(model), areas[2]);

  if let Some(text) = &model.entry {
    let popup = centered_rect(40, 5, frame.area());
    frame.render_widget(Clear, popup);
    frame.render_widget(render_entry(model, text), popup);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::status::RunStatus;
  use ratatui::backend::TestBackend;

  fn draw(model: &StateModel) -> String {
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    terminal.draw(|f| render_frame(f, model)).unwrap();

    terminal
      .backend()
      .buffer()
      .content
      .iter()
      .map(|cell| cell.symbol())
      .collect()
  }

  fn model() -> StateModel {
    StateModel {
      mode: Mode::Advanced,
      clock: "01:01:01".to_string(),
      status: RunStatus::Idle,
      start_enabled: true,
      ..StateModel::default()
    }
  }

  #[test]
  fn big_digits_have_fixed_height() {
    let rows = big_digits("12:34");
    assert_eq!(rows.len(), GLYPH_HEIGHT);
    assert!(rows.iter().all(|row| row.chars().count() == rows[0].chars().count()));
  }

  #[test]
  fn draws_clock_controls_and_footer() {
    let screen = draw(&model());

    assert!(screen.contains("█"));
    assert!(screen.contains("Idle  01:01:01"));
    assert!(screen.contains("[Enter] Start"));
    assert!(screen.contains("[p] Pause"));
    assert!(screen.contains("[r] Reset"));
    assert!(screen.contains("No alarm sound"));
  }

  #[test]
  fn message_replaces_footer_hint() {
    let screen = draw(&StateModel {
      message: Some("Invalid duration".to_string()),
      ..model()
    });

    assert!(screen.contains("Invalid duration"));
    assert!(!screen.contains("No alarm sound"));
  }

  #[test]
  fn entry_popup_is_drawn_over_the_clock() {
    let screen = draw(&StateModel {
      entry: Some("1:30".to_string()),
      ..model()
    });

    assert!(screen.contains("Set Timer"));
    assert!(screen.contains("> 1:30_"));
  }

  #[test]
  fn flash_phase_overrides_status_color() {
    let mut state = model();
    state.status = RunStatus::Running;
    assert_eq!(clock_color(&state), Color::Green);

    state.flash_phase = Some(true);
    assert_eq!(clock_color(&state), Color::Red);
    state.flash_phase = Some(false);
    assert_eq!(clock_color(&state), Color::DarkGray);
  }
}
