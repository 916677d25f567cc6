use crate::config::Mode;
use crate::status::RunStatus;

/// Everything the renderer needs for one frame.
#[derive(Debug, Default, Clone)]
pub struct StateModel {
  pub mode: Mode,
  pub clock: String,
  pub status: RunStatus,
  pub flash_phase: Option<bool>,
  pub start_enabled: bool,
  pub pause_enabled: bool,
  pub entry: Option<String>,
  pub message: Option<String>,
  pub sound: Option<String>,
}
