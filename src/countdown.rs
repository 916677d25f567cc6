//! The countdown state machine. It knows nothing about terminals, timers or
//! audio: the app feeds it commands and one `tick()` per elapsed second, and
//! reacts to the notices it returns.

use crate::clock::format_clock;
use crate::config::Mode;
use crate::status::RunStatus;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
  /// The clock face changed.
  DisplayUpdate { remaining: u64 },
  /// The countdown reached zero. Emitted once per countdown.
  Completed,
}

#[derive(Debug, Default, Clone)]
pub struct Countdown {
  mode: Mode,
  remaining: u64,
  status: RunStatus,
  // None пока не мигаем, иначе текущая фаза
  flash: Option<bool>,
  alerting: bool,
}

impl Countdown {
  pub fn new(mode: Mode) -> Self {
    Self {
      mode,
      ..Self::default()
    }
  }

  pub fn mode(&self) -> Mode {
    self.mode
  }

  pub fn remaining(&self) -> u64 {
    self.remaining
  }

  pub fn status(&self) -> RunStatus {
    self.status
  }

  pub fn is_running(&self) -> bool {
    self.status == RunStatus::Running
  }

  /// Current flash phase, `None` when not flashing.
  pub fn flash_phase(&self) -> Option<bool> {
    self.flash
  }

  pub fn is_flashing(&self) -> bool {
    self.flash.is_some()
  }

  /// True between completion and the next reset or new duration.
  pub fn is_alerting(&self) -> bool {
    self.alerting
  }

  pub fn can_set_duration(&self) -> bool {
    self.mode.allows_set_while_running() || !self.is_running()
  }

  /// Replace the remaining duration. Returns false when the current mode
  /// refuses to change a running countdown.
  pub fn set_duration(&mut self, seconds: u64) -> bool {
    if !self.can_set_duration() {
      debug!(seconds, "duration change refused while running");
      return false;
    }

    // С нулём на паузе нечего продолжать
    if self.mode.allows_set_while_running() || seconds == 0 {
      self.status = RunStatus::Idle;
    }

    self.flash = None;
    self.alerting = false;
    self.remaining = seconds;
    debug!(seconds, status = %self.status, "duration set");

    true
  }

  pub fn start(&mut self) -> bool {
    if self.is_running() || self.remaining == 0 {
      return false;
    }

    self.status = RunStatus::Running;
    debug!(remaining = self.remaining, "countdown started");

    true
  }

  pub fn pause(&mut self) -> bool {
    if !self.is_running() {
      return false;
    }

    self.status = RunStatus::Paused;
    debug!(remaining = self.remaining, "countdown paused");

    true
  }

  pub fn reset(&mut self) {
    self.status = RunStatus::Idle;
    self.remaining = 0;
    self.flash = None;
    self.alerting = false;
    debug!("countdown reset");
  }

  /// Advance by one second. Does nothing unless running.
  pub fn tick(&mut self) -> Vec<Notice> {
    if !self.is_running() {
      return Vec::new();
    }

    self.remaining = self.remaining.saturating_sub(1);

    let mut notices = vec![Notice::DisplayUpdate {
      remaining: self.remaining,
    }];

    if self.remaining == 0 {
      self.status = RunStatus::Idle;
      self.alerting = true;

      if self.mode.flashes() {
        self.flash = Some(true);
      }

      notices.push(Notice::Completed);
    }

    notices
  }

  pub fn toggle_flash(&mut self) {
    if let Some(phase) = self.flash.as_mut() {
      *phase = !*phase;
    }
  }

  pub fn display(&self) -> String {
    format_clock(self.remaining, self.mode.clock_format())
  }
}
