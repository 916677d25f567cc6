use crate::clock::parse_entry;
use crate::config::Mode;
use crate::error::Result;
use crossterm::event::KeyCode;

/// What a key press did to the entry form.
#[derive(Debug, PartialEq, Eq)]
pub enum EntryAction {
  Editing,
  Cancelled,
  Submitted,
}

/// The "Set Timer" form: a single line of text.
#[derive(Debug, Default, Clone)]
pub struct DurationEntry {
  buffer: String,
}

impl DurationEntry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn text(&self) -> &str {
    &self.buffer
  }

  pub fn on_key(&mut self, code: KeyCode) -> EntryAction {
    match code {
      KeyCode::Esc => EntryAction::Cancelled,
      KeyCode::Enter => EntryAction::Submitted,
      KeyCode::Backspace => {
        self.buffer.pop();
        EntryAction::Editing
      }
      KeyCode::Char(c) if c.is_ascii_alphanumeric() || c == ':' || c == ' ' => {
        self.buffer.push(c);
        EntryAction::Editing
      }
      _ => EntryAction::Editing,
    }
  }

  pub fn seconds(&self, mode: Mode) -> Result<u64> {
    parse_entry(&self.buffer, mode)
  }
}
