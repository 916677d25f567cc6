use crate::config::Mode;
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockFormat {
  MinutesSeconds,
  HoursMinutesSeconds,
}

/// Render a number of seconds as a zero-padded clock face.
pub fn format_clock(seconds: u64, format: ClockFormat) -> String {
  match format {
    ClockFormat::MinutesSeconds => format!("{:02}:{:02}", seconds / 60, seconds % 60),
    ClockFormat::HoursMinutesSeconds => format!(
      "{:02}:{:02}:{:02}",
      seconds / 3600,
      (seconds % 3600) / 60,
      seconds % 60
    ),
  }
}

fn invalid(input: &str, reason: impl Into<String>) -> AppError {
  AppError::InvalidDuration {
    input: input.to_string(),
    reason: reason.into(),
  }
}

fn minutes_to_seconds(input: &str, minutes: u64) -> Result<u64> {
  minutes
    .checked_mul(60)
    .ok_or_else(|| invalid(input, "duration is too large"))
}

fn parse_field(input: &str, field: &str) -> Result<u64> {
  field
    .trim()
    .parse::<u64>()
    .map_err(|_| invalid(input, format!("'{}' is not a whole number", field.trim())))
}

fn parse_colon_form(input: &str, text: &str) -> Result<u64> {
  let fields: Vec<&str> = text.split(':').collect();

  let (hours, minutes, seconds) = match fields.as_slice() {
    [m, s] => (0, parse_field(input, m)?, parse_field(input, s)?),
    [h, m, s] => (
      parse_field(input, h)?,
      parse_field(input, m)?,
      parse_field(input, s)?,
    ),
    _ => return Err(invalid(input, "expected H:M:S or M:S")),
  };

  // При наличии часов минуты ограничены 59, как и секунды
  if seconds >= 60 || (fields.len() == 3 && minutes >= 60) {
    return Err(invalid(input, "minutes and seconds must be below 60"));
  }

  hours
    .checked_mul(3600)
    .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
    .and_then(|hm| hm.checked_add(seconds))
    .ok_or_else(|| invalid(input, "duration is too large"))
}

/// Parse the text typed into the duration entry form into seconds.
///
/// A bare number is always read as minutes. The advanced mode also
/// understands `H:M:S`, `M:S` and unit strings such as `1h 30m`.
pub fn parse_entry(input: &str, mode: Mode) -> Result<u64> {
  let text = input.trim();

  if text.is_empty() {
    return Err(invalid(input, "no duration entered"));
  }

  if let Ok(minutes) = text.parse::<u64>() {
    return minutes_to_seconds(input, minutes);
  }

  match mode {
    Mode::Basic => Err(invalid(input, "enter a whole number of minutes")),
    Mode::Advanced if text.contains(':') => parse_colon_form(input, text),
    Mode::Advanced => parse_duration::parse(text)
      .map(|duration| duration.as_secs())
      .map_err(|e| invalid(input, e.to_string())),
  }
}
