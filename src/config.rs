use crate::clock::ClockFormat;
use crate::error::{AppError, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
pub enum Mode {
  /// MM:SS display, whole minutes, no flashing.
  #[serde(rename = "basic")]
  Basic,
  /// HH:MM:SS display, flexible entry, flashing on completion.
  #[default]
  #[serde(rename = "advanced")]
  Advanced,
}

impl Mode {
  pub fn clock_format(self) -> ClockFormat {
    match self {
      Mode::Basic => ClockFormat::MinutesSeconds,
      Mode::Advanced => ClockFormat::HoursMinutesSeconds,
    }
  }

  pub fn flashes(self) -> bool {
    self == Mode::Advanced
  }

  /// Whether a new duration may replace a countdown that is still running.
  pub fn allows_set_while_running(self) -> bool {
    self == Mode::Advanced
  }

  pub fn default_alarm_candidates(self) -> Vec<String> {
    let names: &[&str] = match self {
      Mode::Basic => &["alarm.wav"],
      Mode::Advanced => &["alarm.wav", "alarm.mp3", "alarm.ogg", "alarm.flac"],
    };

    names.iter().map(|name| name.to_string()).collect()
  }
}

#[derive(Debug, Clone)]
pub enum ConfigSource {
  TomlFile(PathBuf),
  JsonFile(PathBuf),
}

// Порядок проверки файлов
const FILE_CANDIDATES: [(&str, fn(PathBuf) -> ConfigSource); 4] = [
  (".countdown.toml", ConfigSource::TomlFile),
  ("countdown.toml", ConfigSource::TomlFile),
  (".countdown.json", ConfigSource::JsonFile),
  ("countdown.json", ConfigSource::JsonFile),
];

const DEFAULT_FLASH_INTERVAL_MS: u64 = 500;

/// Command line arguments. Values given here win over the config file.
#[derive(Debug, Default, Parser)]
#[command(name = "countdown")]
#[command(about = "A terminal countdown timer with an alarm")]
#[command(version)]
pub struct Cli {
  /// Display and input flavour
  #[arg(short, long, value_enum)]
  pub mode: Option<Mode>,

  /// Initial duration, e.g. "25", "1:30:00" or "90s"
  #[arg(short, long)]
  pub duration: Option<String>,

  /// Explicit config file (TOML or JSON)
  #[arg(short, long)]
  pub config: Option<PathBuf>,

  /// Write logs to this file
  #[arg(long)]
  pub log_file: Option<PathBuf>,

  /// Enable verbose logging
  #[arg(short, long)]
  pub verbose: bool,
}

impl Cli {
  pub fn log_level(&self) -> &'static str {
    if self.verbose { "debug" } else { "info" }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub mode: Mode,

  // Текст начальной длительности, разбирается как ввод пользователя
  #[serde(default)]
  pub duration: Option<String>,

  #[serde(default)]
  alarm_candidates: Option<Vec<String>>,

  #[serde(default)]
  flash_interval_ms: Option<u64>,
}

impl Config {
  pub fn alarm_candidates(&self) -> Vec<String> {
    self
      .alarm_candidates
      .clone()
      .unwrap_or_else(|| self.mode.default_alarm_candidates())
  }

  pub fn flash_interval(&self) -> Duration {
    let millis = self
      .flash_interval_ms
      .filter(|ms| *ms > 0)
      .unwrap_or(DEFAULT_FLASH_INTERVAL_MS);

    Duration::from_millis(millis)
  }

  pub fn apply_cli(&mut self, cli: &Cli) {
    if let Some(mode) = cli.mode {
      self.mode = mode;
    }

    if let Some(duration) = &cli.duration {
      self.duration = Some(duration.clone());
    }
  }

  pub fn find_file_in(dir: &Path) -> Option<ConfigSource> {
    FILE_CANDIDATES.iter().find_map(|(filename, source_fn)| {
      let path = dir.join(filename);
      path.is_file().then(|| source_fn(path))
    })
  }

  fn source_for(path: &Path) -> Result<ConfigSource> {
    if !path.is_file() {
      return Err(AppError::ConfigNotFound {
        path: path.to_path_buf(),
      });
    }

    let is_json = path
      .extension()
      .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    Ok(if is_json {
      ConfigSource::JsonFile(path.to_path_buf())
    } else {
      ConfigSource::TomlFile(path.to_path_buf())
    })
  }

  /// Load the explicit file if one is given, otherwise the first candidate
  /// found in `dir`. No file at all means defaults.
  pub fn load_from(dir: &Path, explicit: Option<&Path>) -> Result<Config> {
    let source = match explicit {
      Some(path) => Some(Self::source_for(path)?),
      None => Self::find_file_in(dir),
    };

    match source {
      Some(source) => Self::read(source),
      None => Ok(Config::default()),
    }
  }

  pub fn load(cli: &Cli) -> Result<Config> {
    let current_dir = std::env::current_dir()?;
    let mut config = Self::load_from(&current_dir, cli.config.as_deref())?;
    config.apply_cli(cli);

    Ok(config)
  }

  fn read(source: ConfigSource) -> Result<Config> {
    match source {
      ConfigSource::TomlFile(path) => {
        let config_content = fs::read_to_string(&path).map_err(|e| AppError::ConfigInvalid {
          path: path.clone(),
          details: format!("Failed to read toml file: {}", e),
        })?;

        let config: Config =
          toml::from_str(&config_content).map_err(|e| AppError::ConfigInvalid {
            path: path.clone(),
            details: format!("Invalid TOML: {}", e),
          })?;

        Ok(config)
      }
      ConfigSource::JsonFile(path) => {
        let config_content = fs::read_to_string(&path).map_err(|e| AppError::ConfigInvalid {
          path: path.clone(),
          details: format!("Failed to read json file: {}", e),
        })?;

        let config: Config =
          serde_json::from_str(&config_content).map_err(|e| AppError::ConfigInvalid {
            path: path.clone(),
            details: format!("Invalid JSON: {}", e),
          })?;

        Ok(config)
      }
    }
  }
}
