pub mod alarm;
pub mod app;
pub mod clock;
pub mod config;
pub mod countdown;
pub mod entry;
pub mod error;
pub mod model;
pub mod render;
pub mod status;

use alarm::Alarm;
use app::App;
use clap::Parser;
use config::{Cli, Config};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::prelude::*;

const LOG_ENV: &str = "COUNTDOWN_LOG";

// Терминал занят интерфейсом, поэтому логи пишутся только в файл
fn init_logging(cli: &Cli) {
  let path = cli
    .log_file
    .clone()
    .or_else(|| std::env::var_os(LOG_ENV).map(PathBuf::from));

  let Some(path) = path else {
    return;
  };

  match File::create(&path) {
    Ok(file) => {
      let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false);
      let filter = tracing_subscriber::EnvFilter::new(format!("countdown={}", cli.log_level()));
      if let Err(err) = tracing_subscriber::registry()
        .with(file_layer.with_filter(filter))
        .try_init()
      {
        eprintln!("Failed to initialize logging: {}", err);
      }
    }
    Err(err) => {
      eprintln!("Failed to create log file {:?}: {}", path, err);
    }
  }
}

pub async fn run() -> anyhow::Result<()> {
  let cli = Cli::parse();
  init_logging(&cli);

  // Загрузка конфигурации
  let config = Config::load(&cli)?;

  // Поиск файла будильника
  let alarm = Alarm::discover(&config.alarm_candidates())?;

  App::new(config, alarm).run().await?;

  Ok(())
}
