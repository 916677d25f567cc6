use crate::alarm::Alarm;
use crate::config::Config;
use crate::countdown::{Countdown, Notice};
use crate::entry::{DurationEntry, EntryAction};
use crate::error::Result;
use crate::model::StateModel;
use crate::render::render_frame;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// What woke the main loop up.
enum Step {
  Input(Option<std::io::Result<Event>>),
  Tick,
  Flash,
}

fn every(period: Duration) -> Interval {
  // Первый тик через полный период, а не сразу
  let mut interval = interval_at(Instant::now() + period, period);
  interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
  interval
}

async fn next_tick(interval: &mut Option<Interval>) {
  match interval {
    Some(interval) => {
      interval.tick().await;
    }
    None => std::future::pending::<()>().await,
  }
}

pub struct App {
  /// Is the application running?
  running: bool,
  config: Config,
  countdown: Countdown,
  alarm: Alarm,
  entry: Option<DurationEntry>,
  message: Option<String>,
  // Интервалы существуют только пока нужны, drop отменяет их
  ticker: Option<Interval>,
  flasher: Option<Interval>,
}

impl App {
  /// Construct a new instance of [`App`].
  pub fn new(config: Config, alarm: Alarm) -> Self {
    let mut countdown = Countdown::new(config.mode);
    let mut message = None;

    if let Some(text) = &config.duration {
      match crate::clock::parse_entry(text, config.mode) {
        Ok(seconds) => {
          countdown.set_duration(seconds);
        }
        Err(e) => {
          warn!("ignoring initial duration: {}", e);
          message = Some(e.to_string());
        }
      }
    }

    if message.is_none() && alarm.sound().is_none() {
      message = Some("No alarm sound found, the countdown will finish silently".to_string());
    }

    Self {
      running: false,
      config,
      countdown,
      alarm,
      entry: None,
      message,
      ticker: None,
      flasher: None,
    }
  }

  pub fn countdown(&self) -> &Countdown {
    &self.countdown
  }

  /// Run the application's main loop.
  pub async fn run(mut self) -> Result<()> {
    self.running = true;

    let mut terminal = ratatui::init();
    let result = self.main_loop(&mut terminal).await;
    ratatui::restore();

    result
  }

  async fn main_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
    let mut event_stream = EventStream::new();

    info!(mode = ?self.config.mode, "countdown ready");

    while self.running {
      let model = self.snapshot();
      terminal.draw(|frame| render_frame(frame, &model))?;

      let step = tokio::select! {
        event = event_stream.next() => Step::Input(event),
        _ = next_tick(&mut self.ticker) => Step::Tick,
        _ = next_tick(&mut self.flasher) => Step::Flash,
      };

      match step {
        Step::Input(Some(Ok(Event::Key(key)))) if key.kind == KeyEventKind::Press => {
          self.on_key_event(key)
        }
        Step::Input(Some(Ok(_))) => {}
        Step::Input(Some(Err(e))) => return Err(e.into()),
        Step::Input(None) => self.quit(),
        Step::Tick => self.on_tick(),
        Step::Flash => self.countdown.toggle_flash(),
      }

      self.sync_schedule();
    }

    Ok(())
  }

  /// Build the view of the current state.
  pub fn snapshot(&self) -> StateModel {
    StateModel {
      mode: self.countdown.mode(),
      clock: self.countdown.display(),
      status: self.countdown.status(),
      flash_phase: self.countdown.flash_phase(),
      start_enabled: !self.countdown.is_running() && self.countdown.remaining() > 0,
      pause_enabled: self.countdown.is_running(),
      entry: self.entry.as_ref().map(|entry| entry.text().to_string()),
      message: self.message.clone(),
      sound: self
        .alarm
        .sound()
        .and_then(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned()),
    }
  }

  /// Handles the key events and updates the state of [`App`].
  pub fn on_key_event(&mut self, key: KeyEvent) {
    if let (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) =
      (key.modifiers, key.code)
    {
      self.quit();
      return;
    }

    if let Some(entry) = self.entry.as_mut() {
      match entry.on_key(key.code) {
        EntryAction::Editing => {}
        EntryAction::Cancelled => {
          self.entry = None;
        }
        EntryAction::Submitted => self.submit_entry(),
      }
      return;
    }

    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => self.quit(),
      KeyCode::Char('s') => self.open_entry(),
      KeyCode::Enter | KeyCode::Char(' ') => {
        self.countdown.start();
      }
      KeyCode::Char('p') => {
        self.countdown.pause();
      }
      KeyCode::Char('r') => {
        self.countdown.reset();
        self.message = None;
      }
      _ => {}
    }
  }

  fn open_entry(&mut self) {
    if self.countdown.can_set_duration() {
      self.entry = Some(DurationEntry::new());
      self.message = None;
    } else {
      self.message = Some("Pause or reset the timer before setting a new duration".to_string());
    }
  }

  fn submit_entry(&mut self) {
    let Some(entry) = self.entry.take() else {
      return;
    };

    match entry.seconds(self.countdown.mode()) {
      Ok(seconds) => {
        if self.countdown.set_duration(seconds) {
          self.message = None;
        }
      }
      Err(e) => {
        debug!("duration entry rejected: {}", e);
        self.message = Some(e.to_string());
      }
    }
  }

  /// One elapsed second.
  pub fn on_tick(&mut self) {
    for notice in self.countdown.tick() {
      match notice {
        Notice::DisplayUpdate { remaining } => debug!(remaining, "tick"),
        Notice::Completed => {
          info!("countdown complete");
          if !self.alarm.play() && self.alarm.sound().is_none() {
            self.message = Some("Time is up! (no alarm sound)".to_string());
          }
        }
      }
    }
  }

  /// Bring the periodic callbacks and the alarm in line with the countdown.
  pub fn sync_schedule(&mut self) {
    if self.countdown.is_running() {
      if self.ticker.is_none() {
        self.ticker = Some(every(TICK_PERIOD));
      }
    } else {
      self.ticker = None;
    }

    if self.countdown.is_flashing() {
      if self.flasher.is_none() {
        self.flasher = Some(every(self.config.flash_interval()));
      }
    } else {
      self.flasher = None;
    }

    if !self.countdown.is_alerting() {
      self.alarm.stop();
    }
  }

  #[cfg(test)]
  fn is_ticking(&self) -> bool {
    self.ticker.is_some()
  }

  #[cfg(test)]
  fn is_flash_scheduled(&self) -> bool {
    self.flasher.is_some()
  }

  /// Set running to false to quit the application.
  fn quit(&mut self) {
    self.running = false;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::alarm::test_support::RecordingOutput;
  use crate::config::{Cli, Mode};
  use crate::status::RunStatus;
  use clap::Parser;

  fn app_with_alarm(args: &[&str], alarm: Alarm) -> App {
    let cli = Cli::parse_from(std::iter::once("countdown").chain(args.iter().copied()));
    let mut config = Config::default();
    config.apply_cli(&cli);

    let mut app = App::new(config, alarm);
    app.running = true;
    app
  }

  fn new_app(args: &[&str]) -> App {
    app_with_alarm(args, Alarm::new(None))
  }

  fn ringing_app(args: &[&str]) -> (App, RecordingOutput) {
    let output = RecordingOutput::default();
    let alarm = Alarm::with_output(Some("alarm.wav".into()), Box::new(output.clone()));
    let mut app = app_with_alarm(args, alarm);

    press(&mut app, KeyCode::Enter);
    app.on_tick();
    app.sync_schedule();
    assert!(output.is_playing());

    (app, output)
  }

  fn press(app: &mut App, code: KeyCode) {
    app.on_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    app.sync_schedule();
  }

  fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
      press(app, KeyCode::Char(c));
    }
  }

  #[tokio::test]
  async fn initial_duration_comes_from_config() {
    let app = new_app(&["--mode", "basic", "--duration", "2"]);
    assert_eq!(app.countdown().remaining(), 120);
    assert_eq!(app.snapshot().clock, "02:00");
    assert!(app.snapshot().start_enabled);
  }

  #[tokio::test]
  async fn invalid_initial_duration_is_reported() {
    let app = new_app(&["--duration", "soon"]);
    assert_eq!(app.countdown().remaining(), 0);
    assert!(app.snapshot().message.unwrap().contains("soon"));
  }

  #[tokio::test]
  async fn start_schedules_ticks_and_pause_cancels_them() {
    let mut app = new_app(&["--duration", "0:10"]);
    assert!(!app.is_ticking());

    press(&mut app, KeyCode::Enter);
    assert!(app.is_ticking());
    assert!(app.snapshot().pause_enabled);
    assert!(!app.snapshot().start_enabled);

    for _ in 0..3 {
      app.on_tick();
    }
    press(&mut app, KeyCode::Char('p'));

    assert!(!app.is_ticking());
    assert_eq!(app.countdown().remaining(), 7);
    assert_eq!(app.countdown().status(), RunStatus::Paused);
  }

  #[tokio::test]
  async fn completion_starts_flashing_until_reset() {
    let mut app = new_app(&["--duration", "0:02"]);
    press(&mut app, KeyCode::Char(' '));

    app.on_tick();
    app.on_tick();
    app.sync_schedule();

    assert!(!app.is_ticking());
    assert!(app.is_flash_scheduled());
    assert_eq!(app.snapshot().clock, "00:00:00");
    assert_eq!(app.snapshot().message.as_deref(), Some("Time is up! (no alarm sound)"));

    press(&mut app, KeyCode::Char('r'));
    assert!(!app.is_flash_scheduled());
    assert_eq!(app.snapshot().flash_phase, None);
    assert_eq!(app.countdown().status(), RunStatus::Idle);
  }

  #[tokio::test]
  async fn reset_silences_the_alarm() {
    let (mut app, output) = ringing_app(&["--duration", "0:01"]);

    press(&mut app, KeyCode::Char('r'));
    assert!(!output.is_playing());
    assert_eq!(output.calls().last().map(String::as_str), Some("stop"));
  }

  #[tokio::test]
  async fn new_duration_silences_the_alarm_in_both_modes() {
    for mode in ["basic", "advanced"] {
      let output = RecordingOutput::default();
      let alarm = Alarm::with_output(Some("alarm.wav".into()), Box::new(output.clone()));
      let mut app = app_with_alarm(&["--mode", mode], alarm);
      app.countdown.set_duration(1);
      press(&mut app, KeyCode::Enter);
      app.on_tick();
      app.sync_schedule();
      assert!(output.is_playing());

      press(&mut app, KeyCode::Char('s'));
      type_text(&mut app, "2");
      press(&mut app, KeyCode::Enter);
      press(&mut app, KeyCode::Enter);

      assert!(app.countdown().is_running());
      assert!(!output.is_playing(), "alarm still playing in {} mode", mode);
    }
  }

  #[tokio::test]
  async fn alarm_keeps_playing_until_acknowledged() {
    let (mut app, output) = ringing_app(&["--duration", "0:01"]);

    app.countdown.toggle_flash();
    app.sync_schedule();
    assert!(output.is_playing());
    assert_eq!(output.calls().last().map(String::as_str), Some("play alarm.wav"));
  }

  #[tokio::test]
  async fn entry_form_sets_duration() {
    let mut app = new_app(&[]);
    press(&mut app, KeyCode::Char('s'));
    assert_eq!(app.snapshot().entry.as_deref(), Some(""));

    type_text(&mut app, "1:01:01");
    press(&mut app, KeyCode::Enter);

    assert!(app.snapshot().entry.is_none());
    assert_eq!(app.countdown().remaining(), 3661);
    assert_eq!(app.snapshot().clock, "01:01:01");
  }

  #[tokio::test]
  async fn cancelled_or_invalid_entry_keeps_prior_duration() {
    let mut app = new_app(&["--duration", "5"]);

    press(&mut app, KeyCode::Char('s'));
    type_text(&mut app, "9");
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.countdown().remaining(), 300);
    assert!(app.running);

    press(&mut app, KeyCode::Char('s'));
    type_text(&mut app, "later");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.countdown().remaining(), 300);
    assert!(app.snapshot().message.is_some());
  }

  #[tokio::test]
  async fn basic_mode_blocks_entry_while_running() {
    let mut app = new_app(&["--mode", "basic", "--duration", "1"]);
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Char('s'));

    assert!(app.snapshot().entry.is_none());
    assert!(app.snapshot().message.is_some());
    assert!(app.countdown().is_running());
  }

  #[tokio::test]
  async fn advanced_mode_entry_while_running_idles() {
    let mut app = new_app(&["--duration", "1"]);
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Char('s'));
    type_text(&mut app, "90s");
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.countdown().remaining(), 90);
    assert_eq!(app.countdown().status(), RunStatus::Idle);
    assert!(!app.is_ticking());
  }

  #[tokio::test]
  async fn quit_keys_stop_the_loop() {
    let mut app = new_app(&[]);
    press(&mut app, KeyCode::Char('q'));
    assert!(!app.running);

    let mut app = new_app(&[]);
    press(&mut app, KeyCode::Char('s'));
    app.on_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(!app.running);
  }

  #[test]
  fn mode_flag_is_parsed() {
    let cli = Cli::parse_from(["countdown", "-m", "basic"]);
    assert_eq!(cli.mode, Some(Mode::Basic));
  }
}
