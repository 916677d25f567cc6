use crate::error::{AppError, Result};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// First candidate that exists in `dir`, in list order.
pub fn locate_alarm(dir: &Path, candidates: &[String]) -> Option<PathBuf> {
  let mut checked_paths = Vec::new();

  for filename in candidates {
    let path = dir.join(filename);

    if path.is_file() {
      debug!(?path, "alarm sound found");
      return Some(path);
    }

    checked_paths.push(path);
  }

  warn!(?checked_paths, "no alarm sound found, playback disabled");
  None
}

/// Where the alarm sound goes.
pub trait AlarmOutput {
  fn play(&mut self, path: &Path) -> Result<()>;

  /// Silence playback. Returns whether anything was playing.
  fn stop(&mut self) -> bool;
}

/// Speaker output through rodio.
#[derive(Default)]
pub struct RodioOutput {
  // Поток вывода открывается лениво при первом воспроизведении
  stream: Option<(OutputStream, OutputStreamHandle)>,
  sink: Option<Sink>,
}

impl AlarmOutput for RodioOutput {
  fn play(&mut self, path: &Path) -> Result<()> {
    self.stop();

    if self.stream.is_none() {
      let stream = OutputStream::try_default().map_err(|e| AppError::Audio(e.to_string()))?;
      self.stream = Some(stream);
    }

    let handle = match &self.stream {
      Some((_, handle)) => handle,
      None => return Err(AppError::Audio("no output stream".to_string())),
    };

    let file = BufReader::new(File::open(path)?);
    let source = Decoder::new(file).map_err(|e| AppError::Audio(e.to_string()))?;
    let sink = Sink::try_new(handle).map_err(|e| AppError::Audio(e.to_string()))?;

    sink.append(source);
    self.sink = Some(sink);

    Ok(())
  }

  fn stop(&mut self) -> bool {
    match self.sink.take() {
      Some(sink) => {
        sink.stop();
        true
      }
      None => false,
    }
  }
}

/// Plays the alarm sound. A missing file or audio device is never fatal,
/// the countdown simply completes in silence.
pub struct Alarm {
  sound: Option<PathBuf>,
  output: Box<dyn AlarmOutput>,
}

impl Alarm {
  pub fn new(sound: Option<PathBuf>) -> Self {
    Self::with_output(sound, Box::new(RodioOutput::default()))
  }

  pub fn with_output(sound: Option<PathBuf>, output: Box<dyn AlarmOutput>) -> Self {
    Self { sound, output }
  }

  /// Probe the working directory for one of the candidate files.
  pub fn discover(candidates: &[String]) -> Result<Self> {
    let current_dir = std::env::current_dir()?;
    Ok(Self::new(locate_alarm(&current_dir, candidates)))
  }

  pub fn sound(&self) -> Option<&Path> {
    self.sound.as_deref()
  }

  /// Start playback. Returns whether anything is actually playing.
  pub fn play(&mut self) -> bool {
    let Some(path) = self.sound.as_deref() else {
      debug!("alarm skipped, no sound file");
      return false;
    };

    match self.output.play(path) {
      Ok(()) => {
        info!(?path, "alarm playing");
        true
      }
      Err(e) => {
        warn!(?path, "alarm playback failed: {}", e);
        false
      }
    }
  }

  /// Silence the alarm immediately.
  pub fn stop(&mut self) {
    if self.output.stop() {
      debug!("alarm stopped");
    }
  }
}
