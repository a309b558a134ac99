use log::{info, warn};
use rodio::mixer::Mixer;
use rodio::{OutputStream, OutputStreamBuilder};

use crate::error::{Result, SpindleError};

/// The process-wide audio output. Opened on first use, closed explicitly on
/// shutdown; every loaded source mixes into it.
#[derive(Default)]
pub struct AudioContext {
    stream: Option<OutputStream>,
}

impl AudioContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The output mixer, opening the default device if needed.
    pub fn mixer(&mut self) -> Result<&Mixer> {
        if self.stream.is_none() {
            let mut stream = OutputStreamBuilder::open_default_stream().map_err(|e| {
                warn!("audio: no output device: {e}");
                SpindleError::CapabilityUnavailable(format!("no audio output device: {e}"))
            })?;
            // rodio logs to stderr when the stream is dropped, which would
            // scribble over the UI.
            stream.log_on_drop(false);
            info!("audio: output stream opened");
            self.stream = Some(stream);
        }
        match self.stream.as_ref() {
            Some(stream) => Ok(stream.mixer()),
            None => Err(SpindleError::CapabilityUnavailable(
                "audio output closed".to_string(),
            )),
        }
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    pub fn close(&mut self) {
        if self.stream.take().is_some() {
            info!("audio: output stream closed");
        }
    }
}
