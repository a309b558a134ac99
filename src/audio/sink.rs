//! `rodio`-backed [`AudioEngine`].
//!
//! One `Sink` per loaded track. rodio has no end-of-track callback, so
//! `Ended` is synthesised by [`poll_events`](AudioEngine::poll_events) when
//! the sink drains while not paused.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use rodio::{Decoder, Sink, Source};

use crate::error::{Result, SpindleError};

use super::context::AudioContext;
use super::engine::AudioEngine;
use super::tap::{SampleTap, TappedSource};
use super::types::{EngineEvent, LoadOptions};

/// Mono samples kept for analysis (a little over the largest FFT window).
const TAP_CAPACITY: usize = 32_768;

/// Open and decode `path`, routing its samples through `tap`.
fn open_source(path: &Path, tap: &SampleTap) -> Result<TappedSource<Decoder<BufReader<File>>>> {
    let source_ref = path.display().to_string();
    let file = File::open(path).map_err(|e| SpindleError::load_failure(&source_ref, e))?;
    let decoder =
        Decoder::new(BufReader::new(file)).map_err(|e| SpindleError::load_failure(&source_ref, e))?;
    Ok(TappedSource::new(decoder, tap.clone()))
}

pub struct RodioEngine {
    context: AudioContext,
    sink: Option<Sink>,
    source: Option<PathBuf>,
    duration: Option<f64>,
    tap: SampleTap,
    events: Vec<EngineEvent>,
    end_reported: bool,
}

impl Default for RodioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RodioEngine {
    pub fn new() -> Self {
        Self {
            context: AudioContext::new(),
            sink: None,
            source: None,
            duration: None,
            tap: SampleTap::new(TAP_CAPACITY),
            events: Vec::new(),
            end_reported: false,
        }
    }

    /// Put a fresh decoder for the loaded source back into a drained sink.
    fn rearm(&mut self) {
        let (Some(sink), Some(path)) = (self.sink.as_ref(), self.source.as_ref()) else {
            return;
        };
        if !sink.empty() {
            return;
        }
        match open_source(path, &self.tap) {
            Ok(source) => {
                sink.append(source);
                self.end_reported = false;
            }
            Err(e) => warn!("audio: cannot restart {}: {e}", path.display()),
        }
    }
}

impl AudioEngine for RodioEngine {
    fn load(&mut self, source: &Path, options: LoadOptions) -> Result<()> {
        self.unload();
        // the stopped sink may still flush into the previous tap
        self.tap = SampleTap::new(TAP_CAPACITY);

        let decoded = open_source(source, &self.tap)?;
        let duration = decoded.total_duration().map(|d| d.as_secs_f64());

        let sink = Sink::connect_new(self.context.mixer()?);
        sink.set_volume(options.volume);
        sink.set_speed(options.rate);
        sink.pause();
        sink.append(decoded);

        info!("audio: loaded {}", source.display());
        self.sink = Some(sink);
        self.source = Some(source.to_path_buf());
        self.duration = duration;
        self.end_reported = false;
        self.events.push(EngineEvent::Loaded { duration });
        Ok(())
    }

    fn play(&mut self) {
        self.rearm();
        if let Some(sink) = &self.sink {
            sink.play();
            self.events.push(EngineEvent::Played);
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
            self.events.push(EngineEvent::Paused);
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
        self.seek(0.0);
        if self.sink.is_some() {
            self.events.push(EngineEvent::Stopped);
        }
    }

    fn seek(&mut self, secs: f64) {
        self.rearm();
        if let Some(sink) = &self.sink {
            let target = Duration::from_secs_f64(secs.max(0.0));
            if let Err(e) = sink.try_seek(target) {
                warn!("audio: seek to {target:?} failed: {e}");
            }
        }
    }

    fn position(&self) -> f64 {
        self.sink
            .as_ref()
            .map(|s| s.get_pos().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn set_volume(&mut self, level: f32) {
        if let Some(sink) = &self.sink {
            sink.set_volume(level);
        }
    }

    fn set_rate(&mut self, rate: f32) {
        if let Some(sink) = &self.sink {
            sink.set_speed(rate);
        }
    }

    fn unload(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
            debug!("audio: unloaded");
        }
        self.source = None;
        self.duration = None;
        self.events.clear();
        self.tap.clear();
    }

    fn is_loaded(&self) -> bool {
        self.sink.is_some()
    }

    fn is_playing(&self) -> bool {
        self.sink
            .as_ref()
            .map(|s| !s.is_paused() && !s.empty())
            .unwrap_or(false)
    }

    fn output_tap(&self) -> Option<SampleTap> {
        self.sink.as_ref().map(|_| self.tap.clone())
    }

    fn poll_events(&mut self) -> Vec<EngineEvent> {
        if let Some(sink) = &self.sink {
            if !sink.is_paused() && sink.empty() && !self.end_reported {
                self.end_reported = true;
                self.events.push(EngineEvent::Ended);
            }
        }
        std::mem::take(&mut self.events)
    }

    fn shutdown(&mut self) {
        self.unload();
        self.context.close();
    }
}
