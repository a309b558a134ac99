//! Playback controller: owns the engine and all transport state, and decides
//! what plays next.

use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, SpindleError};
use crate::library::{Library, Track};

use super::engine::AudioEngine;
use super::types::{ControllerEvent, EngineEvent, LoadOptions, LoopMode, Transport};

pub struct PlaybackController<E> {
    engine: E,
    current: Option<usize>,
    transport: Transport,
    seek: f64,
    duration: f64,
    volume: f32,
    rate: f32,
    loop_mode: LoopMode,
    shuffle: bool,
    rng: StdRng,
    outbox: Vec<ControllerEvent>,
}

impl<E: AudioEngine> PlaybackController<E> {
    pub fn new(engine: E) -> Self {
        Self::with_rng(engine, StdRng::from_os_rng())
    }

    /// Use a specific random source for shuffle picks.
    pub fn with_rng(engine: E, rng: StdRng) -> Self {
        Self {
            engine,
            current: None,
            transport: Transport::Empty,
            seek: 0.0,
            duration: 0.0,
            volume: 1.0,
            rate: 1.0,
            loop_mode: LoopMode::None,
            shuffle: false,
            rng,
            outbox: Vec::new(),
        }
    }

    /// Load `index` and start it as soon as the engine reports it ready.
    ///
    /// Whatever was loaded before is unloaded first, even when `index` is the
    /// current track.
    pub fn select_track(&mut self, library: &Library, index: usize) -> Result<()> {
        let track = library.get(index).ok_or(SpindleError::InvalidIndex {
            index,
            len: library.len(),
        })?;

        self.engine.unload();
        self.current = Some(index);
        self.seek = 0.0;
        self.duration = 0.0;
        // rate belongs to the engine instance it was set on
        self.rate = 1.0;
        self.transport = Transport::Loading;
        self.outbox.push(ControllerEvent::TrackChanged { index });

        let options = LoadOptions {
            volume: self.volume,
            rate: self.rate,
        };
        if let Err(e) = self.engine.load(&track.source, options) {
            error!("player: {e}");
            self.transport = Transport::Empty;
            self.outbox.push(ControllerEvent::LoadFailed {
                index,
                reason: e.to_string(),
            });
            return Err(e);
        }
        info!("player: selected {} ({})", track.display(), track.id);
        Ok(())
    }

    /// Toggle the engine between playing and paused. Does nothing without a
    /// loaded track.
    pub fn play_pause(&mut self) {
        if !self.engine.is_loaded() {
            return;
        }
        if self.engine.is_playing() {
            self.engine.pause();
        } else {
            self.engine.play();
        }
    }

    /// Clamp a position to the track. An unknown duration (0) only bounds
    /// the position below.
    fn clamp_position(&self, t: f64) -> f64 {
        if t.is_nan() {
            return 0.0;
        }
        let t = t.max(0.0);
        if self.duration > 0.0 {
            t.min(self.duration)
        } else {
            t
        }
    }

    /// Jump to `time` seconds, clamped to the track. Returns the position
    /// used; always 0 with nothing loaded.
    pub fn seek(&mut self, time: f64) -> f64 {
        if !self.engine.is_loaded() {
            self.seek = 0.0;
            return 0.0;
        }
        let t = self.clamp_position(time);
        self.engine.seek(t);
        self.seek = t;
        t
    }

    /// Set the volume (clamped to `[0, 1]`). Kept for tracks loaded later.
    pub fn set_volume(&mut self, v: f32) {
        self.volume = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        if self.engine.is_loaded() {
            self.engine.set_volume(self.volume);
        }
    }

    /// Change the speed of the loaded track. Any positive rate is accepted;
    /// the next selected track starts at 1x again.
    pub fn set_playback_rate(&mut self, r: f32) -> bool {
        if !(r.is_finite() && r > 0.0) {
            warn!("player: ignoring playback rate {r}");
            return false;
        }
        if !self.engine.is_loaded() {
            return false;
        }
        self.rate = r;
        self.engine.set_rate(r);
        true
    }

    pub fn toggle_loop_mode(&mut self) -> LoopMode {
        self.loop_mode = self.loop_mode.cycle();
        self.loop_mode
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffle = !self.shuffle;
        self.shuffle
    }

    pub fn set_shuffle(&mut self, on: bool) {
        self.shuffle = on;
    }

    /// Decide what happens when the current track runs out.
    ///
    /// Loop-one replays, then shuffle picks a different random track, then
    /// loop-all wraps, and otherwise playback advances until the last track
    /// and stops there.
    pub fn on_track_ended(&mut self, library: &Library) {
        let Some(current) = self.current else {
            return;
        };
        let len = library.len();

        if self.loop_mode == LoopMode::One {
            self.seek = 0.0;
            self.engine.seek(0.0);
            self.engine.play();
            return;
        }
        if len == 0 {
            return;
        }

        let next = if self.shuffle && len > 1 {
            Some(self.random_other_index(len))
        } else if self.loop_mode == LoopMode::All {
            Some((current + 1) % len)
        } else if current + 1 < len {
            Some(current + 1)
        } else {
            None
        };

        match next {
            Some(i) => {
                if let Err(e) = self.select_track(library, i) {
                    // already queued as LoadFailed for the app to report
                    debug!("player: advance to {i} failed: {e}");
                }
            }
            None => self.stop(),
        }
    }

    /// Skip forward. Wraps to the first track; loop mode is ignored.
    pub fn play_next(&mut self, library: &Library) -> Result<()> {
        let len = library.len();
        if len == 0 {
            return Ok(());
        }
        let next = if self.shuffle && len > 1 {
            self.random_other_index(len)
        } else {
            self.current.map(|c| (c + 1) % len).unwrap_or(0)
        };
        self.select_track(library, next)
    }

    /// Skip back. Wraps to the last track; loop mode is ignored.
    pub fn play_previous(&mut self, library: &Library) -> Result<()> {
        let len = library.len();
        if len == 0 {
            return Ok(());
        }
        let prev = if self.shuffle && len > 1 {
            self.random_other_index(len)
        } else {
            self.current.map(|c| (c + len - 1) % len).unwrap_or(len - 1)
        };
        self.select_track(library, prev)
    }

    /// Halt playback and unload the engine. The current index is kept.
    pub fn stop(&mut self) {
        self.engine.stop();
        self.engine.unload();
        self.transport = Transport::Empty;
        self.seek = 0.0;
        self.outbox.push(ControllerEvent::Stopped);
        info!("player: stopped at end of list");
    }

    /// Drain engine notifications and react to them.
    pub fn handle_events(&mut self, library: &Library) {
        for event in self.engine.poll_events() {
            match event {
                EngineEvent::Loaded { duration } => {
                    if self.transport != Transport::Loading {
                        continue;
                    }
                    let Some(index) = self.current else {
                        continue;
                    };
                    let known = library
                        .get(index)
                        .and_then(|t| t.duration)
                        .map(|d| d.as_secs_f64());
                    self.duration = duration.or(known).unwrap_or(0.0);
                    self.outbox.push(ControllerEvent::TrackLoaded {
                        index,
                        duration: self.duration,
                    });
                    // autoplay on select
                    self.engine.play();
                }
                EngineEvent::LoadError(reason) => {
                    self.engine.unload();
                    self.transport = Transport::Empty;
                    let Some(index) = self.current else {
                        continue;
                    };
                    let source_ref = library
                        .get(index)
                        .map(|t| t.source.display().to_string())
                        .unwrap_or_default();
                    let err = SpindleError::load_failure(source_ref, reason);
                    error!("player: {err}");
                    self.outbox.push(ControllerEvent::LoadFailed {
                        index,
                        reason: err.to_string(),
                    });
                }
                EngineEvent::Played => self.transport = Transport::Playing,
                EngineEvent::Paused => {
                    if self.engine.is_loaded() {
                        self.transport = Transport::Paused;
                    }
                }
                EngineEvent::Stopped => {
                    if self.engine.is_loaded() {
                        self.transport = Transport::Paused;
                        self.seek = 0.0;
                    }
                }
                EngineEvent::Ended => {
                    self.transport = Transport::Ended;
                    self.on_track_ended(library);
                }
            }
        }
    }

    /// Per-frame resync of the seek position from the engine.
    pub fn tick(&mut self) {
        if !self.engine.is_playing() {
            return;
        }
        self.seek = self.clamp_position(self.engine.position());
    }

    /// Controller events since the last call.
    pub fn take_events(&mut self) -> Vec<ControllerEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn shutdown(&mut self) {
        self.engine.shutdown();
        self.transport = Transport::Empty;
    }

    fn random_other_index(&mut self, len: usize) -> usize {
        loop {
            let i = self.rng.random_range(0..len);
            if Some(i) != self.current {
                return i;
            }
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track<'a>(&self, library: &'a Library) -> Option<&'a Track> {
        self.current.and_then(|i| library.get(i))
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// Read from the engine, not cached.
    pub fn is_playing(&self) -> bool {
        self.engine.is_playing()
    }

    pub fn seek_position(&self) -> f64 {
        self.seek
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}
