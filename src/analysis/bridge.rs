use std::time::{Duration, Instant};

use log::{debug, trace, warn};

use crate::audio::SampleTap;
use crate::config::AudioSettings;

use super::frame::AnalysisFrame;
use super::spectrum::Spectrum;

/// Identifies one attachment. Stale handles sample as empty frames.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AnalyserHandle(u64);

enum TapState {
    Detached,
    /// Attach was attempted without an output to tap.
    Degraded,
    Live {
        tap: SampleTap,
        last_written: u64,
        /// When `last_written` last moved.
        last_fresh: Instant,
    },
}

/// Connects a [`Spectrum`] to whatever engine output is currently loaded.
///
/// Owns at most one tap. Every failure ends in empty frames, never an error.
pub struct AnalyserBridge {
    spectrum: Spectrum,
    scratch: Vec<f32>,
    state: TapState,
    handle: Option<AnalyserHandle>,
    next_handle: u64,
}

impl AnalyserBridge {
    pub fn new(spectrum: Spectrum) -> Self {
        let scratch = vec![0.0; spectrum.fft_size()];
        Self {
            spectrum,
            scratch,
            state: TapState::Detached,
            handle: None,
            next_handle: 0,
        }
    }

    pub fn from_settings(settings: &AudioSettings) -> Self {
        Self::new(Spectrum::from_settings(settings))
    }

    /// Tap `output`, dropping any previous tap first. `None` puts the bridge
    /// in degraded mode until the next attach.
    pub fn attach(&mut self, output: Option<SampleTap>) -> AnalyserHandle {
        self.release();
        let handle = AnalyserHandle(self.next_handle);
        self.next_handle += 1;
        self.state = match output {
            Some(tap) => {
                debug!("analysis: attached {handle:?}");
                TapState::Live {
                    last_written: tap.written(),
                    last_fresh: Instant::now(),
                    tap,
                }
            }
            None => {
                warn!("analysis: output cannot be tapped; visuals stay idle");
                TapState::Degraded
            }
        };
        self.handle = Some(handle);
        handle
    }

    /// Read the current spectrum for `handle`. Empty unless `handle` is the
    /// live attachment.
    pub fn sample(&mut self, handle: AnalyserHandle) -> AnalysisFrame {
        self.sample_at(handle, Instant::now())
    }

    /// [`sample`](Self::sample) at a given instant.
    ///
    /// The output is written in device-period bursts, so the latest window
    /// is analysed even when nothing new arrived since the last read. Once
    /// the tap has been quiet for longer than one window it reads as silence.
    pub fn sample_at(&mut self, handle: AnalyserHandle, now: Instant) -> AnalysisFrame {
        if self.handle != Some(handle) {
            return AnalysisFrame::empty();
        }
        let TapState::Live {
            tap,
            last_written,
            last_fresh,
        } = &mut self.state
        else {
            return AnalysisFrame::empty();
        };

        let written = tap.read_latest(&mut self.scratch);
        if written != *last_written {
            *last_written = written;
            *last_fresh = now;
        } else {
            let rate = tap.sample_rate().max(1);
            let window = Duration::from_secs_f64(self.scratch.len() as f64 / rate as f64);
            if now.saturating_duration_since(*last_fresh) > window {
                self.scratch.fill(0.0);
            }
        }

        let frame = AnalysisFrame::from(self.spectrum.process(&self.scratch));
        trace!("analysis: sampled {} bins, mean {:.1}", frame.len(), frame.mean());
        frame
    }

    /// Drop the tap if `handle` is still the current attachment.
    pub fn detach(&mut self, handle: AnalyserHandle) {
        if self.handle == Some(handle) {
            self.release();
        }
    }

    /// Drop whatever is attached.
    pub fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("analysis: detached {handle:?}");
        }
        self.state = TapState::Detached;
        self.spectrum.reset();
    }

    pub fn current(&self) -> Option<AnalyserHandle> {
        self.handle
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.state, TapState::Live { .. })
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.state, TapState::Degraded)
    }

    pub fn bin_count(&self) -> usize {
        self.spectrum.bin_count()
    }
}
