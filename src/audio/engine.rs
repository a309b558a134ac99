use std::path::Path;

use crate::error::Result;

use super::tap::SampleTap;
use super::types::{EngineEvent, LoadOptions};

/// The playback primitive the controller drives.
///
/// Implementations own at most one loaded source. Lifecycle notifications
/// are queued and handed out by [`poll_events`](Self::poll_events); events of
/// an unloaded source are discarded.
pub trait AudioEngine {
    /// Replace any loaded source with `source`. On success a
    /// [`EngineEvent::Loaded`] is queued.
    fn load(&mut self, source: &Path, options: LoadOptions) -> Result<()>;
    fn play(&mut self);
    fn pause(&mut self);
    /// Pause and rewind to the start.
    fn stop(&mut self);
    /// Jump to `secs` from the start of the loaded source.
    fn seek(&mut self, secs: f64);
    /// Current position in seconds (0 when nothing is loaded).
    fn position(&self) -> f64;
    fn duration(&self) -> Option<f64>;
    fn set_volume(&mut self, level: f32);
    fn set_rate(&mut self, rate: f32);
    fn unload(&mut self);
    fn is_loaded(&self) -> bool;
    fn is_playing(&self) -> bool;
    /// Samples heading to the output, for analysis. `None` when the engine
    /// cannot expose its output (or nothing is loaded). Each load gets a new
    /// tap; taps handed out earlier never see the new source.
    fn output_tap(&self) -> Option<SampleTap>;
    fn poll_events(&mut self) -> Vec<EngineEvent>;

    /// Release the output device. Called once on application exit.
    fn shutdown(&mut self) {
        self.unload();
    }
}
