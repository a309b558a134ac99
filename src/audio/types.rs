//! Audio-related small types.
//!
//! This module defines the enums shared by the engine adapter and the
//! playback controller (loop mode, transport state, engine events).

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum LoopMode {
    /// Stop after the last track.
    #[default]
    None,
    /// Repeat the current track when it ends.
    One,
    /// Wrap around to the first track after the last.
    All,
}

impl LoopMode {
    /// `None -> One -> All -> None`.
    pub fn cycle(self) -> Self {
        match self {
            Self::None => Self::One,
            Self::One => Self::All,
            Self::All => Self::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "off",
            Self::One => "one",
            Self::All => "all",
        }
    }
}

/// Controller-side view of the transport.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Transport {
    /// Nothing loaded in the engine.
    #[default]
    Empty,
    /// A track was selected and the engine is loading it.
    Loading,
    Playing,
    Paused,
    /// The loaded track ran out; the advance policy runs next.
    Ended,
}

/// Lifecycle notifications fired by an engine, drained with
/// [`AudioEngine::poll_events`](super::AudioEngine::poll_events).
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The source is ready. `duration` is in seconds when the decoder knows it.
    Loaded { duration: Option<f64> },
    LoadError(String),
    Played,
    Paused,
    Stopped,
    Ended,
}

/// Parameters applied to a freshly loaded source.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LoadOptions {
    pub volume: f32,
    pub rate: f32,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            volume: 1.0,
            rate: 1.0,
        }
    }
}

/// Things the controller did that the rest of the app must react to
/// (re-attaching the analyser, recording durations, showing errors).
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// A new track started loading; any tap on the previous one is dead.
    TrackChanged { index: usize },
    /// The engine finished loading `index` and playback was requested.
    TrackLoaded { index: usize, duration: f64 },
    LoadFailed { index: usize, reason: String },
    /// Playback ran off the end of the list and the engine was unloaded.
    Stopped,
}
