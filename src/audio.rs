//! Playback: the engine abstraction, its rodio implementation, the output
//! tap used for analysis, and the controller that sequences tracks.

mod context;
mod controller;
mod engine;
mod sink;
mod tap;
mod types;

pub use context::AudioContext;
pub use controller::PlaybackController;
pub use engine::AudioEngine;
pub use sink::RodioEngine;
pub use tap::{SampleTap, TappedSource};
pub use types::*;

#[cfg(test)]
pub(crate) mod tests;
