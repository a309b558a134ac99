//! Analyser bridge: turns the engine's output tap into one byte-per-bin
//! frequency frame per rendered frame.

mod bridge;
mod frame;
mod spectrum;

pub use bridge::{AnalyserBridge, AnalyserHandle};
pub use frame::{AnalysisFrame, Band};
pub use spectrum::Spectrum;
