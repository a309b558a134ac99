//! The application model the keyboard drives and the UI draws: library,
//! playback controller, analyser, and view state.

mod model;

pub use model::*;
