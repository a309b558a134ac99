//! Settings: audio analysis, playback defaults, visuals, controls, library
//! scanning, UI text and logging, loaded from `config.toml` and `SPINDLE__*`
//! environment variables.

mod load;
mod schema;

pub use schema::*;

#[cfg(test)]
pub(crate) mod tests;
