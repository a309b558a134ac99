use std::path::PathBuf;

use crate::app::App;
use crate::audio::{AudioEngine, LoopMode};
use crate::config;

pub fn apply_playback_defaults<E: AudioEngine>(app: &mut App<E>, settings: &config::Settings) {
    app.player.set_shuffle(settings.playback.shuffle);
    app.player.set_loop_mode(match settings.playback.loop_mode {
        config::LoopModeSetting::None => LoopMode::None,
        config::LoopModeSetting::One => LoopMode::One,
        config::LoopModeSetting::All => LoopMode::All,
    });
    app.player.set_volume(settings.audio.initial_volume);
}

/// Files and directories named on the command line.
pub fn startup_paths(args: impl IntoIterator<Item = String>) -> Vec<PathBuf> {
    args.into_iter()
        .filter(|a| !a.trim().is_empty())
        .map(PathBuf::from)
        .collect()
}
