use std::env;
use std::path::{Path, PathBuf};

use super::schema::Settings;

const ENV_PREFIX: &str = "SPINDLE";
const CONFIG_PATH_VAR: &str = "SPINDLE_CONFIG_PATH";

/// Layered loading: environment variables (`SPINDLE__SECTION__KEY`) over an
/// optional TOML file over struct defaults.
impl Settings {
    pub fn load() -> Result<Self, ::config::ConfigError> {
        Self::load_from(resolve_config_path().as_deref())
    }

    /// Same as [`Settings::load`] with an explicit file. A missing file is
    /// not an error.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ::config::ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(false));
        }
        builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        let fft = self.audio.fft_size;
        if !fft.is_power_of_two() || !(32..=32768).contains(&fft) {
            return Err(format!(
                "audio.fft_size must be a power of two in 32..=32768, got {fft}"
            ));
        }
        if self.audio.min_decibels >= self.audio.max_decibels {
            return Err("audio.min_decibels must be below audio.max_decibels".to_string());
        }
        if !(0.0..1.0).contains(&self.audio.smoothing) {
            return Err("audio.smoothing must be in [0, 1)".to_string());
        }
        if self.visual.fps == 0 {
            return Err("visual.fps must be >= 1".to_string());
        }
        if self.visual.max_bars == 0 || self.visual.idle_bars == 0 {
            return Err("visual.max_bars and visual.idle_bars must be >= 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.visual.spawn_chance) {
            return Err("visual.spawn_chance must be in [0, 1]".to_string());
        }
        if !self.visual.disc_step.is_finite() {
            return Err("visual.disc_step must be finite".to_string());
        }
        if self.visual.particle_life_min == 0
            || self.visual.particle_life_min > self.visual.particle_life_max
        {
            return Err("visual.particle_life_min must be in 1..=particle_life_max".to_string());
        }
        if self.playback.speed_presets.is_empty() {
            return Err("playback.speed_presets must not be empty".to_string());
        }
        if self.playback.speed_presets.iter().any(|&s| s <= 0.0) {
            return Err("playback.speed_presets must all be positive".to_string());
        }
        Ok(())
    }
}

/// `SPINDLE_CONFIG_PATH` when set, else [`default_config_path`].
pub fn resolve_config_path() -> Option<PathBuf> {
    env::var_os(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .or_else(default_config_path)
}

/// `$XDG_CONFIG_HOME/spindle/config.toml`, falling back to
/// `~/.config/spindle/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .map(|dir| dir.join("spindle").join("config.toml"))
}
