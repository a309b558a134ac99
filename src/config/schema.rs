use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/spindle/config.toml` or `~/.config/spindle/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `SPINDLE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub playback: PlaybackSettings,
    pub visual: VisualSettings,
    pub controls: ControlsSettings,
    pub library: LibrarySettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Volume new sessions start at (0.0 - 1.0).
    pub initial_volume: f32,
    /// Samples per analysis window. Must be a power of two.
    /// The analyser publishes `fft_size / 2` bins per frame.
    pub fft_size: usize,
    /// Averaging constant between consecutive spectra (0 = none, just under 1 = heavy).
    pub smoothing: f32,
    /// Magnitude (dB) mapped to bin value 0.
    pub min_decibels: f32,
    /// Magnitude (dB) mapped to bin value 255.
    pub max_decibels: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            initial_volume: 0.7,
            fft_size: 256,
            smoothing: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    /// Default loop mode.
    pub loop_mode: LoopModeSetting,
    /// Rates offered by the `<` / `>` keys, in order.
    pub speed_presets: Vec<f32>,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            shuffle: false,
            loop_mode: LoopModeSetting::None,
            speed_presets: vec![0.5, 0.75, 1.0, 1.25, 1.5, 2.0],
        }
    }
}

#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopModeSetting {
    #[serde(alias = "no-loop", alias = "no_loop", alias = "off")]
    None,
    #[serde(
        alias = "loop-one",
        alias = "loop_one",
        alias = "repeat-one",
        alias = "repeat_one"
    )]
    One,
    #[serde(alias = "loop-all", alias = "loop_all", alias = "loop-around")]
    All,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisualSettings {
    /// Animation frames per second (sampling + redraw cadence).
    pub fps: u32,
    /// Upper bound on bars drawn by the spectrum visualizer.
    pub max_bars: usize,
    /// Bars in the idle ("ready, not active") pattern.
    pub idle_bars: usize,
    /// Disc rotation per frame while playing, in radians.
    /// The default is 33 1/3 rpm at 60 fps.
    pub disc_step: f32,
    /// Most particles spawned in one frame at full intensity.
    pub max_particles_per_frame: u32,
    /// Spawn probability at full intensity.
    pub spawn_chance: f32,
    /// Particle lifespan range in frames.
    pub particle_life_min: u32,
    pub particle_life_max: u32,
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            fps: 60,
            max_bars: 128,
            idle_bars: 64,
            disc_step: 0.0582,
            max_particles_per_frame: 3,
            spawn_chance: 0.3,
            particle_life_min: 100,
            particle_life_max: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `[` / `]`.
    pub scrub_seconds: u64,
    /// Volume change per `-` / `=` press.
    pub volume_step: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            scrub_seconds: 5,
            volume_step: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Whether opening a directory descends into subdirectories.
    pub recursive: bool,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Read tags and duration from each file while ingesting.
    pub read_duration: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            recursive: true,
            follow_links: true,
            include_hidden: false,
            read_duration: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ drop some records on the spindle ~ ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log file. The terminal belongs to the UI, so logs never go to stderr.
    /// Defaults to `spindle.log` in the system temp directory.
    pub file: Option<PathBuf>,
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: None,
            level: "warn".to_string(),
        }
    }
}

impl LoggingSettings {
    pub fn resolved_file(&self) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("spindle.log"))
    }
}
