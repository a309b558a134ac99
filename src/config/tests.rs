use std::env;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Mutex;

use super::load::{default_config_path, resolve_config_path};
use super::schema::*;

/// Run `f` with each variable set (`Some`) or removed (`None`), then put the
/// previous values back. Calls are serialised: the environment is global.
pub(crate) fn with_env<R>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> R) -> R {
    static LOCK: Mutex<()> = Mutex::new(());
    let _lock = LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    let saved: Vec<_> = vars
        .iter()
        .map(|(key, _)| (key.to_string(), env::var_os(key)))
        .collect();
    for (key, value) in vars {
        unsafe {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }

    let out = panic::catch_unwind(AssertUnwindSafe(f));

    for (key, old) in saved {
        unsafe {
            match old {
                Some(v) => env::set_var(&key, v),
                None => env::remove_var(&key),
            }
        }
    }
    out.unwrap_or_else(|e| panic::resume_unwind(e))
}

#[test]
fn config_path_env_var_wins() {
    let path = with_env(
        &[("SPINDLE_CONFIG_PATH", Some("/tmp/spindle-test-config.toml"))],
        resolve_config_path,
    );
    assert_eq!(path, Some(PathBuf::from("/tmp/spindle-test-config.toml")));
}

#[test]
fn default_config_path_uses_xdg_then_home() {
    let xdg = with_env(
        &[
            ("XDG_CONFIG_HOME", Some("/tmp/xdg")),
            ("HOME", Some("/tmp/ignored-home")),
        ],
        default_config_path,
    );
    assert_eq!(xdg, Some(PathBuf::from("/tmp/xdg/spindle/config.toml")));

    let home = with_env(
        &[("XDG_CONFIG_HOME", None), ("HOME", Some("/tmp/home-dir"))],
        default_config_path,
    );
    assert_eq!(
        home,
        Some(PathBuf::from("/tmp/home-dir/.config/spindle/config.toml"))
    );
}

#[test]
fn defaults_are_valid() {
    let s = Settings::default();
    assert!(s.validate().is_ok());
    assert_eq!(s.audio.fft_size, 256);
    assert_eq!(s.visual.max_bars, 128);
    assert!((s.audio.initial_volume - 0.7).abs() < f32::EPSILON);
    assert!(matches!(s.playback.loop_mode, LoopModeSetting::None));
}

#[test]
fn validate_rejects_bad_values() {
    let mut s = Settings::default();
    s.audio.fft_size = 300;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.visual.fps = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.audio.min_decibels = -20.0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.playback.speed_presets.clear();
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.playback.speed_presets = vec![1.0, 0.0];
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.audio.smoothing = 1.0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.visual.particle_life_min = 300;
    assert!(s.validate().is_err());
}

#[test]
fn validate_rejects_visuals_that_cannot_draw() {
    let broken: [fn(&mut VisualSettings); 5] = [
        |v| v.max_bars = 0,
        |v| v.idle_bars = 0,
        |v| v.spawn_chance = 1.5,
        |v| v.spawn_chance = -0.1,
        |v| v.disc_step = f32::NAN,
    ];
    for breakage in broken {
        let mut s = Settings::default();
        breakage(&mut s.visual);
        assert!(s.validate().is_err());
    }

    let mut s = Settings::default();
    s.visual.spawn_chance = 1.0;
    s.visual.disc_step = 0.0;
    assert!(s.validate().is_ok());
}

#[test]
fn loop_mode_aliases_deserialize() {
    #[derive(serde::Deserialize)]
    struct Wrap {
        mode: LoopModeSetting,
    }

    let parse = |s: &str| toml::from_str::<Wrap>(&format!("mode = \"{s}\"")).unwrap().mode;
    assert!(matches!(parse("none"), LoopModeSetting::None));
    assert!(matches!(parse("no-loop"), LoopModeSetting::None));
    assert!(matches!(parse("one"), LoopModeSetting::One));
    assert!(matches!(parse("repeat-one"), LoopModeSetting::One));
    assert!(matches!(parse("all"), LoopModeSetting::All));
    assert!(matches!(parse("loop-around"), LoopModeSetting::All));
}

fn load_with_file(body: &str, extra: &[(&str, Option<&str>)]) -> Settings {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, body).unwrap();

    let mut vars = vec![("SPINDLE_CONFIG_PATH", path.to_str())];
    vars.extend_from_slice(extra);
    with_env(&vars, Settings::load).unwrap()
}

#[test]
fn settings_load_from_config_file() {
    let s = load_with_file(
        r#"
[playback]
shuffle = true
loop_mode = "repeat-one"
speed_presets = [1.0, 2.0]

[audio]
initial_volume = 0.25
fft_size = 512

[visual]
fps = 30
max_bars = 32

[controls]
scrub_seconds = 9

[library]
recursive = false
include_hidden = true

[ui]
header_text = "hello"

[logging]
file = "/tmp/spindle-test.log"
level = "debug"
"#,
        &[("SPINDLE__AUDIO__INITIAL_VOLUME", None)],
    );

    assert!(s.playback.shuffle);
    assert!(matches!(s.playback.loop_mode, LoopModeSetting::One));
    assert_eq!(s.playback.speed_presets, vec![1.0, 2.0]);
    assert!((s.audio.initial_volume - 0.25).abs() < f32::EPSILON);
    assert_eq!(s.audio.fft_size, 512);
    // untouched keys keep their defaults
    assert!((s.audio.smoothing - 0.8).abs() < f32::EPSILON);
    assert_eq!(s.visual.fps, 30);
    assert_eq!(s.visual.max_bars, 32);
    assert_eq!(s.visual.idle_bars, 64);
    assert_eq!(s.controls.scrub_seconds, 9);
    assert!(!s.library.recursive);
    assert!(s.library.include_hidden);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(
        s.logging.resolved_file(),
        PathBuf::from("/tmp/spindle-test.log")
    );
    assert_eq!(s.logging.level, "debug");
    assert!(s.validate().is_ok());
}

#[test]
fn env_overrides_config_file() {
    let s = load_with_file(
        "[controls]\nscrub_seconds = 10\n",
        &[("SPINDLE__CONTROLS__SCRUB_SECONDS", Some("2"))],
    );
    assert_eq!(s.controls.scrub_seconds, 2);
}

#[test]
fn missing_config_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let s = with_env(&[("SPINDLE__VISUAL__FPS", None)], || {
        Settings::load_from(Some(&missing))
    })
    .unwrap();
    assert_eq!(s.visual.fps, 60);
    assert!(!s.playback.shuffle);
}
