use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rodio::buffer::SamplesBuffer;

use super::*;
use crate::error::{Result, SpindleError};
use crate::library::{Library, NewTrack};

/// In-memory engine that records what the controller asked of it.
#[derive(Debug, Default)]
pub(crate) struct MockEngine {
    pub loaded: Option<PathBuf>,
    pub playing: bool,
    pub position: f64,
    pub duration: Option<f64>,
    pub volume: f32,
    pub rate: f32,
    pub loads: usize,
    pub unloads: usize,
    pub shut_down: bool,
    pub tap: Option<SampleTap>,
    events: Vec<EngineEvent>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            duration: Some(180.0),
            volume: 1.0,
            rate: 1.0,
            ..Self::default()
        }
    }

    /// Pretend the loaded source ran out.
    pub fn finish(&mut self) {
        self.playing = false;
        self.events.push(EngineEvent::Ended);
    }

    pub fn emit(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    pub fn pending(&self) -> usize {
        self.events.len()
    }
}

impl AudioEngine for MockEngine {
    fn load(&mut self, source: &Path, options: LoadOptions) -> Result<()> {
        self.unload();
        if source.to_string_lossy().contains("broken") {
            return Err(SpindleError::load_failure(
                source.display().to_string(),
                "unsupported format",
            ));
        }
        self.loads += 1;
        self.loaded = Some(source.to_path_buf());
        self.volume = options.volume;
        self.rate = options.rate;
        self.position = 0.0;
        if let Some(tap) = &self.tap {
            self.tap = Some(SampleTap::new(tap.capacity()));
        }
        self.events.push(EngineEvent::Loaded {
            duration: self.duration,
        });
        Ok(())
    }

    fn play(&mut self) {
        if self.loaded.is_some() {
            self.playing = true;
            self.events.push(EngineEvent::Played);
        }
    }

    fn pause(&mut self) {
        if self.loaded.is_some() {
            self.playing = false;
            self.events.push(EngineEvent::Paused);
        }
    }

    fn stop(&mut self) {
        if self.loaded.is_some() {
            self.playing = false;
            self.position = 0.0;
            self.events.push(EngineEvent::Stopped);
        }
    }

    fn seek(&mut self, secs: f64) {
        self.position = secs;
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn set_volume(&mut self, level: f32) {
        self.volume = level;
    }

    fn set_rate(&mut self, rate: f32) {
        self.rate = rate;
    }

    fn unload(&mut self) {
        if self.loaded.take().is_some() {
            self.unloads += 1;
        }
        self.playing = false;
        self.events.clear();
    }

    fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn output_tap(&self) -> Option<SampleTap> {
        self.loaded.as_ref().and(self.tap.clone())
    }

    fn poll_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    fn shutdown(&mut self) {
        self.unload();
        self.shut_down = true;
    }
}

pub(crate) fn library_of(n: usize) -> Library {
    let mut lib = Library::new();
    lib.add_tracks(
        (0..n)
            .map(|i| NewTrack::from_path(Path::new(&format!("/music/t{i}.mp3"))))
            .collect(),
    );
    lib
}

fn controller() -> PlaybackController<MockEngine> {
    PlaybackController::with_rng(MockEngine::new(), StdRng::seed_from_u64(7))
}

/// Feed engine events back until the engine goes quiet.
fn settle(c: &mut PlaybackController<MockEngine>, lib: &Library) {
    for _ in 0..8 {
        if c.engine().pending() == 0 {
            break;
        }
        c.handle_events(lib);
    }
}

fn select_and_settle(c: &mut PlaybackController<MockEngine>, lib: &Library, index: usize) {
    c.select_track(lib, index).unwrap();
    settle(c, lib);
}

#[test]
fn select_track_loads_and_autoplays() {
    let lib = library_of(3);
    let mut c = controller();

    c.select_track(&lib, 1).unwrap();
    assert_eq!(c.current_index(), Some(1));
    assert_eq!(c.transport(), Transport::Loading);
    assert_eq!(c.seek_position(), 0.0);

    settle(&mut c, &lib);
    assert_eq!(c.transport(), Transport::Playing);
    assert!(c.is_playing());
    assert_eq!(c.duration(), 180.0);
    assert_eq!(
        c.engine().loaded.as_deref(),
        Some(Path::new("/music/t1.mp3"))
    );
    assert_eq!(
        c.take_events(),
        vec![
            ControllerEvent::TrackChanged { index: 1 },
            ControllerEvent::TrackLoaded {
                index: 1,
                duration: 180.0
            },
        ]
    );
    assert!(c.take_events().is_empty());
}

#[test]
fn reselecting_the_current_track_reloads_it() {
    let lib = library_of(2);
    let mut c = controller();
    select_and_settle(&mut c, &lib, 0);
    c.engine_mut().position = 42.0;

    select_and_settle(&mut c, &lib, 0);
    assert_eq!(c.engine().loads, 2);
    assert_eq!(c.engine().position, 0.0);
    assert_eq!(c.current_index(), Some(0));
}

#[test]
fn select_track_out_of_range_changes_nothing() {
    let lib = library_of(2);
    let mut c = controller();
    select_and_settle(&mut c, &lib, 0);
    c.take_events();

    let err = c.select_track(&lib, 5).unwrap_err();
    assert!(matches!(err, SpindleError::InvalidIndex { index: 5, len: 2 }));
    assert_eq!(c.current_index(), Some(0));
    assert!(c.is_playing());
    assert!(c.take_events().is_empty());
}

#[test]
fn load_failure_leaves_transport_empty() {
    let mut lib = library_of(1);
    lib.add_tracks(vec![NewTrack::from_path(Path::new("/music/broken.xyz"))]);
    let mut c = controller();

    let err = c.select_track(&lib, 1).unwrap_err();
    assert!(matches!(err, SpindleError::LoadFailure { .. }));
    assert_eq!(c.transport(), Transport::Empty);
    assert_eq!(c.current_index(), Some(1));
    assert!(!c.is_playing());
    let events = c.take_events();
    assert!(matches!(
        events.last(),
        Some(ControllerEvent::LoadFailed { index: 1, .. })
    ));

    // the rest of the library still plays
    select_and_settle(&mut c, &lib, 0);
    assert!(c.is_playing());
}

#[test]
fn late_load_error_returns_to_idle() {
    let lib = library_of(2);
    let mut c = controller();
    c.select_track(&lib, 1).unwrap();
    c.take_events();

    c.engine_mut().unload();
    c.engine_mut().emit(EngineEvent::LoadError("decoder gave up".into()));
    c.handle_events(&lib);
    assert_eq!(c.transport(), Transport::Empty);
    assert_eq!(c.current_index(), Some(1));
    match c.take_events().as_slice() {
        [ControllerEvent::LoadFailed { index: 1, reason }] => {
            assert!(reason.contains("/music/t1.mp3"));
            assert!(reason.contains("decoder gave up"));
        }
        other => panic!("unexpected events {other:?}"),
    }
}

#[test]
fn play_pause_toggles_only_when_loaded() {
    let lib = library_of(1);
    let mut c = controller();

    c.play_pause();
    assert!(!c.is_playing());
    assert_eq!(c.transport(), Transport::Empty);

    select_and_settle(&mut c, &lib, 0);
    c.play_pause();
    settle(&mut c, &lib);
    assert!(!c.is_playing());
    assert_eq!(c.transport(), Transport::Paused);

    c.play_pause();
    settle(&mut c, &lib);
    assert!(c.is_playing());
    assert_eq!(c.transport(), Transport::Playing);
}

#[test]
fn seek_is_clamped_to_the_track() {
    let lib = library_of(1);
    let mut c = controller();

    // nothing loaded yet
    assert_eq!(c.seek(10.0), 0.0);

    select_and_settle(&mut c, &lib, 0);
    assert_eq!(c.seek(-5.0), 0.0);
    assert_eq!(c.seek(500.0), 180.0);
    assert_eq!(c.seek(f64::NAN), 0.0);
    assert_eq!(c.seek(61.5), 61.5);
    assert_eq!(c.engine().position, 61.5);
    assert_eq!(c.seek_position(), 61.5);
}

#[test]
fn volume_is_clamped_and_survives_track_changes() {
    let lib = library_of(2);
    let mut c = controller();

    c.set_volume(1.5);
    assert_eq!(c.volume(), 1.0);
    c.set_volume(-1.0);
    assert_eq!(c.volume(), 0.0);

    c.set_volume(0.3);
    select_and_settle(&mut c, &lib, 0);
    assert_eq!(c.engine().volume, 0.3);

    c.set_volume(0.6);
    assert_eq!(c.engine().volume, 0.6);
    c.play_next(&lib).unwrap();
    assert_eq!(c.engine().volume, 0.6);
}

#[test]
fn playback_rate_applies_to_the_loaded_track_only() {
    let lib = library_of(2);
    let mut c = controller();

    assert!(!c.set_playback_rate(1.5));

    select_and_settle(&mut c, &lib, 0);
    assert!(c.set_playback_rate(1.5));
    assert_eq!(c.rate(), 1.5);
    assert_eq!(c.engine().rate, 1.5);

    assert!(!c.set_playback_rate(0.0));
    assert!(!c.set_playback_rate(-2.0));
    assert!(!c.set_playback_rate(f32::NAN));
    assert_eq!(c.rate(), 1.5);

    c.play_next(&lib).unwrap();
    assert_eq!(c.rate(), 1.0);
    assert_eq!(c.engine().rate, 1.0);
}

#[test]
fn loop_mode_cycles_through_all_three_states() {
    let mut c = controller();
    assert_eq!(c.loop_mode(), LoopMode::None);
    assert_eq!(c.toggle_loop_mode(), LoopMode::One);
    assert_eq!(c.toggle_loop_mode(), LoopMode::All);
    assert_eq!(c.toggle_loop_mode(), LoopMode::None);

    assert!(c.toggle_shuffle());
    assert!(!c.toggle_shuffle());
}

#[test]
fn track_end_with_loop_one_replays_the_same_track() {
    let lib = library_of(3);
    let mut c = controller();
    c.set_loop_mode(LoopMode::One);
    c.set_shuffle(true);
    select_and_settle(&mut c, &lib, 1);
    c.engine_mut().position = 180.0;

    c.engine_mut().finish();
    settle(&mut c, &lib);
    assert_eq!(c.current_index(), Some(1));
    assert_eq!(c.engine().position, 0.0);
    assert!(c.is_playing());
    assert_eq!(c.transport(), Transport::Playing);
    assert_eq!(c.engine().loads, 1);
}

#[test]
fn track_end_advances_then_stops_after_the_last_track() {
    let lib = library_of(3);
    let mut c = controller();
    select_and_settle(&mut c, &lib, 1);

    c.engine_mut().finish();
    settle(&mut c, &lib);
    assert_eq!(c.current_index(), Some(2));
    assert!(c.is_playing());
    c.take_events();

    c.engine_mut().finish();
    settle(&mut c, &lib);
    assert_eq!(c.current_index(), Some(2));
    assert_eq!(c.transport(), Transport::Empty);
    assert!(!c.is_playing());
    assert!(!c.engine().is_loaded());
    assert_eq!(c.take_events(), vec![ControllerEvent::Stopped]);
}

#[test]
fn track_end_with_loop_all_wraps_to_the_first_track() {
    let lib = library_of(3);
    let mut c = controller();
    c.set_loop_mode(LoopMode::All);
    select_and_settle(&mut c, &lib, 2);

    c.engine_mut().finish();
    settle(&mut c, &lib);
    assert_eq!(c.current_index(), Some(0));
    assert!(c.is_playing());
}

#[test]
fn loop_all_returns_to_the_start_after_a_full_cycle() {
    let lib = library_of(5);
    let mut c = controller();
    c.set_loop_mode(LoopMode::All);
    select_and_settle(&mut c, &lib, 2);

    let mut visited = Vec::new();
    for _ in 0..lib.len() {
        c.engine_mut().finish();
        settle(&mut c, &lib);
        visited.push(c.current_index().unwrap());
        assert!(c.is_playing());
    }
    assert_eq!(visited, vec![3, 4, 0, 1, 2]);
}

#[test]
fn shuffle_never_repeats_the_current_track() {
    let lib = library_of(4);
    let mut c = controller();
    c.set_shuffle(true);
    select_and_settle(&mut c, &lib, 0);

    for _ in 0..50 {
        let before = c.current_index();
        c.engine_mut().finish();
        settle(&mut c, &lib);
        assert_ne!(c.current_index(), before);
        assert!(c.current_index().unwrap() < 4);
    }
}

#[test]
fn shuffle_with_a_single_track_falls_back_to_loop_rules() {
    let lib = library_of(1);
    let mut c = controller();
    c.set_shuffle(true);
    select_and_settle(&mut c, &lib, 0);

    c.engine_mut().finish();
    settle(&mut c, &lib);
    assert_eq!(c.transport(), Transport::Empty);

    c.set_loop_mode(LoopMode::All);
    select_and_settle(&mut c, &lib, 0);
    c.engine_mut().finish();
    settle(&mut c, &lib);
    assert_eq!(c.current_index(), Some(0));
    assert!(c.is_playing());
}

#[test]
fn manual_next_and_previous_wrap_and_ignore_loop_mode() {
    let lib = library_of(3);
    let mut c = controller();

    c.play_next(&lib).unwrap();
    assert_eq!(c.current_index(), Some(0));

    let mut fresh = controller();
    fresh.play_previous(&lib).unwrap();
    assert_eq!(fresh.current_index(), Some(2));

    c.set_loop_mode(LoopMode::One);
    select_and_settle(&mut c, &lib, 2);
    c.play_next(&lib).unwrap();
    assert_eq!(c.current_index(), Some(0));
    c.play_previous(&lib).unwrap();
    assert_eq!(c.current_index(), Some(2));
    c.play_previous(&lib).unwrap();
    assert_eq!(c.current_index(), Some(1));
}

#[test]
fn next_and_previous_on_an_empty_library_do_nothing() {
    let lib = Library::new();
    let mut c = controller();
    c.play_next(&lib).unwrap();
    c.play_previous(&lib).unwrap();
    assert_eq!(c.current_index(), None);
    assert_eq!(c.engine().loads, 0);
}

#[test]
fn shuffled_next_picks_a_different_track() {
    let lib = library_of(5);
    let mut c = controller();
    c.set_shuffle(true);
    select_and_settle(&mut c, &lib, 3);
    for _ in 0..20 {
        let before = c.current_index();
        c.play_next(&lib).unwrap();
        assert_ne!(c.current_index(), before);
    }
}

#[test]
fn tick_follows_the_engine_while_playing() {
    let lib = library_of(1);
    let mut c = controller();
    select_and_settle(&mut c, &lib, 0);

    c.engine_mut().position = 12.5;
    c.tick();
    assert_eq!(c.seek_position(), 12.5);

    c.engine_mut().position = 999.0;
    c.tick();
    assert_eq!(c.seek_position(), 180.0);

    c.play_pause();
    settle(&mut c, &lib);
    c.engine_mut().position = 3.0;
    c.tick();
    assert_eq!(c.seek_position(), 180.0);
}

#[test]
fn unknown_engine_duration_falls_back_to_the_track() {
    let mut lib = library_of(1);
    let id = lib.get(0).unwrap().id;
    lib.set_duration(id, std::time::Duration::from_secs(90));
    let mut engine = MockEngine::new();
    engine.duration = None;
    let mut c = PlaybackController::with_rng(engine, StdRng::seed_from_u64(1));

    select_and_settle(&mut c, &lib, 0);
    assert_eq!(c.duration(), 90.0);
}

#[test]
fn unknown_duration_bounds_position_below_only() {
    let lib = library_of(1);
    let mut engine = MockEngine::new();
    engine.duration = None;
    let mut c = PlaybackController::with_rng(engine, StdRng::seed_from_u64(1));
    select_and_settle(&mut c, &lib, 0);
    assert_eq!(c.duration(), 0.0);

    // scrubbing and the per-frame resync follow the same rule
    assert_eq!(c.seek(25.0), 25.0);
    assert_eq!(c.seek(-1.0), 0.0);
    c.engine_mut().position = 42.0;
    c.tick();
    assert_eq!(c.seek_position(), 42.0);
    c.engine_mut().position = -3.0;
    c.tick();
    assert_eq!(c.seek_position(), 0.0);
}

#[test]
fn failed_advance_is_reported_as_an_event() {
    let mut lib = Library::new();
    lib.add_tracks(vec![
        NewTrack::from_path(Path::new("/music/a.mp3")),
        NewTrack::from_path(Path::new("/music/broken.mp3")),
    ]);
    let mut c = controller();
    select_and_settle(&mut c, &lib, 0);
    c.take_events();

    c.engine_mut().finish();
    settle(&mut c, &lib);
    assert_eq!(c.current_index(), Some(1));
    assert_eq!(c.transport(), Transport::Empty);
    let events = c.take_events();
    assert!(matches!(
        events.last(),
        Some(ControllerEvent::LoadFailed { index: 1, .. })
    ));
}

#[test]
fn shutdown_releases_the_engine() {
    let lib = library_of(1);
    let mut c = controller();
    select_and_settle(&mut c, &lib, 0);
    c.shutdown();
    assert!(c.engine().shut_down);
    assert!(!c.engine().is_loaded());
    assert_eq!(c.transport(), Transport::Empty);
}

#[test]
fn tap_keeps_only_the_newest_samples() {
    let tap = SampleTap::new(4);
    tap.push(&[1.0, 2.0, 3.0], 48_000);
    tap.push(&[4.0, 5.0, 6.0], 48_000);
    assert_eq!(tap.written(), 6);
    assert_eq!(tap.sample_rate(), 48_000);

    let mut out = [9.0; 6];
    let written = tap.read_latest(&mut out);
    assert_eq!(written, 6);
    assert_eq!(out, [0.0, 0.0, 3.0, 4.0, 5.0, 6.0]);

    let mut short = [0.0; 2];
    tap.read_latest(&mut short);
    assert_eq!(short, [5.0, 6.0]);

    tap.clear();
    tap.read_latest(&mut short);
    assert_eq!(short, [0.0, 0.0]);
}

#[test]
fn tapped_source_passes_audio_through_and_mirrors_a_mono_mix() {
    let stereo = vec![1.0, 0.0, 0.5, 0.5, -1.0, 1.0, 0.25, 0.75];
    let tap = SampleTap::new(16);
    let source = TappedSource::new(SamplesBuffer::new(2, 8_000, stereo.clone()), tap.clone());

    let played: Vec<f32> = source.collect();
    assert_eq!(played, stereo);

    let mut mono = [0.0; 4];
    tap.read_latest(&mut mono);
    assert_eq!(mono, [0.5, 0.5, 0.0, 0.5]);
    assert_eq!(tap.sample_rate(), 8_000);
}
