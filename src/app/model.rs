//! Application model: the library, the playback controller and the view
//! state the keyboard surface drives.

use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info, warn};

use crate::analysis::AnalyserBridge;
use crate::audio::{AudioEngine, ControllerEvent, LoopMode, PlaybackController};
use crate::config::{ControlsSettings, LibrarySettings, Settings};
use crate::error::SpindleError;
use crate::library::{self, Library, Track};
use crate::visual::FrameContext;

/// Which main panel is shown.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Player,
    Playlist,
}

/// What the focused text input (if any) is collecting.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    None,
    NewPlaylist,
    OpenDirectory,
}

/// One-line status message shown under the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

pub struct App<E> {
    pub library: Library,
    pub player: PlaybackController<E>,
    pub analyser: AnalyserBridge,

    pub view: View,
    pub show_shortcuts: bool,
    pub input_mode: InputMode,
    pub input: String,
    /// Highlighted row in the playlist view (index into the master list).
    pub cursor: usize,
    /// Playlist that `a` appends to.
    pub active_playlist: Option<usize>,
    pub notice: Option<Notice>,

    library_settings: LibrarySettings,
    controls: ControlsSettings,
    speed_presets: Vec<f32>,
}

impl<E: AudioEngine> App<E> {
    pub fn new(player: PlaybackController<E>, settings: &Settings) -> Self {
        Self {
            library: Library::new(),
            player,
            analyser: AnalyserBridge::from_settings(&settings.audio),
            view: View::Player,
            show_shortcuts: false,
            input_mode: InputMode::None,
            input: String::new(),
            cursor: 0,
            active_playlist: None,
            notice: None,
            library_settings: settings.library.clone(),
            controls: settings.controls.clone(),
            speed_presets: settings.playback.speed_presets.clone(),
        }
    }

    fn inform(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            is_error: false,
        });
    }

    fn report(&mut self, err: &SpindleError) {
        self.alert(err.to_string());
    }

    fn alert(&mut self, text: String) {
        warn!("app: {text}");
        self.notice = Some(Notice {
            text,
            is_error: true,
        });
    }

    /// Ingest dropped or command-line paths. Directories are scanned.
    ///
    /// The first track is selected (and starts playing) when nothing was
    /// selected before. Returns the number of tracks added.
    pub fn ingest_paths(&mut self, paths: &[PathBuf]) -> usize {
        let mut files = Vec::new();
        let mut scan_error = None;
        for path in paths {
            if path.is_dir() {
                match library::pick_directory(path, &self.library_settings) {
                    Ok(found) => files.extend(found),
                    Err(e) => {
                        warn!("app: skipping {}: {e}", path.display());
                        scan_error = Some(e);
                    }
                }
            } else {
                files.push(path.clone());
            }
        }
        if let (true, Some(e)) = (files.is_empty(), scan_error) {
            self.report(&e);
            return 0;
        }
        self.add_files(&files)
    }

    fn add_files(&mut self, files: &[PathBuf]) -> usize {
        let new = match library::ingest(files, &self.library_settings) {
            Ok(new) => new,
            Err(e) => {
                self.report(&e);
                return 0;
            }
        };

        let added = self.library.add_tracks(new);
        let count = added.len();
        info!("app: added {count} tracks");
        self.inform(format!(
            "added {count} track{}",
            if count == 1 { "" } else { "s" }
        ));

        if self.player.current_index().is_none() {
            self.select_track(0);
        }
        count
    }

    /// Parse a bracketed-paste payload as dropped files.
    pub fn drop_payload(&mut self, payload: &str) -> usize {
        let paths = library::parse_dropped_paths(payload);
        if paths.is_empty() {
            return 0;
        }
        self.ingest_paths(&paths)
    }

    /// Scan a user-typed directory. Empty input cancels silently.
    pub fn open_directory(&mut self, input: &str) -> usize {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            debug!("app: directory pick cancelled");
            return 0;
        }
        match library::pick_directory(&expand_home(trimmed), &self.library_settings) {
            Ok(files) => self.add_files(&files),
            Err(e) => {
                self.report(&e);
                0
            }
        }
    }

    pub fn select_track(&mut self, index: usize) {
        if let Err(e) = self.player.select_track(&self.library, index) {
            self.report(&e);
        }
    }

    /// Drain engine and controller events; called once per loop iteration.
    pub fn pump(&mut self) {
        self.player.handle_events(&self.library);
        for event in self.player.take_events() {
            match event {
                ControllerEvent::TrackChanged { .. } => {
                    // the previous tap died with the previous engine source
                    self.analyser.release();
                }
                ControllerEvent::TrackLoaded { index, duration } => {
                    self.analyser.attach(self.player.engine().output_tap());
                    let id = self.library.get(index).map(|t| t.id);
                    if let (Some(id), true) = (id, duration > 0.0) {
                        self.library.set_duration(id, Duration::from_secs_f64(duration));
                    }
                }
                ControllerEvent::LoadFailed { reason, .. } => {
                    self.analyser.release();
                    self.alert(reason);
                }
                ControllerEvent::Stopped => self.analyser.release(),
            }
        }
    }

    /// Per-frame controller resync.
    pub fn tick(&mut self) {
        self.player.tick();
    }

    pub fn frame_context(&self) -> FrameContext {
        FrameContext {
            playing: self.player.is_playing(),
            has_track: self.player.current_index().is_some(),
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.player.current_track(&self.library)
    }

    pub fn play_pause(&mut self) {
        self.player.play_pause();
    }

    pub fn next(&mut self) {
        if let Err(e) = self.player.play_next(&self.library) {
            self.report(&e);
        }
    }

    pub fn previous(&mut self) {
        if let Err(e) = self.player.play_previous(&self.library) {
            self.report(&e);
        }
    }

    pub fn toggle_loop_mode(&mut self) -> LoopMode {
        let mode = self.player.toggle_loop_mode();
        self.inform(format!("loop: {}", mode.label()));
        mode
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        let on = self.player.toggle_shuffle();
        self.inform(if on { "shuffle on" } else { "shuffle off" });
        on
    }

    /// Seek by the configured scrub step.
    pub fn scrub(&mut self, forward: bool) {
        let step = self.controls.scrub_seconds as f64;
        let pos = self.player.seek_position();
        self.player.seek(if forward { pos + step } else { pos - step });
    }

    pub fn volume_up(&mut self) {
        self.player
            .set_volume(self.player.volume() + self.controls.volume_step);
    }

    pub fn volume_down(&mut self) {
        self.player
            .set_volume(self.player.volume() - self.controls.volume_step);
    }

    /// Step to the next faster (or slower) speed preset. Stays put at the
    /// ends of the list.
    pub fn cycle_speed(&mut self, faster: bool) {
        const EPS: f32 = 1e-3;
        let rate = self.player.rate();
        let target = if faster {
            self.speed_presets.iter().copied().find(|&p| p > rate + EPS)
        } else {
            self.speed_presets
                .iter()
                .copied()
                .rev()
                .find(|&p| p < rate - EPS)
        };
        let Some(target) = target else {
            return;
        };
        if self.player.set_playback_rate(target) {
            self.inform(format!("speed {target}x"));
        } else {
            self.inform("nothing is playing");
        }
    }

    /// Add an empty playlist and make it the target of `a`. A blank name
    /// cancels.
    pub fn create_playlist(&mut self, name: &str) -> Option<usize> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let index = self.library.create_playlist(name);
        self.active_playlist = Some(index);
        self.inform(format!("created playlist \"{name}\""));
        Some(index)
    }

    /// Append the track under the cursor to the active playlist.
    pub fn add_selected_to_playlist(&mut self) {
        let Some(playlist) = self.active_playlist else {
            self.inform("no playlist yet (n creates one)");
            return;
        };
        let Some(track) = self.library.get(self.cursor) else {
            return;
        };
        let (id, title) = (track.id, track.title.clone());
        match self.library.add_to_playlist(playlist, id) {
            Ok(()) => {
                let name = self.library.playlists()[playlist].name.clone();
                self.inform(format!("added \"{title}\" to {name}"));
            }
            Err(e) => self.report(&e),
        }
    }

    /// Make the next playlist the target of `a`, wrapping.
    pub fn cycle_active_playlist(&mut self) {
        let count = self.library.playlists().len();
        if count == 0 {
            return;
        }
        self.active_playlist = Some(match self.active_playlist {
            Some(i) => (i + 1) % count,
            None => 0,
        });
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.library.len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
    }

    pub fn select_at_cursor(&mut self) {
        if self.cursor < self.library.len() {
            self.select_track(self.cursor);
        }
    }

    pub fn toggle_playlist_view(&mut self) {
        self.view = match self.view {
            View::Player => View::Playlist,
            View::Playlist => View::Player,
        };
    }

    pub fn toggle_shortcuts(&mut self) {
        self.show_shortcuts = !self.show_shortcuts;
    }

    pub fn input_focused(&self) -> bool {
        self.input_mode != InputMode::None
    }

    pub fn begin_input(&mut self, mode: InputMode) {
        self.input_mode = mode;
        self.input.clear();
    }

    pub fn push_input(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_input(&mut self) {
        self.input.pop();
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::None;
        self.input.clear();
    }

    /// Hand the typed text to whatever asked for it.
    pub fn submit_input(&mut self) {
        let mode = std::mem::take(&mut self.input_mode);
        let text = std::mem::take(&mut self.input);
        match mode {
            InputMode::None => {}
            InputMode::NewPlaylist => {
                self.create_playlist(&text);
            }
            InputMode::OpenDirectory => {
                self.open_directory(&text);
            }
        }
    }

    /// Esc: close the innermost thing that is open. Returns false when there
    /// was nothing to close.
    pub fn close_overlay(&mut self) -> bool {
        if self.input_focused() {
            self.cancel_input();
        } else if self.show_shortcuts {
            self.show_shortcuts = false;
        } else if self.view == View::Playlist {
            self.view = View::Player;
        } else {
            return false;
        }
        true
    }

    /// Detach the analyser, unload the engine and close the audio output.
    pub fn shutdown(&mut self) {
        self.analyser.release();
        self.player.shutdown();
    }
}

/// Expand a leading `~` to `$HOME`.
fn expand_home(input: &str) -> PathBuf {
    match (input.strip_prefix('~'), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest.trim_start_matches('/')),
        _ => PathBuf::from(input),
    }
}
