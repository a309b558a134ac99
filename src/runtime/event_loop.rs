use std::time::Instant;

use crossterm::event::{self, Event, KeyEventKind};
use log::debug;
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, InputMode};
use crate::audio::AudioEngine;
use crate::config;
use crate::runtime::keys::{Action, action_for_key};
use crate::ui;
use crate::visual::{FrameLoop, Visuals};

/// Main terminal loop: drains playback events, runs a visual frame when one
/// is due, draws, then waits for input until the next frame. Returns
/// `Ok(())` when quit is requested.
pub fn run<E: AudioEngine>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App<E>,
    frames: &mut FrameLoop,
    visuals: &Visuals,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.pump();
        app.tick();

        let now = Instant::now();
        if frames.due(now) {
            let ctx = app.frame_context();
            frames.tick(now, &mut app.analyser, ctx);
            terminal.draw(|f| ui::draw(f, app, visuals, &settings.ui, &settings.controls))?;
        }

        let timeout = frames.time_until_next(Instant::now());
        if !event::poll(timeout)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let Some(action) = action_for_key(key, app.input_focused()) else {
                    continue;
                };
                if apply_action(app, action) {
                    return Ok(());
                }
            }
            // terminals deliver dropped files as a bracketed paste
            Event::Paste(payload) => {
                if app.input_focused() {
                    payload
                        .chars()
                        .filter(|c| !c.is_control())
                        .for_each(|c| app.push_input(c));
                } else {
                    app.drop_payload(&payload);
                }
            }
            _ => {}
        }
    }
}

/// Apply one keyboard action. Returns true when the app should quit.
pub fn apply_action<E: AudioEngine>(app: &mut App<E>, action: Action) -> bool {
    debug!("keys: {action:?}");
    match action {
        Action::Quit => return true,
        Action::Close => return !app.close_overlay(),
        Action::PlayPause => app.play_pause(),
        Action::Next => app.next(),
        Action::Previous => app.previous(),
        Action::ToggleLoop => {
            app.toggle_loop_mode();
        }
        Action::ToggleShuffle => {
            app.toggle_shuffle();
        }
        Action::TogglePlaylistView => app.toggle_playlist_view(),
        Action::ToggleShortcuts => app.toggle_shortcuts(),
        Action::ScrubBack => app.scrub(false),
        Action::ScrubForward => app.scrub(true),
        Action::VolumeDown => app.volume_down(),
        Action::VolumeUp => app.volume_up(),
        Action::Slower => app.cycle_speed(false),
        Action::Faster => app.cycle_speed(true),
        Action::OpenDirectory => app.begin_input(InputMode::OpenDirectory),
        Action::NewPlaylist => app.begin_input(InputMode::NewPlaylist),
        Action::AddToPlaylist => app.add_selected_to_playlist(),
        Action::CyclePlaylist => app.cycle_active_playlist(),
        Action::CursorUp => app.move_cursor(-1),
        Action::CursorDown => app.move_cursor(1),
        Action::SelectAtCursor => app.select_at_cursor(),
        Action::Type(c) => app.push_input(c),
        Action::Erase => app.pop_input(),
        Action::Submit => app.submit_input(),
        Action::Cancel => app.cancel_input(),
    }
    false
}
