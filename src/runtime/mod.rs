use std::env;

use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use log::{info, warn};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::{PlaybackController, RodioEngine};
use crate::visual::{FrameLoop, Visuals};

mod event_loop;
mod keys;
mod logging;
mod settings;
mod startup;


pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_warning) = settings::load_settings();
    logging::init(&settings.logging);
    if let Some(msg) = &config_warning {
        warn!("config: {msg}");
    }

    let player = PlaybackController::new(RodioEngine::new());
    let mut app = App::new(player, &settings);
    startup::apply_playback_defaults(&mut app, &settings);

    let paths = startup::startup_paths(env::args().skip(1));
    if !paths.is_empty() {
        app.ingest_paths(&paths);
    }
    if let Some(msg) = config_warning {
        app.notice = Some(crate::app::Notice {
            text: msg,
            is_error: true,
        });
    }

    let mut frames = FrameLoop::from_settings(&settings.visual);
    let mut visuals = Visuals::new(&settings.visual);
    visuals.mount(&mut frames);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result =
        event_loop::run(&mut terminal, &settings, &mut app, &mut frames, &visuals);

    visuals.unmount(&mut frames);
    frames.cancel_all();
    app.shutdown();
    info!("spindle: shut down");

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
