//! Terminal rendering.
//!
//! The particle field is painted first as a backdrop; every panel is drawn
//! over it without clearing, so particles show through empty cells.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{App, InputMode, View};
use crate::audio::{AudioEngine, Transport};
use crate::config::{ControlsSettings, UiSettings};
use crate::library::CoverArt;
use crate::visual::Visuals;

static SHORTCUTS: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("space", "play/pause");
    map.insert("←/→", "prev/next track");
    // [/] is filled dynamically from config.
    map.insert("-/=", "volume down/up");
    map.insert("</>", "slower/faster");
    map.insert("l", "loop mode");
    map.insert("s", "shuffle");
    map.insert("p", "playlist view");
    map.insert("o", "open directory");
    map.insert("n", "new playlist");
    map.insert("a", "add to playlist");
    map.insert("tab", "next playlist");
    map.insert("↑/↓", "move cursor");
    map.insert("enter", "play track under cursor");
    map.insert("k", "shortcuts");
    map.insert("esc", "close");
    map.insert("q", "quit");
    map
});

/// One line per binding, in a stable human-friendly order.
fn shortcut_lines(controls: &ControlsSettings) -> Vec<String> {
    let order = [
        "space", "←/→", "[/]", "-/=", "</>", "l", "s", "p", "o", "n", "a", "tab", "↑/↓", "enter",
        "k", "esc", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "[/]" {
                Some(format!("{k:>6}  scrub -/+{}s", controls.scrub_seconds))
            } else {
                SHORTCUTS.get(k).map(|v| format!("{k:>6}  {v}"))
            }
        })
        .collect()
}

/// Format seconds as `m:ss`. Negative and non-finite input shows `0:00`.
pub fn format_time(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

fn transport_label(transport: Transport, has_track: bool) -> &'static str {
    match transport {
        Transport::Empty if has_track => "stopped",
        Transport::Empty => "no track",
        Transport::Loading => "loading",
        Transport::Playing => "playing",
        Transport::Paused => "paused",
        Transport::Ended => "ended",
    }
}

/// State, position, volume, loop, shuffle and speed.
pub fn transport_text<E: AudioEngine>(app: &App<E>) -> String {
    let player = &app.player;
    let parts = [
        transport_label(player.transport(), player.current_index().is_some()).to_string(),
        format!(
            "{} / {}",
            format_time(player.seek_position()),
            format_time(player.duration())
        ),
        format!("vol {:.0}%", player.volume() * 100.0),
        format!("loop {}", player.loop_mode().label()),
        format!("shuffle {}", if player.shuffle() { "on" } else { "off" }),
        format!("{}x", player.rate()),
    ];
    parts.join(" • ")
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(3);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width: width.min(r.width),
        height: height.min(r.height),
    }
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// Render the entire UI into `frame`.
pub fn draw<E: AudioEngine>(
    frame: &mut Frame,
    app: &App<E>,
    visuals: &Visuals,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let area = frame.area();
    frame.render_widget(visuals.particles.borrow().widget(), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(8),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" spindle ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    match app.view {
        View::Player => draw_player(frame, app, visuals, chunks[1]),
        View::Playlist => draw_playlists(frame, app, chunks[1]),
    }

    frame.render_widget(
        visuals.bars.borrow().widget().block(Block::bordered().title(" spectrum ")),
        chunks[2],
    );

    let transport = Paragraph::new(transport_text(app)).block(panel(" transport "));
    frame.render_widget(transport, chunks[3]);

    if let Some(notice) = &app.notice {
        let style = if notice.is_error {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Gray)
        };
        frame.render_widget(Paragraph::new(notice.text.as_str()).style(style), chunks[4]);
    }

    if app.show_shortcuts {
        draw_shortcuts(frame, controls_settings, chunks[1]);
    }
    if app.input_focused() {
        draw_input(frame, app, area);
    }
}

fn draw_player<E: AudioEngine>(frame: &mut Frame, app: &App<E>, visuals: &Visuals, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let track = app.current_track();
    let cover_art = track.is_some_and(|t| t.cover == CoverArt::Embedded);
    frame.render_widget(
        visuals.disc.borrow().widget(cover_art).block(Block::bordered()),
        cols[0],
    );

    let lines: Vec<Line> = match track {
        Some(t) => {
            let duration = t
                .duration
                .map(|d| format_time(d.as_secs_f64()))
                .unwrap_or_else(|| "-".to_string());
            vec![
                Line::from(t.title.as_str().bold()),
                Line::from(t.artist.as_str()),
                Line::from(t.album.as_str().italic()),
                Line::from(""),
                Line::from(format!("length: {duration}")),
                Line::from(format!("file: {}", t.source.display())).dark_gray(),
            ]
        }
        None => vec![
            Line::from("nothing playing"),
            Line::from(""),
            Line::from("drop audio files on the terminal").dark_gray(),
            Line::from("or press o to open a directory").dark_gray(),
        ],
    };
    let now_playing = Paragraph::new(lines)
        .block(panel(" now playing "))
        .wrap(Wrap { trim: true });
    frame.render_widget(now_playing, cols[1]);
}

fn draw_playlists<E: AudioEngine>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let current = app.player.current_index();
    let items: Vec<ListItem> = app
        .library
        .tracks()
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let marker = if current == Some(i) { "♪ " } else { "  " };
            let duration = t
                .duration
                .map(|d| format!("  {}", format_time(d.as_secs_f64())))
                .unwrap_or_default();
            ListItem::new(format!("{marker}{}{duration}", t.display()))
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" tracks "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !app.library.is_empty() {
        state.select(Some(app.cursor));
    }
    frame.render_stateful_widget(list, cols[0], &mut state);

    let mut lines: Vec<Line> = Vec::new();
    for (i, playlist) in app.library.playlists().iter().enumerate() {
        let active = app.active_playlist == Some(i);
        let name = Span::raw(format!(
            "{}{} ({})",
            if active { "* " } else { "" },
            playlist.name,
            playlist.len()
        ));
        lines.push(Line::from(if active { name.bold() } else { name }));
        for t in app.library.playlist_tracks(i) {
            lines.push(Line::from(format!("   {}", t.display())).dark_gray());
        }
    }
    if lines.is_empty() {
        lines.push(Line::from("no playlists (n creates one)").dark_gray());
    }
    let playlists = Paragraph::new(lines)
        .block(panel(" playlists "))
        .wrap(Wrap { trim: false });
    frame.render_widget(playlists, cols[1]);
}

fn draw_shortcuts(frame: &mut Frame, controls: &ControlsSettings, area: Rect) {
    let lines = shortcut_lines(controls);
    let popup = centered_rect_sized(44, lines.len() as u16 + 2, area);
    frame.render_widget(Clear, popup);
    let items: Vec<ListItem> = lines.into_iter().map(ListItem::new).collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" shortcuts (k closes) "),
    );
    frame.render_widget(list, popup);
}

fn draw_input<E: AudioEngine>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let title = match app.input_mode {
        InputMode::NewPlaylist => " playlist name ",
        InputMode::OpenDirectory => " open directory ",
        InputMode::None => return,
    };
    let popup = centered_rect_sized(60, 3, area);
    frame.render_widget(Clear, popup);
    let prompt = Paragraph::new(format!("{}_", app.input)).block(panel(title));
    frame.render_widget(prompt, popup);
}
