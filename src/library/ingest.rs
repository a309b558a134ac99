//! File ingestion: turns dropped/picked paths into [`NewTrack`]s.
//!
//! Files are accepted by MIME type (`audio/*`), guessed from the extension.
//! Tags and duration are read with `lofty`; a file whose tags cannot be
//! read is still accepted with name-derived metadata.

use std::path::{Path, PathBuf};

use lofty::prelude::*;
use log::{debug, warn};

use crate::config::LibrarySettings;
use crate::error::{Result, SpindleError};

use super::model::{CoverArt, NewTrack};

const MIME_TABLE: &[(&str, &str)] = &[
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("flac", "audio/flac"),
    ("ogg", "audio/ogg"),
    ("oga", "audio/ogg"),
    ("opus", "audio/opus"),
    ("m4a", "audio/mp4"),
    ("aac", "audio/aac"),
    ("aif", "audio/aiff"),
    ("aiff", "audio/aiff"),
    ("weba", "audio/webm"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("txt", "text/plain"),
];

/// Guess a MIME type from the file extension (case-insensitive).
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    MIME_TABLE
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

pub fn is_audio(path: &Path) -> bool {
    mime_type_for(path)
        .map(|m| m.starts_with("audio/"))
        .unwrap_or(false)
}

/// Build tracks for every audio file in `paths`, in order.
///
/// Non-audio and missing files are skipped. Returns
/// [`SpindleError::EmptySelection`] when nothing was accepted.
pub fn ingest(paths: &[PathBuf], settings: &LibrarySettings) -> Result<Vec<NewTrack>> {
    let mut tracks = Vec::new();

    for path in paths {
        if !is_audio(path) {
            debug!("ingest: skipping non-audio {}", path.display());
            continue;
        }
        if !path.is_file() {
            warn!("ingest: {} is not a readable file", path.display());
            continue;
        }

        let track = if settings.read_duration {
            read_tags(path)
        } else {
            NewTrack::from_path(path)
        };
        tracks.push(track);
    }

    if tracks.is_empty() {
        return Err(SpindleError::EmptySelection);
    }
    Ok(tracks)
}

/// Read tags and duration. Missing tags keep the name-derived defaults.
fn read_tags(path: &Path) -> NewTrack {
    let mut track = NewTrack::from_path(path);

    let tagged = match lofty::read_from_path(path) {
        Ok(t) => t,
        Err(e) => {
            debug!("ingest: no metadata for {}: {e}", path.display());
            return track;
        }
    };

    let duration = tagged.properties().duration();
    if !duration.is_zero() {
        track.duration = Some(duration);
    }

    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        if let Some(v) = tag.title().filter(|v| !v.trim().is_empty()) {
            track.title = v.trim().to_string();
        }
        if let Some(v) = tag.artist().filter(|v| !v.trim().is_empty()) {
            track.artist = v.trim().to_string();
        }
        if let Some(v) = tag.album().filter(|v| !v.trim().is_empty()) {
            track.album = v.trim().to_string();
        }
        if !tag.pictures().is_empty() {
            track.cover = CoverArt::Embedded;
        }
    }

    track
}

/// Split a bracketed-paste payload (what terminals emit when files are
/// dropped on them) into paths.
///
/// Handles whitespace/newline separation, single and double quotes,
/// backslash-escaped characters and `file://` URIs with percent escapes.
pub fn parse_dropped_paths(payload: &str) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut has_token = false;
    let mut chars = payload.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                has_token = true;
            }
            (None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                    has_token = true;
                }
            }
            (None, c) if c.is_whitespace() => {
                if has_token {
                    out.push(finish_token(&current));
                    current.clear();
                    has_token = false;
                }
            }
            (None, c) => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        out.push(finish_token(&current));
    }

    out.retain(|p| !p.as_os_str().is_empty());
    out
}

fn finish_token(token: &str) -> PathBuf {
    match token.strip_prefix("file://") {
        Some(rest) => PathBuf::from(percent_decode(rest)),
        None => PathBuf::from(token),
    }
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|h| u8::from_str_radix(h, 16).ok());
            if let Some(b) = hex {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
