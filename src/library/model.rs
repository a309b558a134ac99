use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Opaque track identity, unique within a session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(pub(crate) u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "track-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverArt {
    Placeholder,
    /// The source file carries an embedded picture.
    Embedded,
}

/// A playable track. Everything but `duration` is fixed once the track is
/// added to the [`Library`](super::Library).
#[derive(Debug, Clone)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub source: PathBuf,
    /// Unknown until read from the file or reported by the engine.
    pub duration: Option<Duration>,
    pub cover: CoverArt,
}

impl Track {
    /// "Artist - Title", or just the title when the artist is unknown.
    pub fn display(&self) -> String {
        if self.artist.trim().is_empty() || self.artist == UNKNOWN_ARTIST {
            self.title.clone()
        } else {
            format!("{} - {}", self.artist.trim(), self.title)
        }
    }
}

/// Track data produced by ingestion, before the library assigns an id.
#[derive(Debug, Clone)]
pub struct NewTrack {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub source: PathBuf,
    pub duration: Option<Duration>,
    pub cover: CoverArt,
}

impl NewTrack {
    /// Defaults derived from the file name alone.
    pub fn from_path(path: &Path) -> Self {
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("UNKNOWN")
            .to_string();

        Self {
            title,
            artist: UNKNOWN_ARTIST.to_string(),
            album: UNKNOWN_ALBUM.to_string(),
            source: path.to_path_buf(),
            duration: None,
            cover: CoverArt::Placeholder,
        }
    }
}

/// A named sub-collection. Holds references into the master track list.
#[derive(Debug, Clone)]
pub struct Playlist {
    pub name: String,
    pub(super) tracks: Vec<TrackId>,
}

impl Playlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracks: Vec::new(),
        }
    }

    pub fn tracks(&self) -> &[TrackId] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
