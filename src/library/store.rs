use std::ops::Range;
use std::time::Duration;

use log::debug;

use crate::error::{Result, SpindleError};

use super::model::{NewTrack, Playlist, Track, TrackId};

/// The master track collection plus the named playlists that reference it.
#[derive(Debug, Default)]
pub struct Library {
    tracks: Vec<Track>,
    playlists: Vec<Playlist>,
    next_id: u64,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `new` to the master list, assigning ids.
    ///
    /// Returns the index range the tracks landed in.
    pub fn add_tracks(&mut self, new: Vec<NewTrack>) -> Range<usize> {
        let start = self.tracks.len();
        for t in new {
            let id = TrackId(self.next_id);
            self.next_id += 1;
            self.tracks.push(Track {
                id,
                title: t.title,
                artist: t.artist,
                album: t.album,
                source: t.source,
                duration: t.duration,
                cover: t.cover,
            });
        }
        debug!("library: added {} tracks", self.tracks.len() - start);
        start..self.tracks.len()
    }

    /// Append an empty playlist. Names are not required to be unique.
    pub fn create_playlist(&mut self, name: impl Into<String>) -> usize {
        self.playlists.push(Playlist::new(name));
        self.playlists.len() - 1
    }

    /// Append a reference to `track` to the playlist at `playlist_index`.
    pub fn add_to_playlist(&mut self, playlist_index: usize, track: TrackId) -> Result<()> {
        if self.index_of(track).is_none() {
            return Err(SpindleError::UnknownTrack(track.to_string()));
        }
        let len = self.playlists.len();
        let playlist = self
            .playlists
            .get_mut(playlist_index)
            .ok_or(SpindleError::InvalidIndex {
                index: playlist_index,
                len,
            })?;
        playlist.tracks.push(track);
        Ok(())
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn index_of(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    /// Resolve the members of a playlist against the master list.
    pub fn playlist_tracks(&self, playlist_index: usize) -> Vec<&Track> {
        self.playlists
            .get(playlist_index)
            .map(|p| {
                p.tracks()
                    .iter()
                    .filter_map(|&id| self.index_of(id).and_then(|i| self.tracks.get(i)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Record a duration learned after the track was created.
    pub fn set_duration(&mut self, id: TrackId, duration: Duration) {
        if let Some(t) = self.tracks.iter_mut().find(|t| t.id == id) {
            t.duration = Some(duration);
        }
    }
}
