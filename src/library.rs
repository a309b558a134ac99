//! Track library: the master track list, named playlists, and the ingestion
//! boundary (dropped files and opened directories).

mod ingest;
mod model;
mod scan;
mod store;

pub use ingest::{ingest, is_audio, mime_type_for, parse_dropped_paths};
pub use model::*;
pub use scan::pick_directory;
pub use store::Library;
