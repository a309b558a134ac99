use std::fs::OpenOptions;

use env_logger::{Builder, Env, Target};

use crate::config::LoggingSettings;

/// Route `log` records to the configured file. `RUST_LOG` overrides the
/// configured level. The terminal is owned by the UI, so when the file
/// cannot be opened logging stays off.
pub fn init(settings: &LoggingSettings) {
    let path = settings.resolved_file();
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(_) => return,
    };

    let _ = Builder::from_env(Env::default().default_filter_or(settings.level.as_str()))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init();
    log::info!("spindle {} logging to {}", env!("CARGO_PKG_VERSION"), path.display());
}
