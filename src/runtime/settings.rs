use crate::config;
use crate::error::SpindleError;

/// Load settings, falling back to defaults when the file is unreadable or
/// invalid. The second value describes why the fallback happened; logging
/// is not up yet at this point, so the caller reports it.
pub fn load_settings() -> (config::Settings, Option<String>) {
    match config::Settings::load() {
        Ok(s) => match s.validate() {
            Ok(()) => (s, None),
            Err(msg) => (
                config::Settings::default(),
                Some(format!("invalid config, using defaults: {msg}")),
            ),
        },
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            let err = SpindleError::from(e);
            (
                config::Settings::default(),
                Some(format!("failed to load config, using defaults: {err}")),
            )
        }
    }
}
