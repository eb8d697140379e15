//! Logger setup shared by every host embedding the crate.
//!
//! `RUST_LOG` wins when set; otherwise the configured filter applies.

use std::sync::Once;

static INIT: Once = Once::new();

/// Install the global `env_logger`. Later calls are ignored, so hosts and
/// tests can call this freely.
pub fn init_logging(default_filter: &str) {
    INIT.call_once(|| {
        let env = env_logger::Env::default().default_filter_or(default_filter.to_string());
        let result = env_logger::Builder::from_env(env)
            .format_timestamp_millis()
            .try_init();
        if let Err(err) = result {
            // Another logger was installed by the host first.
            eprintln!("chessclock: logger already initialised: {err}");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_is_harmless() {
        init_logging("debug");
        init_logging("warn");
        log::debug!("logging initialised twice without panicking");
    }
}
