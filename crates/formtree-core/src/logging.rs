//! Logging integration for the formtree toolkit.
//!
//! Provides a helper for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings). The toolkit itself only emits
//! events (silent writes, rejected edits, discarded stale loads, transport
//! failures); installing a subscriber is the host application's call.

use crate::settings::Settings;

/// Picks the filter directive: an explicit `log_level` wins, otherwise the
/// level follows the `debug` flag.
fn filter_directive(settings: &Settings) -> &str {
    match settings.log_level.as_deref() {
        Some(level) if !level.is_empty() => level,
        _ if settings.debug => "debug",
        _ => "info",
    }
}

/// Sets up the global tracing subscriber based on the given settings.
///
/// In debug mode a pretty, human-readable format is used; otherwise a
/// structured JSON format with flattened event fields. Installing a second
/// subscriber leaves the first one in place.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(filter_directive(settings))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .flatten_event(true)
            .try_init()
    };
    if installed.is_err() {
        tracing::debug!("global tracing subscriber already installed, keeping it");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_log_level_wins() {
        let settings = Settings {
            debug: true,
            log_level: Some("formtree_forms=trace".to_string()),
        };
        assert_eq!(filter_directive(&settings), "formtree_forms=trace");
    }

    #[test]
    fn test_unset_log_level_follows_debug_flag() {
        let mut settings = Settings {
            debug: true,
            log_level: None,
        };
        assert_eq!(filter_directive(&settings), "debug");

        settings.debug = false;
        assert_eq!(filter_directive(&settings), "info");

        // Empty counts as unset.
        settings.log_level = Some(String::new());
        assert_eq!(filter_directive(&settings), "info");
    }
}
