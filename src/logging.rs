//! Logging setup for hosts embedding the index.
//!
//! The library only emits `tracing` events; a host that wants to see them
//! calls [`init_with_config`] (or [`init`]) once at startup.
//!
//! # Configuration
//!
//! ```toml
//! [logging]
//! default = "warn"  # quiet by default
//!
//! [logging.modules]
//! "defindex::indexing" = "debug"  # per-file scan decisions
//! ```
//!
//! # Environment Variable
//!
//! `RUST_LOG` takes precedence over config:
//! ```bash
//! RUST_LOG=defindex=debug my-editor
//! ```

use std::sync::Once;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

const CLOCK_FORMAT: &str = "%H:%M:%S%.3f";

/// Local wall-clock time without the date. Editor sessions rarely span days.
struct ClockTime;

impl FormatTime for ClockTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format(CLOCK_FORMAT))
    }
}

/// Build the filter directive string for a logging config.
///
/// `default = "warn"` with `modules = {"defindex::storage" = "debug"}`
/// becomes `warn,defindex::storage=debug`.
pub fn filter_directives(config: &LoggingConfig) -> String {
    let mut modules: Vec<_> = config.modules.iter().collect();
    modules.sort();

    let mut filter_str = config.default.clone();
    for (module, level) in modules {
        filter_str.push_str(&format!(",{module}={level}"));
    }
    filter_str
}

/// Initialize logging with configuration.
///
/// Safe to call multiple times; only the first call installs a subscriber.
/// If another global subscriber is already set (e.g. by the host), this is
/// a no-op.
pub fn init_with_config(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(filter_directives(config))
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_timer(ClockTime)
            .with_level(true)
            .with_writer(std::io::stderr)
            .with_filter(filter);

        let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
    });
}

/// Initialize logging with `LoggingConfig::default()` (`warn`).
pub fn init() {
    init_with_config(&LoggingConfig::default());
}

/// Emit an info-level index event.
///
/// The event name is also recorded as the `event` field, so subscribers can
/// match on it without parsing the message. Scans report `finished` and
/// `cancelled` at this level.
///
/// ```ignore
/// log_event!("index", "finished", "{}: {stats}", root.display());
/// ```
#[macro_export]
macro_rules! log_event {
    ($component:expr, $event:expr) => {
        tracing::info!(event = $event, "[{}] {}", $component, $event)
    };
    ($component:expr, $event:expr, $($arg:tt)*) => {
        tracing::info!(event = $event, "[{}] {}: {}", $component, $event, format!($($arg)*))
    };
}

/// [`log_event!`] at debug level, for per-file decisions (`indexed`,
/// `unchanged`, `pruned`, `no symbols`) and cache `loaded`/`saved`.
///
/// ```ignore
/// debug_event!("index", "unchanged", "{}", path.display());
/// ```
#[macro_export]
macro_rules! debug_event {
    ($component:expr, $event:expr) => {
        tracing::debug!(event = $event, "[{}] {}", $component, $event)
    };
    ($component:expr, $event:expr, $($arg:tt)*) => {
        tracing::debug!(event = $event, "[{}] {}: {}", $component, $event, format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives_default() {
        assert_eq!(filter_directives(&LoggingConfig::default()), "warn");
    }

    #[test]
    fn test_filter_directives_with_modules() {
        let mut config = LoggingConfig::default();
        config
            .modules
            .insert("defindex::storage".to_string(), "debug".to_string());
        config
            .modules
            .insert("defindex::indexing".to_string(), "trace".to_string());

        assert_eq!(
            filter_directives(&config),
            "warn,defindex::indexing=trace,defindex::storage=debug"
        );
    }

    #[test]
    fn test_event_macros() {
        init();
        let stats = "3 files seen";
        crate::log_event!("index", "finished", "/work/app: {stats}");
        crate::log_event!("index", "cancelled");
        crate::debug_event!("index", "unchanged", "{}", "/work/app/a.py");
        crate::debug_event!("index", "loaded");
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
        tracing::debug!("logging initialised twice without panicking");
    }
}
