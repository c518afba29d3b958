//! Structured logging for the dispatcher.
//!
//! The configured filter governs dispatcher targets. The broker and HTTP
//! stacks log through `log`; their records are bridged into the same
//! subscriber and capped at `warn` unless the filter names them.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use dispatcher_config::{Config, LogFormat};

/// Dependency targets quietened by default.
const DEPENDENCY_TARGETS: [&str; 4] = ["rdkafka", "reqwest", "hyper", "rustls"];

/// Loudest level a dependency reaches without an explicit directive.
const DEPENDENCY_CEILING: LevelFilter = LevelFilter::WARN;

static SUBSCRIBER: OnceCell<()> = OnceCell::new();

/// Errors encountered while configuring logging.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter expression is malformed.
    #[error("invalid log filter '{expression}': {reason}")]
    Filter {
        /// Expression after dependency directives were added.
        expression: String,
        /// Parser diagnostic.
        reason: String,
    },
    /// Another global subscriber was already installed.
    #[error("failed to install log subscriber: {0}")]
    Subscriber(#[from] TryInitError),
}

/// Installs the global subscriber the first time it is called.
///
/// Later calls succeed without touching global state, so bootstrap can run
/// repeatedly inside one test binary.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter does not parse or a foreign
/// subscriber already owns the process.
pub fn initialise(config: &Config) -> Result<(), TelemetryError> {
    SUBSCRIBER
        .get_or_try_init(|| install_subscriber(config))
        .map(|_| ())
}

fn install_subscriber(config: &Config) -> Result<(), TelemetryError> {
    let filter = dispatch_filter(config.log_filter())?;
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(fmt::time::UtcTime::rfc_3339());

    match config.log_format() {
        LogFormat::Json => builder.json().flatten_event(true).finish().try_init()?,
        LogFormat::Compact => builder.compact().finish().try_init()?,
    }
    Ok(())
}

fn dispatch_filter(configured: &str) -> Result<EnvFilter, TelemetryError> {
    let expression = filter_expression(configured);
    EnvFilter::try_new(&expression).map_err(|error| TelemetryError::Filter {
        expression,
        reason: error.to_string(),
    })
}

/// Appends a ceiling for each dependency the configured filter leaves
/// unnamed.
///
/// Without a bare default level the expression is returned unchanged, since
/// unmatched targets are already disabled.
fn filter_expression(configured: &str) -> String {
    let directives: Vec<&str> = configured
        .split(',')
        .map(str::trim)
        .filter(|directive| !directive.is_empty())
        .collect();
    let Some(default_level) = directives
        .iter()
        .filter_map(|directive| directive.parse::<LevelFilter>().ok())
        .last()
    else {
        return directives.join(",");
    };

    let ceiling = default_level
        .min(DEPENDENCY_CEILING)
        .to_string()
        .to_ascii_lowercase();
    let mut expression = directives.join(",");
    for target in DEPENDENCY_TARGETS {
        if !directives.iter().any(|directive| names_target(directive, target)) {
            expression.push_str(&format!(",{target}={ceiling}"));
        }
    }
    expression
}

fn names_target(directive: &str, target: &str) -> bool {
    let named = directive.split(['=', '[']).next().unwrap_or_default();
    named == target || named.starts_with(&format!("{target}::"))
}
