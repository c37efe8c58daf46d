use crate::config::{LogFormat, TelemetryConfig};
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Dependency targets held at `warn` unless a directive names them.
const QUIET_DEPENDENCIES: [&str; 2] = ["hyper=warn", "tokio=warn"];

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(f, "log filter '{value}' is not a valid EnvFilter directive")
            }
            TelemetryError::Subscriber(err) => {
                write!(f, "global subscriber already installed: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Install the global fmt subscriber for the evaluation service and CLI.
///
/// `RUST_LOG` takes precedence over `APP_LOG_LEVEL`.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => build_filter(&directives)?,
        _ => build_filter(&config.log_level)?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false);

    match config.format {
        LogFormat::Compact => builder.with_target(false).compact().try_init(),
        LogFormat::Full => builder.with_target(true).with_thread_names(true).try_init(),
    }
    .map_err(TelemetryError::Subscriber)
}

/// Parse `directives` and append the dependency defaults it does not override.
fn build_filter(directives: &str) -> Result<EnvFilter, TelemetryError> {
    let invalid = |source| TelemetryError::EnvFilter {
        value: directives.to_string(),
        source,
    };

    let mut filter = EnvFilter::try_new(directives).map_err(invalid)?;
    for default in QUIET_DEPENDENCIES {
        let target = default.split('=').next().unwrap_or(default);
        if directives.contains(target) {
            continue;
        }
        filter = filter.add_directive(default.parse().map_err(invalid)?);
    }
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_level_gains_dependency_defaults() {
        let filter = build_filter("debug").expect("valid level");
        let rendered = filter.to_string();
        assert!(rendered.contains("hyper=warn"));
        assert!(rendered.contains("debug"));
    }

    #[test]
    fn explicit_dependency_directive_is_kept() {
        let filter = build_filter("info,hyper=trace").expect("valid directives");
        let rendered = filter.to_string();
        assert!(rendered.contains("hyper=trace"));
        assert!(!rendered.contains("hyper=warn"));
    }

    #[test]
    fn malformed_directive_is_reported() {
        let error = build_filter("eco_eval=loud").expect_err("invalid level");
        assert!(error.to_string().contains("eco_eval=loud"));
    }
}
