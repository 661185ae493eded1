//! Logging setup.
//!
//! All output goes to stderr so that report markdown on stdout stays clean.
//! HTTP and TLS plumbing is pinned to `warn`; report-level events remain
//! readable at `debug`. `RUST_LOG`, when set, replaces the computed filter.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Crates pinned to `warn` regardless of the requested level.
pub const NOISY_MODULES: &[&str] = &[
    "hyper",
    "hyper_util",
    "reqwest",
    "h2",
    "rustls",
    "tokio_util",
    "wiremock",
];

/// Output encoding selected by `observability.log_format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// `"json"` (any case) selects JSON; anything else is human-readable.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// `EnvFilter` directives: the base level, then one `target=warn` per quiet target.
pub fn filter_directives(log_level: &str, excluded_targets: &[String]) -> String {
    let quiet = NOISY_MODULES
        .iter()
        .copied()
        .chain(excluded_targets.iter().map(String::as_str))
        .map(|target| format!("{target}=warn"));

    std::iter::once(log_level.trim().to_string())
        .chain(quiet)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn init_logging(log_level: &str, log_format: &str) {
    init_logging_with_exclusions(log_level, log_format, &[]);
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging_with_exclusions(log_level: &str, log_format: &str, excluded_targets: &[String]) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(log_level, excluded_targets)));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match LogFormat::parse(log_format) {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    if installed.is_ok() {
        tracing::debug!(level = %log_level, format = ?LogFormat::parse(log_format), "Logging ready");
    }
}

/// Fresh request id for a report span.
pub fn generate_trace_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
