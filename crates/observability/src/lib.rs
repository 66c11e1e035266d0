//! Process-wide logging setup shared by the itematic binaries.

/// Install the global subscriber, choosing the output format from
/// `ITEMATIC_LOG_FORMAT`.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Subscriber configuration (filter, output format).
pub mod tracing;

pub use tracing::{ENV_LOG_FORMAT, LogFormat};
