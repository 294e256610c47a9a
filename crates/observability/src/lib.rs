//! Process-wide logging setup shared by the binaries.

/// Subscriber installation (filters, formats).
pub mod subscriber;

pub use subscriber::{LogFormat, ObservabilityConfig};

/// Initialize logging from the environment.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    subscriber::init(&ObservabilityConfig::from_env());
}

/// Initialize logging with an explicit configuration.
pub fn init_with(config: &ObservabilityConfig) {
    subscriber::init(config);
}
