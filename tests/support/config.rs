use std::io::Write;

use strategist::infrastructure::config::ReconnectionConfig;
use tempfile::NamedTempFile;

pub fn test_reconnection_config() -> ReconnectionConfig {
    ReconnectionConfig {
        initial_delay_ms: 0,
        max_delay_ms: 0,
        backoff_multiplier: 1.0,
        max_consecutive_failures: 3,
        circuit_breaker_cooldown_ms: 0,
    }
}

/// A config file that lives as long as the returned handle.
pub fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}
