//! Scanner configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the ticket scanner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// How long a submitted code stays in Processing before the verdict
    /// is announced (milliseconds).
    #[serde(default = "default_processing_delay")]
    pub processing_delay_ms: u64,

    /// How long a verdict stays visible before the scanner returns to
    /// Idle (milliseconds). The scanner rejects new scans for the whole
    /// processing + dwell window.
    #[serde(default = "default_dwell")]
    pub dwell_ms: u64,
}

fn default_processing_delay() -> u64 {
    1500
}

fn default_dwell() -> u64 {
    4000
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            processing_delay_ms: default_processing_delay(),
            dwell_ms: default_dwell(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScannerConfig::default();
        assert_eq!(config.processing_delay_ms, 1500);
        assert_eq!(config.dwell_ms, 4000);
    }

    #[test]
    fn test_deserialize_empty() {
        let config: ScannerConfig = toml::from_str("").unwrap();
        assert_eq!(config.processing_delay_ms, 1500);
        assert_eq!(config.dwell_ms, 4000);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
            processing_delay_ms = 50
            dwell_ms = 80
        "#;
        let config: ScannerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.processing_delay_ms, 50);
        assert_eq!(config.dwell_ms, 80);
    }
}
