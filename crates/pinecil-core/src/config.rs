//! Discovery and connection configuration

use std::time::Duration;

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Configuration for discovery scans and connection attempts
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PinecilConfig {
    /// How long a single discovery scan listens for advertisements
    pub scan_timeout: Duration,
    /// Maximum time to wait for a connection attempt
    pub connection_timeout: Duration,
    /// Substring matched against advertised names by default
    pub name_filter: String,
}

impl Default for PinecilConfig {
    fn default() -> Self {
        Self {
            scan_timeout: Duration::from_secs(5),
            connection_timeout: Duration::from_secs(10),
            name_filter: "pinecil".to_string(),
        }
    }
}

impl PinecilConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set scan timeout
    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }

    /// Set connection timeout
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set the default advertised-name filter
    pub fn with_name_filter(mut self, filter: impl Into<String>) -> Self {
        self.name_filter = filter.into();
        self
    }
}
