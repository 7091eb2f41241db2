//! Device discovery
//!
//! Every call performs a fresh, time-bounded scan through the [`Scanner`];
//! nothing is cached between calls.

use std::collections::HashSet;

use smallvec::SmallVec;
use tracing::{debug, info};

use crate::config::PinecilConfig;
use crate::error::Result;
use crate::session::DeviceSession;
use crate::transport::Scanner;
use crate::types::{Advertisement, DeviceAddress};

// ----------------------------------------------------------------------------
// Discovery Implementation
// ----------------------------------------------------------------------------

/// Scans for devices by advertised name and hands out sessions for them
pub struct Discovery<S: Scanner> {
    scanner: S,
    config: PinecilConfig,
}

impl<S: Scanner> Discovery<S> {
    pub fn new(scanner: S) -> Self {
        Self::with_config(scanner, PinecilConfig::default())
    }

    pub fn with_config(scanner: S, config: PinecilConfig) -> Self {
        Self { scanner, config }
    }

    pub fn config(&self) -> &PinecilConfig {
        &self.config
    }

    pub fn scanner(&self) -> &S {
        &self.scanner
    }

    /// Scan and return the addresses whose advertised name contains
    /// `name_filter`, ignoring case
    ///
    /// Repeated advertisements from one address collapse into a single entry
    /// in first-seen order. Finding nothing is not an error.
    pub async fn scan(&self, name_filter: &str) -> Result<SmallVec<[DeviceAddress; 8]>> {
        info!("Detecting \"{}\"...", name_filter);
        let advertisements = self.scanner.scan(self.config.scan_timeout).await?;
        let addresses = filter_advertisements(advertisements, name_filter);
        debug!("Detecting \"{}\" DONE: {} found", name_filter, addresses.len());
        Ok(addresses)
    }

    /// Scan and build one unconnected session per matching device
    pub async fn find_devices(
        &self,
        name_filter: &str,
    ) -> Result<Vec<DeviceSession<S::Transport>>> {
        let addresses = self.scan(name_filter).await?;
        Ok(addresses
            .iter()
            .map(|address| DeviceSession::new(self.scanner.transport_for(address)))
            .collect())
    }
}

/// Keep named matches, deduplicated by address in first-seen order
pub fn filter_advertisements(
    advertisements: impl IntoIterator<Item = Advertisement>,
    name_filter: &str,
) -> SmallVec<[DeviceAddress; 8]> {
    let mut seen = HashSet::new();
    let mut addresses = SmallVec::new();
    for advertisement in advertisements {
        if !advertisement.name_matches(name_filter) {
            continue;
        }
        if seen.insert(advertisement.address.clone()) {
            info!(
                "Found {} at {}",
                advertisement.local_name.as_deref().unwrap_or_default(),
                advertisement.address
            );
            addresses.push(advertisement.address);
        }
    }
    addresses
}
