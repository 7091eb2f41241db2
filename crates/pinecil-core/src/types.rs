//! Core types shared by transports, discovery and sessions

use core::fmt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ----------------------------------------------------------------------------
// Device Address
// ----------------------------------------------------------------------------

/// Identifies a radio peer for the lifetime of a scan session
///
/// Platforms disagree on the case of MAC strings, so equality ignores ASCII
/// case. Addresses are not guaranteed stable across reboots of either side.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct DeviceAddress(String);

impl DeviceAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a raw address string
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl PartialEq for DeviceAddress {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl core::hash::Hash for DeviceAddress {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceAddress {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for DeviceAddress {
    fn from(address: String) -> Self {
        Self(address)
    }
}

// ----------------------------------------------------------------------------
// Advertisement
// ----------------------------------------------------------------------------

/// A single advertisement observed during a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement {
    pub address: DeviceAddress,
    pub local_name: Option<String>,
}

impl Advertisement {
    pub fn new(address: impl Into<DeviceAddress>, local_name: Option<String>) -> Self {
        Self {
            address: address.into(),
            local_name,
        }
    }

    /// Whether the advertised name contains `filter`, ignoring case
    ///
    /// Advertisements without a name never match.
    pub fn name_matches(&self, filter: &str) -> bool {
        self.local_name
            .as_deref()
            .map(|name| name.to_lowercase().contains(&filter.to_lowercase()))
            .unwrap_or(false)
    }
}

// ----------------------------------------------------------------------------
// Characteristic Reference
// ----------------------------------------------------------------------------

/// One readable/writable attribute slot in a peer's attribute table
///
/// References are only meaningful for the connection that enumerated them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacteristicRef {
    pub service: Uuid,
    pub uuid: Uuid,
}

impl CharacteristicRef {
    pub fn new(service: Uuid, uuid: Uuid) -> Self {
        Self { service, uuid }
    }
}

impl fmt::Display for CharacteristicRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service, self.uuid)
    }
}
