//! Error types for the Pinecil session layer
//!
//! Every failure surfaced to callers is a [`PinecilError`]. The four kinds a
//! caller is expected to branch on (range, unknown name, unreachable peer and
//! lost link) are exposed through [`PinecilError::kind`]; everything else
//! collapses into [`ErrorKind::Other`].

use thiserror::Error;
use uuid::Uuid;

use crate::types::DeviceAddress;

// ----------------------------------------------------------------------------
// Error Types
// ----------------------------------------------------------------------------

/// Errors raised by discovery, transports and device sessions
#[derive(Error, Debug)]
pub enum PinecilError {
    #[error("Value {value} out of range for {setting} ({min}-{max})")]
    ValueOutOfRange {
        setting: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Invalid setting: {name}")]
    InvalidSetting { name: String },

    #[error("Device not found: {address}")]
    DeviceNotFound { address: DeviceAddress },

    #[error("Device disconnected")]
    DeviceDisconnected,

    #[error("BLE adapter not available")]
    AdapterNotAvailable,

    #[error("Characteristic not found: {uuid}")]
    CharacteristicNotFound { uuid: Uuid },

    #[error("Malformed value for {field}: {reason}")]
    MalformedValue { field: String, reason: String },

    #[error("Transport error during {operation}: {reason}")]
    Transport {
        operation: &'static str,
        reason: String,
    },
}

/// Coarse classification of a [`PinecilError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A setting write was outside the descriptor's declared range
    ValueOutOfRange,
    /// A name is not present in the schema registry
    InvalidSetting,
    /// The addressed peer could not be located or reached
    DeviceNotFound,
    /// The link is absent or dropped during an operation
    DeviceDisconnected,
    /// Adapter, attribute table or payload problems
    Other,
}

impl PinecilError {
    /// Classify this error into one of the caller-facing kinds
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValueOutOfRange { .. } => ErrorKind::ValueOutOfRange,
            Self::InvalidSetting { .. } => ErrorKind::InvalidSetting,
            Self::DeviceNotFound { .. } => ErrorKind::DeviceNotFound,
            Self::DeviceDisconnected => ErrorKind::DeviceDisconnected,
            Self::AdapterNotAvailable
            | Self::CharacteristicNotFound { .. }
            | Self::MalformedValue { .. }
            | Self::Transport { .. } => ErrorKind::Other,
        }
    }

    /// Whether the error reports a missing or dropped link
    pub fn is_disconnected(&self) -> bool {
        self.kind() == ErrorKind::DeviceDisconnected
    }

    pub(crate) fn invalid_setting(name: &str) -> Self {
        Self::InvalidSetting {
            name: name.to_string(),
        }
    }

    pub(crate) fn malformed(field: &str, reason: impl Into<String>) -> Self {
        Self::MalformedValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results with `PinecilError`
pub type Result<T> = core::result::Result<T, PinecilError>;
