//! Classification of `btleplug` failures into the session error taxonomy

use btleplug::Error as BleError;
use pinecil_core::{DeviceAddress, PinecilError};

// ----------------------------------------------------------------------------
// Classifier
// ----------------------------------------------------------------------------

/// Message fragments some platforms use for a dropped link in otherwise
/// untyped errors
const DISCONNECT_HINTS: &[&str] = &["disconnected", "not connected", "turned off"];

/// Map a radio-stack error raised during `operation` on `address`
///
/// A connect that times out is treated as the device being absent; any other
/// timeout means the link stalled mid-session.
pub fn classify(err: BleError, operation: &'static str, address: &DeviceAddress) -> PinecilError {
    match err {
        BleError::DeviceNotFound => PinecilError::DeviceNotFound {
            address: address.clone(),
        },
        BleError::NotConnected => PinecilError::DeviceDisconnected,
        BleError::TimedOut(_) if operation == "connect" => PinecilError::DeviceNotFound {
            address: address.clone(),
        },
        BleError::TimedOut(_) => PinecilError::DeviceDisconnected,
        BleError::PermissionDenied => PinecilError::AdapterNotAvailable,
        other => {
            let reason = other.to_string();
            let lower = reason.to_lowercase();
            if DISCONNECT_HINTS.iter().any(|hint| lower.contains(hint)) {
                PinecilError::DeviceDisconnected
            } else {
                PinecilError::Transport { operation, reason }
            }
        }
    }
}

/// Map a failure of the host adapter itself, while opening it or scanning
pub(crate) fn adapter_error(err: BleError, operation: &'static str) -> PinecilError {
    match err {
        BleError::PermissionDenied | BleError::NotSupported(_) => PinecilError::AdapterNotAvailable,
        other => PinecilError::Transport {
            operation,
            reason: other.to_string(),
        },
    }
}
