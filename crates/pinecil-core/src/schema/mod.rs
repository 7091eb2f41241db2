//! Schema registry for the IronOS GATT layout
//!
//! Three static families of descriptors, looked up by exact name:
//!
//! - [`settings`] - read/write values with a declared range
//! - [`info`] - read-only device metadata decoded to strings
//! - [`live`] - read-only, unit-tagged telemetry
//!
//! Each descriptor fully determines its wire encoding, so the session layer
//! never parses bytes on its own. Where a descriptor lives on the wire depends
//! on the firmware release; [`layout`] maps it.

pub mod codec;
pub mod info;
pub mod layout;
pub mod live;
pub mod settings;

pub use codec::Encoding;
pub use info::{
    InfoDecoding, InfoField, BULK_DATA_SERVICE_UUID, BULK_LIVE_DATA_SLOT, BULK_LIVE_DATA_UUID,
    INFO_FIELDS,
};
pub use layout::{
    Layout, LEGACY_BUILD, LEGACY_BULK_DATA_SERVICE_UUID, LEGACY_SETTINGS_SERVICE_UUID,
};
pub use live::{LiveDataField, Unit, LIVE_DATA_ENCODING, LIVE_DATA_FIELDS, LIVE_DATA_SERVICE_UUID};
pub use settings::{SettingDescriptor, SAVE_TO_FLASH, SETTINGS, SETTINGS_SERVICE_UUID};

use crate::error::{PinecilError, Result};

/// Look up a setting descriptor by name
pub fn setting(name: &str) -> Result<&'static SettingDescriptor> {
    SETTINGS
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| PinecilError::invalid_setting(name))
}

/// Look up an info field by name
pub fn info_field(name: &str) -> Result<&'static InfoField> {
    INFO_FIELDS
        .iter()
        .find(|f| f.name == name)
        .ok_or_else(|| PinecilError::invalid_setting(name))
}

/// Look up a live data field by name
pub fn live_field(name: &str) -> Result<&'static LiveDataField> {
    LIVE_DATA_FIELDS
        .iter()
        .find(|f| f.name == name)
        .ok_or_else(|| PinecilError::invalid_setting(name))
}
