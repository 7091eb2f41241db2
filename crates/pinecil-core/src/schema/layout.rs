//! GATT layouts published by different IronOS releases
//!
//! Descriptors carry firmware-independent indices and slots; a [`Layout`]
//! turns them into the service and characteristic UUIDs one firmware release
//! actually exposes. The session detects the layout once per connection.

use uuid::Uuid;

use super::info::{bulk_uuid, BULK_DATA_SERVICE_UUID};
use super::settings::{setting_uuid, SAVE_TO_FLASH_INDEX, SETTINGS_SERVICE_UUID};

/// Settings service used before 2.21beta2
pub const LEGACY_SETTINGS_SERVICE_UUID: Uuid =
    Uuid::from_u128(0xF6D75F91_5A10_4EBA_A233_47D3F26A907F);

/// Bulk data service used before 2.21beta2
pub const LEGACY_BULK_DATA_SERVICE_UUID: Uuid =
    Uuid::from_u128(0x9EAE1ADB_9D0D_48C5_A6E7_AE93F0EA37B0);

const LEGACY_SETTING_BASE: u128 = 0xF6D70000_5A10_4EBA_A233_47D3F26A907F;
const LEGACY_BULK_BASE: u128 = 0x9EAE1000_9D0D_48C5_A6E7_AE93F0EA37B0;
/// Bluetooth SIG base UUID; 2.21beta1 published settings as 16-bit UUIDs on it
const SIG_BASE: u128 = 0x00000000_0000_1000_8000_00805F9B34FB;

/// Build reported for firmware that predates the build characteristic
pub const LEGACY_BUILD: &str = "2.20";

/// Attribute layout of one firmware generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    V2_20,
    V2_21Beta1,
    /// 2.21beta2 and every later release
    Current,
}

impl Layout {
    pub const fn version(self) -> &'static str {
        match self {
            Self::V2_20 => "2.20",
            Self::V2_21Beta1 => "2.21beta1",
            Self::Current => "2.21beta2",
        }
    }

    pub const fn settings_service(self) -> Uuid {
        match self {
            Self::V2_20 | Self::V2_21Beta1 => LEGACY_SETTINGS_SERVICE_UUID,
            Self::Current => SETTINGS_SERVICE_UUID,
        }
    }

    pub const fn bulk_service(self) -> Uuid {
        match self {
            Self::V2_20 | Self::V2_21Beta1 => LEGACY_BULK_DATA_SERVICE_UUID,
            Self::Current => BULK_DATA_SERVICE_UUID,
        }
    }

    /// Characteristic for the setting with IronOS index `index`
    pub const fn setting(self, index: u16) -> Uuid {
        let shifted = (index as u128) << 96;
        match self {
            Self::V2_20 => Uuid::from_u128(LEGACY_SETTING_BASE | shifted),
            Self::V2_21Beta1 => Uuid::from_u128(SIG_BASE | shifted),
            Self::Current => setting_uuid(index),
        }
    }

    /// Characteristic for slot `slot` of the bulk data service
    pub const fn bulk(self, slot: u16) -> Uuid {
        match self {
            Self::V2_20 | Self::V2_21Beta1 => {
                Uuid::from_u128(LEGACY_BULK_BASE | ((slot as u128) << 96))
            }
            Self::Current => bulk_uuid(slot),
        }
    }

    /// Whether per-field live data characteristics exist
    pub const fn has_live_service(self) -> bool {
        matches!(self, Self::Current)
    }

    /// Whether characteristics absent from the device table are skipped
    /// rather than reported as errors
    pub const fn is_legacy(self) -> bool {
        !matches!(self, Self::Current)
    }

    /// Pick the layout from the advertised service list
    ///
    /// `legacy_settings` lists the characteristics of the legacy settings
    /// service and is only consulted when the current one is absent.
    pub fn detect(services: &[Uuid], legacy_settings: &[Uuid]) -> Self {
        if services.contains(&SETTINGS_SERVICE_UUID) {
            return Self::Current;
        }
        let beta1_commit = Self::V2_21Beta1.setting(SAVE_TO_FLASH_INDEX);
        if legacy_settings.contains(&beta1_commit) {
            Self::V2_21Beta1
        } else {
            Self::V2_20
        }
    }
}
