//! Info family: read-only device metadata from the bulk data service

use uuid::Uuid;

use super::codec::Encoding;
use crate::error::{PinecilError, Result};

/// IronOS bulk data service
pub const BULK_DATA_SERVICE_UUID: Uuid = Uuid::from_u128(0x9EAE1000_9D0D_48C5_AA55_33E27F9BC533);

const BULK_CHARACTERISTIC_BASE: u128 = 0x9EAE1000_9D0D_48C5_AA55_33E27F9BC533;

/// Characteristic UUID of a slot in the bulk data service
pub const fn bulk_uuid(slot: u16) -> Uuid {
    Uuid::from_u128(BULK_CHARACTERISTIC_BASE | ((slot as u128) << 96))
}

/// Bulk slot holding the packed live-data record
pub const BULK_LIVE_DATA_SLOT: u16 = 0x0001;

/// Packed live-data record in the bulk service
pub const BULK_LIVE_DATA_UUID: Uuid = bulk_uuid(BULK_LIVE_DATA_SLOT);

/// How the raw bytes of an info characteristic become a string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoDecoding {
    /// UTF-8 firmware version such as `v2.22`, reported without the `v`
    Version,
    /// 64-bit serial rendered as 16 upper-case hex digits
    Serial,
    /// 64-bit chip ID folded to 32 bits, rendered as upper-case hex
    FoldedId,
    /// Accelerometer model code
    AccelerometerModel,
}

/// Static description of one info field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoField {
    pub name: &'static str,
    /// Slot in the bulk data service
    pub slot: u16,
    pub decoding: InfoDecoding,
}

impl InfoField {
    /// Characteristic UUID in the current layout
    pub const fn uuid(&self) -> Uuid {
        bulk_uuid(self.slot)
    }

    /// Decode a raw characteristic value
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        match self.decoding {
            InfoDecoding::Version => decode_version(self.name, bytes),
            InfoDecoding::Serial => {
                let n = Encoding::U64Le.decode(self.name, bytes)?;
                Ok(hex::encode_upper(n.to_be_bytes()))
            }
            InfoDecoding::FoldedId => {
                let n = Encoding::U64Le.decode(self.name, bytes)?;
                Ok(format!("{:X}", fold_id(n)))
            }
            InfoDecoding::AccelerometerModel => {
                let code = Encoding::U32Le.decode(self.name, bytes)?;
                Ok(accelerometer_name(code))
            }
        }
    }
}

/// Info fields read by `get_info`, in read order
pub const INFO_FIELDS: &[InfoField] = &[
    InfoField {
        name: "build",
        slot: 0x0003,
        decoding: InfoDecoding::Version,
    },
    InfoField {
        name: "serial",
        slot: 0x0004,
        decoding: InfoDecoding::Serial,
    },
    InfoField {
        name: "id",
        slot: 0x0005,
        decoding: InfoDecoding::FoldedId,
    },
    InfoField {
        name: "accelerometer",
        slot: 0x0002,
        decoding: InfoDecoding::AccelerometerModel,
    },
];

/// Name the device advertises for a given unique ID
pub fn device_name(id: &str) -> String {
    format!("Pinecil-{}", id)
}

/// Fold the 64-bit MCU unique ID the same way the firmware shows it on screen
pub fn fold_id(n: u64) -> u32 {
    ((n & 0xFFFF_FFFF) ^ (n >> 32)) as u32
}

fn decode_version(field: &str, bytes: &[u8]) -> Result<String> {
    let text = core::str::from_utf8(bytes)
        .map_err(|e| PinecilError::malformed(field, e.to_string()))?;
    let text = text.trim_end_matches('\0').trim();
    Ok(text.strip_prefix('v').unwrap_or(text).to_string())
}

fn accelerometer_name(code: u64) -> String {
    let name = match code {
        0 => "scanning",
        1 => "none",
        2 => "MMA8652FC",
        3 => "LIS2DH12",
        4 => "BMA223",
        5 => "MSA301",
        6 => "SC7A20",
        7 => "GPIO",
        8 => "LIS2DH12 clone",
        _ => return format!("unknown ({})", code),
    };
    name.to_string()
}
