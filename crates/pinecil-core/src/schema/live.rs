//! Live data family: read-only telemetry
//!
//! The firmware publishes every value twice: packed into one `u32` record in
//! the bulk service, and as individual characteristics in the live data
//! service. Snapshots read the record; single values read their own slot.

use uuid::Uuid;

use super::codec::Encoding;

/// IronOS live data service
pub const LIVE_DATA_SERVICE_UUID: Uuid = Uuid::from_u128(0xD85EF000_168E_4A71_AA55_33E27F9BC533);

const LIVE_CHARACTERISTIC_BASE: u128 = 0xD85EF000_168E_4A71_AA55_33E27F9BC533;

/// Encoding of each value, both packed and standalone
pub const LIVE_DATA_ENCODING: Encoding = Encoding::U32Le;

/// Unit attached to a live value as reported by the firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Degrees in the unit selected by the `TemperatureUnit` setting
    Degrees,
    DeciDegrees,
    DeciVolts,
    MicroVolts,
    DeciOhms,
    DeciWatts,
    DeciSeconds,
    /// Unscaled reading or enumeration code
    Raw,
}

/// Static description of one live value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveDataField {
    pub name: &'static str,
    /// Position in the bulk record
    pub index: usize,
    pub unit: Unit,
}

impl LiveDataField {
    const fn new(name: &'static str, index: usize, unit: Unit) -> Self {
        Self { name, index, unit }
    }

    /// Standalone characteristic in the live data service
    pub const fn uuid(&self) -> Uuid {
        Uuid::from_u128(LIVE_CHARACTERISTIC_BASE | (((self.index as u128) + 1) << 96))
    }
}

/// Live values in bulk record order
pub const LIVE_DATA_FIELDS: &[LiveDataField] = &[
    LiveDataField::new("LiveTemp", 0, Unit::Degrees),
    LiveDataField::new("SetTemp", 1, Unit::Degrees),
    LiveDataField::new("Voltage", 2, Unit::DeciVolts),
    LiveDataField::new("HandleTemp", 3, Unit::DeciDegrees),
    LiveDataField::new("PWMLevel", 4, Unit::Raw),
    LiveDataField::new("PowerSource", 5, Unit::Raw),
    LiveDataField::new("TipResistance", 6, Unit::DeciOhms),
    LiveDataField::new("Uptime", 7, Unit::DeciSeconds),
    LiveDataField::new("MovementTime", 8, Unit::DeciSeconds),
    LiveDataField::new("MaxTipTempAbility", 9, Unit::Degrees),
    LiveDataField::new("uVoltsTip", 10, Unit::MicroVolts),
    LiveDataField::new("HallSensor", 11, Unit::Raw),
    LiveDataField::new("OperatingMode", 12, Unit::Raw),
    LiveDataField::new("Watts", 13, Unit::DeciWatts),
];
