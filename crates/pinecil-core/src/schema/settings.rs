//! Settings family: writable, range-checked `u16` values

use uuid::Uuid;

use super::codec::Encoding;

/// IronOS settings service
pub const SETTINGS_SERVICE_UUID: Uuid = Uuid::from_u128(0xF6D80000_5A10_4EBA_AA55_33E27F9BC533);

const SETTING_CHARACTERISTIC_BASE: u128 = 0xF6D70000_5A10_4EBA_AA55_33E27F9BC533;

/// Characteristic index of the flash commit command
pub const SAVE_TO_FLASH_INDEX: u16 = 0xFFFF;

/// Characteristic UUID of the setting with the given IronOS index
pub const fn setting_uuid(index: u16) -> Uuid {
    Uuid::from_u128(SETTING_CHARACTERISTIC_BASE | ((index as u128) << 96))
}

/// Static description of one device setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingDescriptor {
    pub name: &'static str,
    pub index: u16,
    pub encoding: Encoding,
    pub min: i64,
    pub max: i64,
}

impl SettingDescriptor {
    const fn new(name: &'static str, index: u16, min: i64, max: i64) -> Self {
        Self {
            name,
            index,
            encoding: Encoding::U16Le,
            min,
            max,
        }
    }

    /// Characteristic UUID in the current layout; see [`Layout`](super::Layout)
    /// for older firmware
    pub const fn uuid(&self) -> Uuid {
        setting_uuid(self.index)
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// The flash commit command; written with `1` to persist RAM settings
pub const SAVE_TO_FLASH: SettingDescriptor =
    SettingDescriptor::new("save_to_flash", SAVE_TO_FLASH_INDEX, 0, 1);

/// Every setting exposed by the firmware, in IronOS index order
///
/// Temperature limits are in °C whatever `TemperatureUnit` the device is set
/// to. An iron displaying °F still has its temperatures checked against
/// these ranges.
pub const SETTINGS: &[SettingDescriptor] = &[
    // Celsius range, not converted for TemperatureUnit = 1
    SettingDescriptor::new("SetTemperature", 0, 10, 450),
    // Celsius range, not converted for TemperatureUnit = 1
    SettingDescriptor::new("SleepTemperature", 1, 10, 450),
    SettingDescriptor::new("SleepTimeout", 2, 0, 15),
    SettingDescriptor::new("DCInCutoff", 3, 0, 4),
    SettingDescriptor::new("MinVolCell", 4, 24, 38),
    SettingDescriptor::new("QCMaxVoltage", 5, 90, 220),
    SettingDescriptor::new("DisplayRotation", 6, 0, 2),
    SettingDescriptor::new("MotionSensitivity", 7, 0, 9),
    SettingDescriptor::new("AnimLoop", 8, 0, 1),
    SettingDescriptor::new("AnimSpeed", 9, 0, 3),
    SettingDescriptor::new("AutoStart", 10, 0, 3),
    SettingDescriptor::new("ShutdownTimeout", 11, 0, 60),
    SettingDescriptor::new("CooldownBlink", 12, 0, 1),
    SettingDescriptor::new("AdvancedIdle", 13, 0, 1),
    SettingDescriptor::new("AdvancedSoldering", 14, 0, 1),
    SettingDescriptor::new("TemperatureUnit", 15, 0, 1),
    SettingDescriptor::new("ScrollingSpeed", 16, 0, 1),
    SettingDescriptor::new("LockingMode", 17, 0, 2),
    SettingDescriptor::new("PowerPulsePower", 18, 0, 99),
    SettingDescriptor::new("PowerPulseWait", 19, 1, 9),
    SettingDescriptor::new("PowerPulseDuration", 20, 1, 9),
    SettingDescriptor::new("VoltageCalibration", 21, 360, 900),
    // Celsius range, not converted for TemperatureUnit = 1
    SettingDescriptor::new("BoostTemperature", 22, 0, 450),
    SettingDescriptor::new("CalibrationOffset", 23, 100, 2500),
    SettingDescriptor::new("PowerLimit", 24, 0, 120),
    SettingDescriptor::new("ReverseButtonTempChange", 25, 0, 1),
    SettingDescriptor::new("TempChangeLongStep", 26, 5, 90),
    SettingDescriptor::new("TempChangeShortStep", 27, 1, 50),
    SettingDescriptor::new("HallEffectSensitivity", 28, 0, 9),
    SettingDescriptor::new("AccelMissingWarningCounter", 29, 0, 9),
    SettingDescriptor::new("PDMissingWarningCounter", 30, 0, 9),
    SettingDescriptor::new("UILanguage", 31, 0, 0xFFFF),
    SettingDescriptor::new("PDNegTimeout", 32, 0, 50),
    SettingDescriptor::new("ColourInversion", 33, 0, 1),
    SettingDescriptor::new("Brightness", 34, 0, 101),
];
