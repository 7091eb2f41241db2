//! Device session: the primary API for talking to one iron
//!
//! A session wraps one [`Transport`] and moves between two states,
//! disconnected and connected. It never reconnects on its own: once the link
//! is observed to be down every operation fails with
//! [`PinecilError::DeviceDisconnected`] until the caller calls
//! [`DeviceSession::connect`] again.
//!
//! The firmware's GATT [`Layout`] is detected from the service list on first
//! use after connecting. Characteristic references are resolved lazily, one
//! service at a time. Both are cached until the link goes down.
//!
//! Firmware older than 2.21beta2 may lack some settings and info
//! characteristics; those are left out of the results instead of failing the
//! call.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{PinecilError, Result};
use crate::schema::{
    self, Layout, SettingDescriptor, BULK_LIVE_DATA_SLOT, INFO_FIELDS, LEGACY_BUILD,
    LEGACY_SETTINGS_SERVICE_UUID, LIVE_DATA_ENCODING, LIVE_DATA_FIELDS, LIVE_DATA_SERVICE_UUID,
    SAVE_TO_FLASH, SETTINGS, SETTINGS_SERVICE_UUID,
};
use crate::transport::Transport;
use crate::types::{CharacteristicRef, DeviceAddress};

/// Setting name to value
pub type Settings = BTreeMap<&'static str, i64>;

/// Info field name to decoded string
pub type DeviceInfo = BTreeMap<&'static str, String>;

/// Live data field name to raw reading
pub type LiveData = BTreeMap<&'static str, i64>;

// ----------------------------------------------------------------------------
// Device Session
// ----------------------------------------------------------------------------

/// Session with a single device over its own transport
pub struct DeviceSession<T: Transport> {
    transport: T,
    connected: bool,
    /// Layout detected on this link
    layout: Option<Layout>,
    /// Resolved characteristics keyed by characteristic UUID
    characteristics: HashMap<Uuid, CharacteristicRef>,
    /// Services whose characteristics have been enumerated on this link
    resolved_services: HashSet<Uuid>,
}

impl<T: Transport> DeviceSession<T> {
    /// Create a disconnected session over `transport`
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            connected: false,
            layout: None,
            characteristics: HashMap::new(),
            resolved_services: HashSet::new(),
        }
    }

    pub fn address(&self) -> &DeviceAddress {
        self.transport.address()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Whether the session is connected and the link is still up
    pub async fn is_connected(&self) -> bool {
        self.connected && self.transport.is_connected().await
    }

    /// Connect to the device
    ///
    /// Nothing is resolved eagerly; the layout and characteristics are looked
    /// up on first use.
    pub async fn connect(&mut self) -> Result<()> {
        self.invalidate();
        self.transport.connect().await?;
        self.connected = true;
        info!("Connected to {}", self.transport.address());
        Ok(())
    }

    /// Disconnect from the device
    pub async fn disconnect(&mut self) -> Result<()> {
        self.mark_disconnected();
        self.transport.disconnect().await?;
        info!("Disconnected from {}", self.transport.address());
        Ok(())
    }

    /// GATT layout of the connected firmware, detecting it if needed
    pub async fn layout(&mut self) -> Result<Layout> {
        self.ensure_connected().await?;
        self.detect_layout().await
    }

    /// Read every setting
    ///
    /// Any failed read fails the whole call; no partial map is returned.
    pub async fn get_all_settings(&mut self) -> Result<Settings> {
        self.ensure_connected().await?;
        let layout = self.detect_layout().await?;
        debug!("Reading all settings from {}", self.transport.address());

        let mut settings = Settings::new();
        for setting in SETTINGS {
            let uuid = layout.setting(setting.index);
            let Some(characteristic) = self.lookup(layout.settings_service(), uuid).await? else {
                if layout.is_legacy() {
                    debug!("{} is not exposed by firmware {}", setting.name, layout.version());
                    continue;
                }
                return Err(PinecilError::CharacteristicNotFound { uuid });
            };
            let raw = self.read_characteristic(&characteristic).await?;
            settings.insert(setting.name, setting.encoding.decode(setting.name, &raw)? as i64);
        }

        debug!("Read {} settings", settings.len());
        Ok(settings)
    }

    /// Read a single setting
    pub async fn get_setting(&mut self, name: &str) -> Result<i64> {
        let setting = schema::setting(name)?;
        self.ensure_connected().await?;
        let layout = self.detect_layout().await?;

        let raw = self
            .read_raw(layout.settings_service(), layout.setting(setting.index))
            .await?;
        Ok(setting.encoding.decode(setting.name, &raw)? as i64)
    }

    /// Write a single setting to device RAM
    ///
    /// The value is lost on power cycle unless followed by
    /// [`save_to_flash`](Self::save_to_flash). Unknown names and out-of-range
    /// values are rejected before any radio I/O.
    pub async fn set_one_setting(&mut self, name: &str, value: i64) -> Result<()> {
        let setting = schema::setting(name).inspect_err(|_| {
            warn!("Setting {} does not exist", name);
        })?;
        validate(setting, value)?;
        self.ensure_connected().await?;

        info!("Setting {} to {}", setting.name, value);
        self.write_setting(setting, value).await
    }

    /// Commit the settings currently in device RAM to flash
    pub async fn save_to_flash(&mut self) -> Result<()> {
        self.ensure_connected().await?;
        info!("Saving settings to flash on {}", self.transport.address());
        self.write_setting(&SAVE_TO_FLASH, 1).await
    }

    /// Read and decode device metadata
    ///
    /// Besides every info field, the result carries `name`, the name the
    /// device advertises, derived from its ID. Firmware without a build
    /// characteristic reports build `2.20`.
    pub async fn get_info(&mut self) -> Result<DeviceInfo> {
        self.ensure_connected().await?;
        let layout = self.detect_layout().await?;

        let mut device_info = DeviceInfo::new();
        for field in INFO_FIELDS {
            let uuid = layout.bulk(field.slot);
            match self.lookup(layout.bulk_service(), uuid).await? {
                Some(characteristic) => {
                    let raw = self.read_characteristic(&characteristic).await?;
                    device_info.insert(field.name, field.decode(&raw)?);
                }
                None if layout.is_legacy() => {
                    debug!("{} is not exposed by firmware {}", field.name, layout.version());
                }
                None => return Err(PinecilError::CharacteristicNotFound { uuid }),
            }
        }
        if layout.is_legacy() {
            device_info
                .entry("build")
                .or_insert_with(|| LEGACY_BUILD.to_string());
        }
        if let Some(id) = device_info.get("id") {
            let name = schema::info::device_name(id);
            device_info.insert("name", name);
        }

        Ok(device_info)
    }

    /// Read a snapshot of all live values in one request
    ///
    /// Firmware that publishes a shorter record only yields the values it
    /// sent.
    pub async fn get_live_data(&mut self) -> Result<LiveData> {
        self.ensure_connected().await?;
        debug!("Reading live data from {}", self.transport.address());

        let values = self.read_live_record().await?;
        Ok(LIVE_DATA_FIELDS
            .iter()
            .filter_map(|field| {
                values
                    .get(field.index)
                    .map(|value| (field.name, *value as i64))
            })
            .collect())
    }

    /// Read one live value
    ///
    /// Uses the value's own characteristic where the firmware has one and
    /// falls back to the bulk record otherwise.
    pub async fn get_live_value(&mut self, name: &str) -> Result<i64> {
        let field = schema::live_field(name)?;
        self.ensure_connected().await?;
        let layout = self.detect_layout().await?;

        if layout.has_live_service() {
            let raw = self.read_raw(LIVE_DATA_SERVICE_UUID, field.uuid()).await?;
            return Ok(LIVE_DATA_ENCODING.decode(field.name, &raw)? as i64);
        }

        let values = self.read_live_record().await?;
        values
            .get(field.index)
            .map(|value| *value as i64)
            .ok_or_else(|| PinecilError::malformed(field.name, "missing from live record"))
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    async fn read_live_record(&mut self) -> Result<Vec<u64>> {
        let layout = self.detect_layout().await?;
        let raw = self
            .read_raw(layout.bulk_service(), layout.bulk(BULK_LIVE_DATA_SLOT))
            .await?;
        LIVE_DATA_ENCODING.decode_record("BulkLiveData", &raw)
    }

    async fn write_setting(&mut self, setting: &SettingDescriptor, value: i64) -> Result<()> {
        let value = u64::try_from(value)
            .map_err(|_| PinecilError::malformed(setting.name, "negative value"))?;
        let bytes = setting.encoding.encode(setting.name, value)?;
        let layout = self.detect_layout().await?;
        let characteristic = self
            .resolve(layout.settings_service(), layout.setting(setting.index))
            .await?;

        debug!("Writing characteristic {}", characteristic.uuid);
        let result = self.transport.write(&characteristic, &bytes).await;
        self.observe(result)
    }

    async fn read_raw(&mut self, service: Uuid, uuid: Uuid) -> Result<Vec<u8>> {
        let characteristic = self.resolve(service, uuid).await?;
        self.read_characteristic(&characteristic).await
    }

    async fn read_characteristic(&mut self, characteristic: &CharacteristicRef) -> Result<Vec<u8>> {
        let result = self.transport.read(characteristic).await;
        self.observe(result)
    }

    /// Detect the firmware layout once per connection
    ///
    /// Older firmware is told apart by the flash commit characteristic in the
    /// legacy settings service, which only 2.21beta1 publishes as a 16-bit
    /// UUID.
    async fn detect_layout(&mut self) -> Result<Layout> {
        if let Some(layout) = self.layout {
            return Ok(layout);
        }

        let result = self.transport.services().await;
        let services = self.observe(result)?;
        let legacy_settings: Vec<Uuid> = if services.contains(&SETTINGS_SERVICE_UUID) {
            Vec::new()
        } else {
            self.enumerate(LEGACY_SETTINGS_SERVICE_UUID).await?;
            self.characteristics
                .values()
                .filter(|c| c.service == LEGACY_SETTINGS_SERVICE_UUID)
                .map(|c| c.uuid)
                .collect()
        };

        let layout = Layout::detect(&services, &legacy_settings);
        if layout.is_legacy() {
            info!(
                "{} uses the firmware {} layout",
                self.transport.address(),
                layout.version()
            );
        }
        self.layout = Some(layout);
        Ok(layout)
    }

    /// Resolve a characteristic on the current link
    async fn resolve(&mut self, service: Uuid, uuid: Uuid) -> Result<CharacteristicRef> {
        self.lookup(service, uuid)
            .await?
            .ok_or(PinecilError::CharacteristicNotFound { uuid })
    }

    /// Look a characteristic up, enumerating its service at most once per
    /// connection
    async fn lookup(&mut self, service: Uuid, uuid: Uuid) -> Result<Option<CharacteristicRef>> {
        if !self.characteristics.contains_key(&uuid) {
            self.enumerate(service).await?;
        }
        Ok(self.characteristics.get(&uuid).copied())
    }

    async fn enumerate(&mut self, service: Uuid) -> Result<()> {
        if self.resolved_services.contains(&service) {
            return Ok(());
        }
        let result = self.transport.characteristics(service).await;
        let found = self.observe(result)?;
        debug!("Resolved {} characteristics in {}", found.len(), service);
        self.characteristics
            .extend(found.into_iter().map(|c| (c.uuid, c)));
        self.resolved_services.insert(service);
        Ok(())
    }

    async fn ensure_connected(&mut self) -> Result<()> {
        if self.connected && self.transport.is_connected().await {
            return Ok(());
        }
        if self.connected {
            warn!("Link to {} was lost", self.transport.address());
        }
        self.mark_disconnected();
        Err(PinecilError::DeviceDisconnected)
    }

    /// Drop to the disconnected state when the transport reports link loss
    fn observe<R>(&mut self, result: Result<R>) -> Result<R> {
        if let Err(e) = &result {
            if e.is_disconnected() {
                warn!("Disconnected from {}", self.transport.address());
                self.mark_disconnected();
            }
        }
        result
    }

    fn mark_disconnected(&mut self) {
        self.connected = false;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.layout = None;
        self.characteristics.clear();
        self.resolved_services.clear();
    }
}

/// Check `value` against the descriptor's declared range
pub fn validate(setting: &SettingDescriptor, value: i64) -> Result<()> {
    if setting.contains(value) {
        return Ok(());
    }
    warn!(
        "Value {} is out of range for setting {} ({}-{})",
        value, setting.name, setting.min, setting.max
    );
    Err(PinecilError::ValueOutOfRange {
        setting: setting.name.to_string(),
        value,
        min: setting.min,
        max: setting.max,
    })
}
