//! GATT transport over a `btleplug` peripheral

use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{BDAddr, Central, Characteristic, Peripheral as _, WriteType};
use btleplug::platform::{Adapter, Peripheral};
use pinecil_core::{
    CharacteristicRef, DeviceAddress, PinecilConfig, PinecilError, Result, Transport,
};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::classify;

// ----------------------------------------------------------------------------
// Addressing
// ----------------------------------------------------------------------------

/// Address used to identify a peripheral across scans
///
/// CoreBluetooth hides MAC addresses and reports all zeros, so the platform
/// identifier stands in there.
pub(crate) fn peripheral_address(peripheral: &Peripheral) -> DeviceAddress {
    let address = peripheral.address();
    if address == BDAddr::default() {
        DeviceAddress::new(peripheral.id().to_string())
    } else {
        DeviceAddress::new(address.to_string())
    }
}

/// Live link state; a failed query counts as down
async fn link_up(peripheral: &Peripheral, address: &DeviceAddress) -> bool {
    match peripheral.is_connected().await {
        Ok(connected) => connected,
        Err(e) => {
            warn!("Failed to query link state of {}: {}", address, e);
            false
        }
    }
}

// ----------------------------------------------------------------------------
// BLE Transport
// ----------------------------------------------------------------------------

/// Transport bound to one iron, identified by address
///
/// The peripheral handle is looked up from the adapter on every connect so a
/// session can be built from an address seen in an earlier scan.
pub struct BleTransport {
    adapter: Adapter,
    address: DeviceAddress,
    config: PinecilConfig,
    peripheral: Option<Peripheral>,
}

impl BleTransport {
    pub fn new(adapter: Adapter, address: DeviceAddress, config: PinecilConfig) -> Self {
        Self {
            adapter,
            address,
            config,
            peripheral: None,
        }
    }

    async fn find_peripheral(&self) -> Result<Peripheral> {
        let peripherals = self
            .adapter
            .peripherals()
            .await
            .map_err(|e| classify(e, "connect", &self.address))?;

        peripherals
            .into_iter()
            .find(|p| peripheral_address(p) == self.address)
            .ok_or_else(|| PinecilError::DeviceNotFound {
                address: self.address.clone(),
            })
    }

    fn peripheral(&self) -> Result<&Peripheral> {
        self.peripheral
            .as_ref()
            .ok_or(PinecilError::DeviceDisconnected)
    }

    /// Find the platform characteristic behind a resolved reference
    fn characteristic(&self, reference: &CharacteristicRef) -> Result<Characteristic> {
        self.peripheral()?
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == reference.uuid && c.service_uuid == reference.service)
            .ok_or(PinecilError::CharacteristicNotFound {
                uuid: reference.uuid,
            })
    }

    fn connection_timeout(&self) -> Duration {
        self.config.connection_timeout
    }
}

#[async_trait]
impl Transport for BleTransport {
    fn address(&self) -> &DeviceAddress {
        &self.address
    }

    async fn connect(&mut self) -> Result<()> {
        if let Some(peripheral) = &self.peripheral {
            if link_up(peripheral, &self.address).await {
                return Ok(());
            }
        }

        let peripheral = self.find_peripheral().await?;
        let attempt = async {
            if !link_up(&peripheral, &self.address).await {
                debug!("Connecting to {}", self.address);
                peripheral
                    .connect()
                    .await
                    .map_err(|e| classify(e, "connect", &self.address))?;
            }
            peripheral
                .discover_services()
                .await
                .map_err(|e| classify(e, "discover_services", &self.address))
        };

        match timeout(self.connection_timeout(), attempt).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!("Failed to connect to {}: {}", self.address, e);
                return Err(e);
            }
            Err(_) => {
                error!("Connection to {} timed out", self.address);
                return Err(PinecilError::DeviceNotFound {
                    address: self.address.clone(),
                });
            }
        }
        info!(
            "Discovered {} services on {}",
            peripheral.services().len(),
            self.address
        );

        self.peripheral = Some(peripheral);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(peripheral) = self.peripheral.take() {
            if link_up(&peripheral, &self.address).await {
                peripheral
                    .disconnect()
                    .await
                    .map_err(|e| classify(e, "disconnect", &self.address))?;
            }
        }
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        match &self.peripheral {
            Some(peripheral) => link_up(peripheral, &self.address).await,
            None => false,
        }
    }

    async fn services(&self) -> Result<Vec<Uuid>> {
        Ok(self.peripheral()?.services().iter().map(|s| s.uuid).collect())
    }

    async fn characteristics(&self, service: Uuid) -> Result<Vec<CharacteristicRef>> {
        Ok(self
            .peripheral()?
            .characteristics()
            .iter()
            .filter(|c| c.service_uuid == service)
            .map(|c| CharacteristicRef::new(c.service_uuid, c.uuid))
            .collect())
    }

    async fn read(&self, characteristic: &CharacteristicRef) -> Result<Vec<u8>> {
        let target = self.characteristic(characteristic)?;
        self.peripheral()?
            .read(&target)
            .await
            .map_err(|e| classify(e, "read", &self.address))
    }

    async fn write(&self, characteristic: &CharacteristicRef, value: &[u8]) -> Result<()> {
        let target = self.characteristic(characteristic)?;
        self.peripheral()?
            .write(&target, value, WriteType::WithResponse)
            .await
            .map_err(|e| classify(e, "write", &self.address))
    }
}
