//! Advertisement scanning on the host's first Bluetooth adapter

use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{Central, CentralEvent, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, PeripheralId};
use futures::stream::StreamExt;
use pinecil_core::{Advertisement, DeviceAddress, PinecilConfig, PinecilError, Result, Scanner};
use tracing::{debug, info, warn};

use crate::error::adapter_error;
use crate::transport::{peripheral_address, BleTransport};

// ----------------------------------------------------------------------------
// Scanner Implementation
// ----------------------------------------------------------------------------

/// Scans for advertising peripherals and hands out transports for them
pub struct BleScanner {
    adapter: Adapter,
    config: PinecilConfig,
}

impl BleScanner {
    /// Open the first adapter reported by the platform
    pub async fn new() -> Result<Self> {
        Self::with_config(PinecilConfig::default()).await
    }

    pub async fn with_config(config: PinecilConfig) -> Result<Self> {
        let manager = Manager::new()
            .await
            .map_err(|e| adapter_error(e, "adapter"))?;
        let adapters = manager
            .adapters()
            .await
            .map_err(|e| adapter_error(e, "adapter"))?;
        let adapter = adapters
            .into_iter()
            .next()
            .ok_or(PinecilError::AdapterNotAvailable)?;

        info!("BLE adapter initialized");
        Ok(Self { adapter, config })
    }

    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    async fn advertisement(&self, id: &PeripheralId) -> Option<Advertisement> {
        let peripheral = self.adapter.peripheral(id).await.ok()?;
        let properties = peripheral.properties().await.ok().flatten()?;
        Some(Advertisement::new(
            peripheral_address(&peripheral),
            properties.local_name,
        ))
    }
}

#[async_trait]
impl Scanner for BleScanner {
    type Transport = BleTransport;

    async fn scan(&self, duration: Duration) -> Result<Vec<Advertisement>> {
        let mut events = self
            .adapter
            .events()
            .await
            .map_err(|e| adapter_error(e, "scan"))?;
        self.adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(|e| adapter_error(e, "scan"))?;
        debug!("Scanning for {:?}", duration);

        let mut advertisements = Vec::new();
        let deadline = tokio::time::sleep(duration);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => break,
                event = events.next() => match event {
                    Some(CentralEvent::DeviceDiscovered(id))
                    | Some(CentralEvent::DeviceUpdated(id)) => {
                        if let Some(advertisement) = self.advertisement(&id).await {
                            advertisements.push(advertisement);
                        }
                    }
                    Some(_) => {}
                    None => break,
                },
            }
        }

        if let Err(e) = self.adapter.stop_scan().await {
            warn!("Failed to stop BLE scan: {}", e);
        }

        debug!("Scan collected {} advertisements", advertisements.len());
        Ok(advertisements)
    }

    fn transport_for(&self, address: &DeviceAddress) -> BleTransport {
        BleTransport::new(self.adapter.clone(), address.clone(), self.config.clone())
    }
}

