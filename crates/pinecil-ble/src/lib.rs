//! Bluetooth Low Energy transport for Pinecil soldering irons
//!
//! This crate implements the `Transport` and `Scanner` traits from
//! `pinecil-core` on top of `btleplug`, so the same session API works against
//! real irons on Linux, macOS and Windows.
//!
//! ## Architecture
//!
//! - [`error`] - mapping of `btleplug` failures into `PinecilError`
//! - [`scanner`] - advertisement scanning on the first host adapter
//! - [`transport`] - GATT reads and writes on one peripheral
//!
//! ## Usage
//!
//! ```rust,no_run
//! # async fn example() -> pinecil_core::Result<()> {
//! for mut iron in pinecil_ble::find_pinecils().await? {
//!     iron.connect().await?;
//!     let info = iron.get_info().await?;
//!     println!("{} running {}", info["name"], info["build"]);
//!     println!("{:?}", iron.get_all_settings().await?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod scanner;
pub mod transport;

use pinecil_core::{DeviceAddress, DeviceSession, Discovery, PinecilConfig, Result};
use smallvec::SmallVec;

// Public API exports
pub use error::classify;
pub use scanner::BleScanner;
pub use transport::BleTransport;

// Re-export the session layer for convenience
pub use pinecil_core::{ErrorKind, PinecilError, Scanner, Transport};

/// A session with an iron over BLE
pub type Pinecil = DeviceSession<BleTransport>;

/// Scan once and return the addresses of devices whose advertised name
/// contains `name_filter`
pub async fn find_device_addresses(name_filter: &str) -> Result<SmallVec<[DeviceAddress; 8]>> {
    let config = PinecilConfig::default();
    let scanner = BleScanner::with_config(config.clone()).await?;
    Discovery::with_config(scanner, config).scan(name_filter).await
}

/// Scan once and return an unconnected session for every Pinecil in range
pub async fn find_pinecils() -> Result<Vec<Pinecil>> {
    let config = PinecilConfig::default();
    let name_filter = config.name_filter.clone();
    let scanner = BleScanner::with_config(config.clone()).await?;
    Discovery::with_config(scanner, config)
        .find_devices(&name_filter)
        .await
}
