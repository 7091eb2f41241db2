//! Pinecil session and schema layer
//!
//! This crate talks to Pinecil soldering irons running IronOS over a BLE GATT
//! link without depending on any particular radio stack. A concrete stack
//! plugs in through the [`Transport`] and [`Scanner`] traits; `pinecil-ble`
//! provides one built on `btleplug`.
//!
//! ## Architecture
//!
//! - [`config`] - scan and connection settings
//! - [`error`] - error taxonomy and classification
//! - [`types`] - addresses, advertisements and characteristic references
//! - [`transport`] - the radio boundary
//! - [`schema`] - settings, info and live data descriptors with their encodings
//! - [`discovery`] - name-filtered scanning
//! - [`session`] - the per-device API
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pinecil_core::{Discovery, Result};
//!
//! async fn bump_temperature<S: pinecil_core::Scanner>(scanner: S) -> Result<()> {
//!     let discovery = Discovery::new(scanner);
//!     for mut iron in discovery.find_devices("pinecil").await? {
//!         iron.connect().await?;
//!         iron.set_one_setting("SetTemperature", 320).await?;
//!         iron.save_to_flash().await?;
//!         println!("{:?}", iron.get_live_data().await?);
//!     }
//!     Ok(())
//! }
//! ```

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod config;
pub mod discovery;
pub mod error;
pub mod schema;
pub mod session;
pub mod transport;
pub mod types;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use config::PinecilConfig;
pub use discovery::Discovery;
pub use error::{ErrorKind, PinecilError, Result};
pub use session::{DeviceInfo, DeviceSession, LiveData, Settings};
pub use transport::{Scanner, Transport};
pub use types::{Advertisement, CharacteristicRef, DeviceAddress};
