//! Transport abstraction for the radio link
//!
//! The session layer never talks to a radio stack directly. It drives a
//! [`Transport`], which owns exactly one physical connection, and discovery
//! drives a [`Scanner`], which also knows how to build a transport for an
//! address it reported.

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::types::{Advertisement, CharacteristicRef, DeviceAddress};

// ----------------------------------------------------------------------------
// Transport Trait
// ----------------------------------------------------------------------------

/// A single GATT connection to one peer
///
/// Implementations must not retry internally. Operations other than
/// `connect`, `disconnect` and `is_connected` fail with
/// `PinecilError::DeviceDisconnected` when no link is up or the link drops
/// mid-operation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Address of the peer this transport is bound to
    fn address(&self) -> &DeviceAddress;

    /// Establish the link; a no-op when already connected
    async fn connect(&mut self) -> Result<()>;

    /// Tear the link down; a no-op when not connected
    async fn disconnect(&mut self) -> Result<()>;

    /// Live link state
    async fn is_connected(&self) -> bool;

    /// Service UUIDs in the peer's attribute table
    async fn services(&self) -> Result<Vec<Uuid>>;

    /// Characteristics exposed by `service`
    async fn characteristics(&self, service: Uuid) -> Result<Vec<CharacteristicRef>>;

    /// Read the raw value of a characteristic
    async fn read(&self, characteristic: &CharacteristicRef) -> Result<Vec<u8>>;

    /// Write a raw value to a characteristic, waiting for the response
    async fn write(&self, characteristic: &CharacteristicRef, value: &[u8]) -> Result<()>;
}

// ----------------------------------------------------------------------------
// Scanner Trait
// ----------------------------------------------------------------------------

/// Source of advertisements and of transports for the peers it finds
#[async_trait]
pub trait Scanner: Send + Sync {
    type Transport: Transport;

    /// Listen for advertisements for at most `duration`
    ///
    /// The returned list may contain several entries per address.
    async fn scan(&self, duration: Duration) -> Result<Vec<Advertisement>>;

    /// Build an unconnected transport bound to `address`
    fn transport_for(&self, address: &DeviceAddress) -> Self::Transport;
}
