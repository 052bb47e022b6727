//! Device snapshots from the hub.
//!
//! This module provides the [`DeviceSource`] abstraction for anything that can
//! produce the hub's full device list, and [`HubClient`], which fetches it from
//! the Hubitat Maker API over HTTP.

mod client;
mod device;

pub use client::{HubClient, HubClientBuilder};
pub use device::{AttributeValue, Device};

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::HubError;

/// Trait for fetching the current device list.
///
/// Each call performs one complete fetch. Implementations must not cache or
/// retry; a failure is reported as-is and the caller decides what to keep.
#[async_trait]
pub trait DeviceSource: Send + Sync + Debug {
    /// Fetch every device the hub reports, in response order.
    async fn fetch_devices(&self) -> Result<Vec<Device>, HubError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used in log output, so it must not contain credentials.
    fn description(&self) -> &str;
}
