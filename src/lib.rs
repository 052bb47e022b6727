//! # hubwatch
//!
//! A Prometheus exporter for Hubitat hubs.
//!
//! hubwatch polls the hub's Maker API for the full device list whenever
//! Prometheus scrapes it, and republishes a configured set of device
//! attributes as gauges labelled by device `name`, `label` and `room`.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐  GET /metrics  ┌────────────┐  refresh()  ┌──────────────┐
//! │ Prometheus │───────────────▶│   server   │────────────▶│  collector   │
//! └────────────┘                └────────────┘             │ (GaugeVecs)  │
//!                                                          └──────┬───────┘
//!                                                                 │ fetch_devices()
//!                                                                 ▼
//!                                                          ┌──────────────┐
//!                                                          │ hub (Maker   │
//!                                                          │ API client)  │
//!                                                          └──────────────┘
//! ```
//!
//! - **[`hub`]**: the [`DeviceSource`] trait and [`HubClient`], which fetches
//!   `<maker_api>/all` and decodes it into [`Device`] records
//! - **[`collector`]**: [`HubCollector`], which resets and repopulates one
//!   gauge family per configured attribute on every scrape
//! - **[`server`]**: the HTTP listener serving `/metrics`
//! - **[`config`]**: the YAML configuration file
//!
//! ## Value conversion
//!
//! | Attribute   | Raw value                | Gauge |
//! |-------------|--------------------------|-------|
//! | `motion`    | `"inactive"` / `"active"` | 0 / 1 |
//! | `contact`   | `"closed"` / `"open"`     | 0 / 1 |
//! | anything else | decimal string, e.g. `"68.5"` | 68.5 |
//!
//! Unrecognised values are logged and skipped; `null` values are skipped
//! silently. Neither stops the rest of the scrape.

pub mod collector;
pub mod config;
pub mod duration;
pub mod error;
pub mod hub;
pub mod server;

pub use crate::collector::{CycleReport, HubCollector};
pub use crate::config::HubConfig;
pub use crate::error::{CoercionError, ConfigError, HubError};
pub use crate::hub::{AttributeValue, Device, DeviceSource, HubClient};
pub use crate::server::MetricsServer;
