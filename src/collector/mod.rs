//! Translation of hub device snapshots into Prometheus gauges.
//!
//! [`HubCollector`] owns one `GaugeVec` per configured attribute, labelled by
//! the device's `name`, `label` and `room`. Every scrape calls
//! [`HubCollector::refresh`], which fetches the device list, clears all
//! series and repopulates them, so devices that disappear from the hub also
//! disappear from the output.
//!
//! ## Example
//!
//! ```rust,no_run
//! use hubwatch::collector::HubCollector;
//! use hubwatch::hub::HubClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HubClient::builder()
//!         .endpoint("http://192.168.1.10/apps/api/7/devices")
//!         .access_token("0e4a...")
//!         .build()?;
//!     let metrics = vec!["temperature".to_string(), "motion".to_string()];
//!     let collector = HubCollector::new(client, &metrics)?;
//!
//!     let _ = collector.refresh().await;
//!     print!("{}", collector.render()?);
//!     Ok(())
//! }
//! ```

mod coerce;

pub use coerce::{coerce_reading, ReadingKind};

use std::collections::BTreeMap;
use std::fmt;

use parking_lot::RwLock;
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, GaugeVec, Opts, TextEncoder};
use tracing::{instrument, warn};

use crate::error::{ConfigError, HubError};
use crate::hub::{Device, DeviceSource};

/// Label names on every exported series, in label-value order.
pub const DEVICE_LABELS: [&str; 3] = ["name", "label", "room"];

/// Summary of one successful collection cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Devices returned by the hub.
    pub devices: usize,
    /// Readings written to a series.
    pub readings: usize,
    /// Readings of exported attributes that could not be coerced.
    pub rejected: usize,
}

/// Collector that republishes hub device attributes as gauges.
pub struct HubCollector<S> {
    source: S,
    gauges: BTreeMap<String, GaugeVec>,
    /// Held for writing across reset-then-repopulate, and for reading while
    /// series are collected.
    cycle: RwLock<Option<CycleReport>>,
}

impl<S: DeviceSource> HubCollector<S> {
    /// Create a collector exporting the given attribute names.
    ///
    /// Duplicate names share one gauge family.
    pub fn new(source: S, metrics: &[String]) -> Result<Self, ConfigError> {
        let mut gauges = BTreeMap::new();

        for name in metrics {
            if gauges.contains_key(name) {
                continue;
            }
            let opts = Opts::new(name.as_str(), format!("Hub device attribute {}", name));
            let gauge = GaugeVec::new(opts, &DEVICE_LABELS).map_err(|source| {
                ConfigError::Metric {
                    name: name.clone(),
                    source,
                }
            })?;
            gauges.insert(name.clone(), gauge);
        }

        Ok(Self {
            source,
            gauges,
            cycle: RwLock::new(None),
        })
    }

    /// The device source this collector scrapes.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Names of the exported metric families.
    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.gauges.keys().map(String::as_str)
    }

    /// Report from the most recent successful cycle.
    pub fn last_report(&self) -> Option<CycleReport> {
        *self.cycle.read()
    }

    /// Fetch the device list and republish every exported attribute.
    ///
    /// On a fetch failure the series keep whatever they held before.
    #[instrument(name = "hub_collect", skip_all)]
    pub async fn refresh(&self) -> Result<CycleReport, HubError> {
        let devices = match self.source.fetch_devices().await {
            Ok(devices) => devices,
            Err(e) => {
                warn!(source = self.source.description(), error = %e, "Hub scrape failed");
                return Err(e);
            }
        };

        Ok(self.apply(&devices))
    }

    /// Replace all series with the readings in `devices`.
    pub fn apply(&self, devices: &[Device]) -> CycleReport {
        let mut cycle = self.cycle.write();

        // Clear old data to permit devices to drop.
        for gauge in self.gauges.values() {
            gauge.reset();
        }

        let mut report = CycleReport {
            devices: devices.len(),
            ..CycleReport::default()
        };

        for device in devices {
            let labels = [
                device.name.as_str(),
                device.label.as_str(),
                device.room.as_str(),
            ];

            for (attribute, value) in &device.attributes {
                let Some(gauge) = self.gauges.get(attribute) else {
                    continue;
                };

                match coerce_reading(attribute, value) {
                    Ok(Some(reading)) => {
                        gauge.with_label_values(&labels).set(reading);
                        report.readings += 1;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!(device = %device.label, "{}", e);
                        report.rejected += 1;
                    }
                }
            }
        }

        *cycle = Some(report);
        report
    }

    /// Encode the current series in the Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        // The text encoder refuses families without series.
        let families: Vec<MetricFamily> = self
            .collect()
            .into_iter()
            .filter(|family| !family.get_metric().is_empty())
            .collect();

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl<S: DeviceSource> Collector for HubCollector<S> {
    fn desc(&self) -> Vec<&Desc> {
        self.gauges.values().flat_map(|gauge| gauge.desc()).collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let _cycle = self.cycle.read();
        self.gauges
            .values()
            .flat_map(|gauge| gauge.collect())
            .collect()
    }
}

impl<S: fmt::Debug> fmt::Debug for HubCollector<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubCollector")
            .field("source", &self.source)
            .field("metrics", &self.gauges.keys().collect::<Vec<_>>())
            .finish()
    }
}
