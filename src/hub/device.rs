//! Maker API device records.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

/// One device as reported by the Maker API `all` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Device {
    /// Manufacturer-assigned name, e.g. "Aeotec AerQ".
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// User-assigned label, e.g. "Living Room T&H Sensor".
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    /// User-assigned room, e.g. "Living Room". Empty when the hub has none.
    #[serde(default, deserialize_with = "null_as_default")]
    pub room: String,
    /// Raw attribute values keyed by attribute name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: BTreeMap<String, AttributeValue>,
}

/// A raw attribute value.
///
/// The hub reports nearly everything as a string, including numbers, but
/// unset attributes come through as `null`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum AttributeValue {
    String(String),
    Number(f64),
    Null,
    /// Booleans, arrays and objects.
    Other,
}

impl From<serde_json::Value> for AttributeValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::String(s) => AttributeValue::String(s),
            Value::Number(n) => n.as_f64().map_or(AttributeValue::Other, AttributeValue::Number),
            Value::Null => AttributeValue::Null,
            Value::Bool(_) | Value::Array(_) | Value::Object(_) => AttributeValue::Other,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_device() {
        let json = r#"{
            "id": "42",
            "name": "Aeotec AerQ",
            "label": "Living Room T&H Sensor",
            "type": "Aeotec Temperature Humidity Sensor",
            "room": "Living Room",
            "attributes": {
                "temperature": "68.5",
                "humidity": "40",
                "battery": null,
                "level": 12,
                "switch": true
            }
        }"#;

        let device: Device = serde_json::from_str(json).unwrap();
        assert_eq!(device.name, "Aeotec AerQ");
        assert_eq!(device.label, "Living Room T&H Sensor");
        assert_eq!(device.room, "Living Room");
        assert_eq!(device.attributes["temperature"], AttributeValue::from("68.5"));
        assert_eq!(device.attributes["humidity"], AttributeValue::from("40"));
        assert_eq!(device.attributes["battery"], AttributeValue::Null);
        assert_eq!(device.attributes["level"], AttributeValue::Number(12.0));
        assert_eq!(device.attributes["switch"], AttributeValue::Other);
    }

    #[test]
    fn test_decode_nulls_as_empty() {
        let json = r#"{"name": "Hue Bulb", "label": null, "room": null, "attributes": null}"#;

        let device: Device = serde_json::from_str(json).unwrap();
        assert_eq!(device.name, "Hue Bulb");
        assert_eq!(device.label, "");
        assert_eq!(device.room, "");
        assert!(device.attributes.is_empty());
    }

    #[test]
    fn test_decode_missing_room() {
        let json = r#"{"name": "Contact", "label": "Back Door", "attributes": {"contact": "open"}}"#;

        let device: Device = serde_json::from_str(json).unwrap();
        assert_eq!(device.room, "");
        assert_eq!(device.attributes.len(), 1);
    }

    #[test]
    fn test_decode_device_list() {
        let json = r#"[
            {"name": "a", "label": "first", "room": "x", "attributes": {}},
            {"name": "b", "label": "second", "room": "y", "attributes": {}}
        ]"#;

        let devices: Vec<Device> = serde_json::from_str(json).unwrap();
        let labels: Vec<_> = devices.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["first", "second"]);
    }
}
