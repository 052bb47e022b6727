//! Conversion of raw attribute readings into gauge values.
//!
//! Most hub attributes are numbers rendered as strings. A few are enumerated
//! states that map onto 0/1.

use crate::error::CoercionError;
use crate::hub::AttributeValue;

/// How a given attribute's string value becomes a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingKind {
    /// A two-state attribute: `off` reads as 0, `on` as 1.
    Binary {
        off: &'static str,
        on: &'static str,
    },
    /// A base-10 floating point number.
    Numeric,
}

impl ReadingKind {
    /// The reading kind for an attribute name.
    pub fn for_attribute(attribute: &str) -> Self {
        match attribute {
            "motion" => ReadingKind::Binary {
                off: "inactive",
                on: "active",
            },
            "contact" => ReadingKind::Binary {
                off: "closed",
                on: "open",
            },
            _ => ReadingKind::Numeric,
        }
    }

    fn coerce(self, attribute: &str, raw: &str) -> Result<f64, CoercionError> {
        match self {
            ReadingKind::Binary { off, .. } if raw == off => Ok(0.0),
            ReadingKind::Binary { on, .. } if raw == on => Ok(1.0),
            ReadingKind::Binary { .. } => Err(CoercionError::UnknownState {
                attribute: attribute.to_string(),
                value: raw.to_string(),
            }),
            ReadingKind::Numeric => {
                raw.parse::<f64>()
                    .map_err(|source| CoercionError::InvalidNumber {
                        attribute: attribute.to_string(),
                        value: raw.to_string(),
                        source,
                    })
            }
        }
    }
}

/// Convert one raw reading into a gauge value.
///
/// Returns `Ok(None)` for values that are not strings: the hub reports unset
/// attributes as `null`, and those are skipped without complaint. Values that
/// are already JSON numbers are skipped too, since the hub does not emit them.
pub fn coerce_reading(
    attribute: &str,
    value: &AttributeValue,
) -> Result<Option<f64>, CoercionError> {
    match value {
        AttributeValue::String(raw) => ReadingKind::for_attribute(attribute)
            .coerce(attribute, raw)
            .map(Some),
        AttributeValue::Number(_) | AttributeValue::Null | AttributeValue::Other => Ok(None),
    }
}
