//! Error types for hubwatch.

use std::num::ParseFloatError;

use thiserror::Error;

/// Errors that abort a single fetch from the hub.
#[derive(Debug, Error)]
pub enum HubError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Connection to the hub failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// The hub answered with something other than 200 OK.
    #[error("Non-200 HTTP status: {0}")]
    Status(u16),

    /// Failed to read the response body.
    #[error("Reading response body: {0}")]
    Body(String),

    /// Failed to parse the response body as a device list.
    #[error("Parsing JSON of response body: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for HubError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest includes the request URL in its messages, which carries the token.
        let err = err.without_url();
        if err.is_timeout() {
            HubError::Timeout
        } else if err.is_connect() {
            HubError::Connection(err.to_string())
        } else {
            HubError::Http(err.to_string())
        }
    }
}

/// Errors that make the process configuration unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or decoded.
    #[error("Loading configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A field holds a value that cannot be used.
    #[error("Invalid configuration value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// A configured attribute is not usable as a metric name.
    #[error("Cannot export attribute `{name}` as a metric: {source}")]
    Metric {
        name: String,
        #[source]
        source: prometheus::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("Building HTTP client: {0}")]
    Client(String),
}

/// Errors converting a single raw attribute reading into a gauge value.
#[derive(Debug, Error)]
pub enum CoercionError {
    /// An enumerated attribute carried a state string we don't recognise.
    #[error("Unknown {attribute}={value:?}")]
    UnknownState { attribute: String, value: String },

    /// A numeric attribute did not parse as a float.
    #[error("Bad float attribute {attribute:?}={value:?}: {source}")]
    InvalidNumber {
        attribute: String,
        value: String,
        #[source]
        source: ParseFloatError,
    },
}
