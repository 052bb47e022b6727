//! Process configuration.
//!
//! Configuration is read once at startup from a YAML file and never changes
//! afterwards. Every key can also be supplied through a `HUBWATCH_`-prefixed
//! environment variable, which takes precedence over the file:
//!
//! ```yaml
//! maker_api: http://192.168.1.10/apps/api/7/devices
//! access_token: 0e4a...
//! metrics:
//!   - temperature
//!   - humidity
//!   - motion
//! request_timeout: 10s
//! ```
//!
//! ```bash
//! HUBWATCH_ACCESS_TOKEN=0e4a... hubwatch --config-file hubwatch.yaml
//! HUBWATCH_METRICS=temperature,battery hubwatch --config-file hubwatch.yaml
//! ```

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat, Map};
use serde::Deserialize;

use crate::duration::parse_duration;
use crate::error::ConfigError;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "HUBWATCH";

/// Configuration for the exporter.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HubConfig {
    /// Maker API device endpoint, e.g. `http://<ip>/apps/api/<n>/devices`.
    /// Never ends in a slash once loaded.
    pub maker_api: String,
    /// Maker API access token.
    pub access_token: String,
    /// Device attribute names to export as gauges.
    pub metrics: Vec<String>,
    /// Timeout for a single hub request, e.g. "10s". Unset means no timeout.
    #[serde(default)]
    pub request_timeout: Option<String>,
}

impl HubConfig {
    /// Load configuration from a file plus environment overrides.
    ///
    /// The file is always read as YAML, whatever its extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_env(path, std::env::vars())
    }

    fn load_with_env<I>(path: &Path, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        // Only the metrics list is split and parsed; every other value is
        // taken verbatim so a digit-only token keeps its leading zeros.
        let list_key = format!("{}_METRICS", ENV_PREFIX);
        let (lists, scalars): (Map<String, String>, Map<String, String>) = vars
            .into_iter()
            .partition(|(key, _)| key.eq_ignore_ascii_case(&list_key));

        let config = Config::builder()
            .add_source(File::from(path).format(FileFormat::Yaml))
            .add_source(Environment::with_prefix(ENV_PREFIX).source(Some(scalars)))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .source(Some(lists))
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("metrics"),
            )
            .build()?;

        let hub: HubConfig = config.try_deserialize()?;
        hub.normalized()
    }

    /// Parse configuration from an in-memory YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?;

        let hub: HubConfig = config.try_deserialize()?;
        hub.normalized()
    }

    /// The parsed request timeout, if one is configured.
    pub fn timeout(&self) -> Result<Option<Duration>, ConfigError> {
        self.request_timeout
            .as_deref()
            .map(|raw| {
                parse_duration(raw).map_err(|reason| ConfigError::Invalid {
                    field: "request_timeout",
                    reason,
                })
            })
            .transpose()
    }

    fn normalized(mut self) -> Result<Self, ConfigError> {
        self.maker_api = self.maker_api.trim_end_matches('/').to_string();

        if self.maker_api.is_empty() {
            return Err(ConfigError::Invalid {
                field: "maker_api",
                reason: "must not be empty".to_string(),
            });
        }

        // Surface a bad timeout at startup rather than on the first scrape.
        self.timeout()?;

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn sample_yaml() -> &'static str {
        "maker_api: http://hub.local/apps/api/7/devices/\n\
         access_token: secret\n\
         metrics:\n  - temperature\n  - motion\n"
    }

    #[test]
    fn test_from_yaml_trims_trailing_slash() {
        let config = HubConfig::from_yaml(sample_yaml()).unwrap();
        assert_eq!(config.maker_api, "http://hub.local/apps/api/7/devices");
        assert_eq!(config.access_token, "secret");
        assert_eq!(config.metrics, vec!["temperature", "motion"]);
        assert_eq!(config.timeout().unwrap(), None);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let yaml = format!("{}colour: blue\n", sample_yaml());
        assert!(HubConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_missing_key_rejected() {
        let yaml = "maker_api: http://hub.local\nmetrics: [temperature]\n";
        assert!(HubConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_request_timeout() {
        let yaml = format!("{}request_timeout: 1500ms\n", sample_yaml());
        let config = HubConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config.timeout().unwrap(), Some(Duration::from_millis(1500)));

        let yaml = format!("{}request_timeout: whenever\n", sample_yaml());
        let err = HubConfig::from_yaml(&yaml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "request_timeout",
                ..
            }
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(sample_yaml().as_bytes()).unwrap();
        file.flush().unwrap();

        let config = HubConfig::load(file.path()).unwrap();
        assert_eq!(config.maker_api, "http://hub.local/apps/api/7/devices");
        assert_eq!(config.metrics.len(), 2);
    }

    #[test]
    fn test_load_without_extension() {
        let mut file = Builder::new().tempfile().unwrap();
        file.write_all(sample_yaml().as_bytes()).unwrap();
        file.flush().unwrap();

        let config = HubConfig::load(file.path()).unwrap();
        assert_eq!(config.access_token, "secret");
    }

    fn env(vars: &[(&str, &str)]) -> Vec<(String, String)> {
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(sample_yaml().as_bytes()).unwrap();
        file.flush().unwrap();

        let config = HubConfig::load_with_env(
            file.path(),
            env(&[
                ("HUBWATCH_ACCESS_TOKEN", "0123"),
                ("HUBWATCH_METRICS", "temperature,humidity"),
                ("HUBWATCH_REQUEST_TIMEOUT", "10s"),
                ("PATH", "/usr/bin"),
            ]),
        )
        .unwrap();

        assert_eq!(config.access_token, "0123");
        assert_eq!(config.metrics, vec!["temperature", "humidity"]);
        assert_eq!(config.maker_api, "http://hub.local/apps/api/7/devices");
        assert_eq!(config.request_timeout.as_deref(), Some("10s"));
    }

    #[test]
    fn test_env_token_kept_verbatim() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(sample_yaml().as_bytes()).unwrap();
        file.flush().unwrap();

        for token in ["007", "true", "1e3", "a,b"] {
            let config = HubConfig::load_with_env(
                file.path(),
                env(&[("HUBWATCH_ACCESS_TOKEN", token)]),
            )
            .unwrap();
            assert_eq!(config.access_token, token);
            assert_eq!(config.metrics, vec!["temperature", "motion"]);
        }
    }

    #[test]
    fn test_env_unknown_key_rejected() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(sample_yaml().as_bytes()).unwrap();
        file.flush().unwrap();

        let result = HubConfig::load_with_env(file.path(), env(&[("HUBWATCH_COLOUR", "blue")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = HubConfig::load(Path::new("/nonexistent/hubwatch.yaml"));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }
}
