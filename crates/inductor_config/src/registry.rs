//! Loading and querying the inductor configuration file.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::models::{GlobalSettings, OperatingSystem};

/// Top level document shape. Both sections are required.
#[derive(Deserialize)]
struct RawConfig {
    config: Option<GlobalSettings>,
    operating_systems: Option<BTreeMap<String, OperatingSystem>>,
}

/// Global defaults plus every known operating system, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct InductorConfig {
    pub settings: GlobalSettings,
    operating_systems: BTreeMap<String, OperatingSystem>,
}

impl InductorConfig {
    /// Parse a configuration document.
    pub fn load(reader: impl Read) -> ConfigResult<Self> {
        let raw: RawConfig = serde_json::from_reader(reader)?;
        let settings = raw.config.ok_or(ConfigError::MissingSection("config"))?;
        let mut operating_systems = raw
            .operating_systems
            .ok_or(ConfigError::MissingSection("operating_systems"))?;

        for (name, os) in operating_systems.iter_mut() {
            os.name = name.clone();
        }

        debug!(
            "Loaded configuration with {} operating system(s)",
            operating_systems.len()
        );

        Ok(Self {
            settings,
            operating_systems,
        })
    }

    /// Open and parse a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!("Reading configuration from {:?}", path);
        let file = File::open(path)?;
        Self::load(BufReader::new(file))
    }

    /// All known OS names, sorted.
    pub fn list(&self) -> Vec<&str> {
        self.operating_systems.keys().map(|k| k.as_str()).collect()
    }

    /// Look up an OS by its exact (case-sensitive) name.
    pub fn get(&self, name: &str) -> Option<&OperatingSystem> {
        self.operating_systems.get(name)
    }

    /// Look up an OS, failing with the list of available names when absent.
    pub fn get_required(&self, name: &str) -> ConfigResult<&OperatingSystem> {
        self.get(name)
            .ok_or_else(|| ConfigError::UnknownOperatingSystem {
                name: name.to_string(),
                available: self.list().into_iter().map(String::from).collect(),
            })
    }

    pub fn len(&self) -> usize {
        self.operating_systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operating_systems.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Communicator;

    #[test]
    fn test_missing_config_section() {
        let err = InductorConfig::load(r#"{"operating_systems": {}}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection("config")));
    }

    #[test]
    fn test_missing_operating_systems_section() {
        let err = InductorConfig::load(r#"{"config": {}}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection("operating_systems")));
    }

    #[test]
    fn test_malformed_json() {
        let err = InductorConfig::load(r#"{"config": "#.as_bytes()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_defaults_applied_to_empty_sections() {
        let config =
            InductorConfig::load(r#"{"config": {}, "operating_systems": {}}"#.as_bytes()).unwrap();
        assert_eq!(config.settings.communicator, Communicator::WinRm);
        assert!(config.settings.windows_updates);
        assert_eq!(config.settings.out_dir, "out");
        assert!(config.is_empty());
    }

    #[test]
    fn test_unknown_os_lists_available() {
        let config = InductorConfig::load(
            r#"{"config": {}, "operating_systems": {"windows10": {}}}"#.as_bytes(),
        )
        .unwrap();
        let err = config.get_required("nano").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown operating system 'nano', available: windows10"
        );
    }
}
