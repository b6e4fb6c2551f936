//! Data models for the inductor configuration file.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Remote access protocol Packer uses to talk to the guest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Communicator {
    #[default]
    WinRm,
    Ssh,
}

impl Communicator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Communicator::WinRm => "winrm",
            Communicator::Ssh => "ssh",
        }
    }
}

impl fmt::Display for Communicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Communicator {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "winrm" => Ok(Communicator::WinRm),
            "ssh" => Ok(Communicator::Ssh),
            _ => Err(ConfigError::InvalidValue {
                field: "communicator".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Global defaults from the `config` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GlobalSettings {
    pub headless: Option<bool>,
    /// Older configuration files used `gui`, which is the inverse of `headless`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gui: Option<bool>,
    pub windows_updates: bool,
    pub communicator: Communicator,
    pub out_dir: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ram: Option<u32>,
    pub cpu: Option<u8>,
    pub disk_size: Option<u32>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            headless: None,
            gui: None,
            windows_updates: true,
            communicator: Communicator::WinRm,
            out_dir: "out".to_string(),
            username: None,
            password: None,
            ram: None,
            cpu: None,
            disk_size: None,
        }
    }
}

impl GlobalSettings {
    /// Effective headless setting, if the configuration states one.
    pub fn headless(&self) -> Option<bool> {
        self.headless.or(self.gui.map(|gui| !gui))
    }
}

/// A Windows edition, e.g. Enterprise or Standard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Edition {
    pub windows_image_name: String,
    pub product_key: String,
}

/// All the OS specific details required to build a Packer template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct OperatingSystem {
    /// Populated from the `operating_systems` map key.
    #[serde(skip)]
    pub name: String,
    pub iso_url: String,
    pub iso_checksum: String,
    pub iso_checksum_type: String,
    pub virtualbox_guest_os_type: String,
    pub vmware_guest_os_type: String,
    pub windows_image_name: Option<String>,
    pub product_key: Option<String>,
    pub editions: BTreeMap<String, Edition>,
}

impl OperatingSystem {
    /// Select an edition by name, or the first one (by name) when none is requested.
    pub fn edition(&self, name: Option<&str>) -> ConfigResult<Option<(&str, &Edition)>> {
        match name {
            Some(name) => self
                .editions
                .get_key_value(name)
                .map(|(k, v)| Some((k.as_str(), v)))
                .ok_or_else(|| ConfigError::UnknownEdition {
                    os: self.name.clone(),
                    edition: name.to_string(),
                }),
            None => Ok(self.editions.iter().next().map(|(k, v)| (k.as_str(), v))),
        }
    }

    /// Sorted edition names.
    pub fn edition_names(&self) -> Vec<&str> {
        self.editions.keys().map(|k| k.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_communicator_from_str() {
        assert_eq!("ssh".parse::<Communicator>().unwrap(), Communicator::Ssh);
        assert_eq!("WinRM".parse::<Communicator>().unwrap(), Communicator::WinRm);
        assert!("telnet".parse::<Communicator>().is_err());
        assert_eq!(Communicator::WinRm.to_string(), "winrm");
    }

    #[test]
    fn test_global_defaults() {
        let settings = GlobalSettings::default();
        assert!(settings.windows_updates);
        assert_eq!(settings.communicator, Communicator::WinRm);
        assert_eq!(settings.out_dir, "out");
        assert_eq!(settings.headless(), None);
    }

    #[test]
    fn test_gui_is_inverse_of_headless() {
        let settings = GlobalSettings {
            gui: Some(true),
            ..Default::default()
        };
        assert_eq!(settings.headless(), Some(false));

        let settings = GlobalSettings {
            headless: Some(true),
            gui: Some(true),
            ..Default::default()
        };
        assert_eq!(settings.headless(), Some(true));
    }

    #[test]
    fn test_edition_selection() {
        let mut os = OperatingSystem {
            name: "windows2008r2".to_string(),
            ..Default::default()
        };
        os.editions.insert(
            "standard".to_string(),
            Edition {
                windows_image_name: "Windows Server 2008 R2 SERVERSTANDARD".to_string(),
                product_key: String::new(),
            },
        );
        os.editions.insert(
            "enterprise".to_string(),
            Edition {
                windows_image_name: "Windows Server 2008 R2 SERVERENTERPRISE".to_string(),
                product_key: String::new(),
            },
        );

        let (name, _) = os.edition(None).unwrap().unwrap();
        assert_eq!(name, "enterprise");

        let (_, edition) = os.edition(Some("standard")).unwrap().unwrap();
        assert_eq!(edition.windows_image_name, "Windows Server 2008 R2 SERVERSTANDARD");

        assert!(matches!(
            os.edition(Some("datacenter")),
            Err(ConfigError::UnknownEdition { .. })
        ));
    }

    #[test]
    fn test_edition_none_when_undeclared() {
        let os = OperatingSystem::default();
        assert!(os.edition(None).unwrap().is_none());
    }
}
