//! Values templates are rendered against.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use inductor_config::{Communicator, InductorConfig};

use crate::error::TemplateResult;

pub const DEFAULT_ISO_URL: &str = "http://care.dlservice.microsoft.com/dl/download/C/3/9/C399EEA8-135D-4207-92C9-6AAB3259F6EF/10240.16384.150709-1700.TH1_CLIENTENTERPRISEEVAL_OEMRET_X64FRE_EN-US.ISO";

/// Substitution values for one target OS.
///
/// Serialized field names are the ones templates use, e.g. `{{ .OSName }}`
/// or `{{ .IsoURL }}`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct RenderOptions {
    #[serde(rename = "OSName")]
    pub os_name: String,
    pub product_key: String,
    pub windows_image_name: String,
    pub virtualbox_guest_os_type: String,
    pub vmware_guest_os_type: String,
    #[serde(rename = "IsoURL")]
    pub iso_url: String,
    pub iso_checksum_type: String,
    pub iso_checksum: String,
    pub communicator: Communicator,
    pub username: String,
    pub password: String,
    pub disk_size: u32,
    #[serde(rename = "RAM")]
    pub ram: u32,
    #[serde(rename = "CPU")]
    pub cpu: u8,
    pub headless: bool,
    pub windows_updates: bool,
}

/// Windows 10 Enterprise evaluation baseline.
impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            os_name: "windows10".to_string(),
            product_key: String::new(),
            windows_image_name: "Windows 10 Enterprise Evaluation".to_string(),
            virtualbox_guest_os_type: "Windows81_64".to_string(),
            vmware_guest_os_type: "windows8srv-64".to_string(),
            iso_url: DEFAULT_ISO_URL.to_string(),
            iso_checksum_type: "sha1".to_string(),
            iso_checksum: "56ab095075be28a90bc0b510835280975c6bb2ce".to_string(),
            communicator: Communicator::WinRm,
            username: "vagrant".to_string(),
            password: "vagrant".to_string(),
            disk_size: 61400,
            ram: 2048,
            cpu: 2,
            headless: true,
            windows_updates: true,
        }
    }
}

impl RenderOptions {
    /// Options for `os_name`, layered as built-in defaults, then the global
    /// `config` section, then the OS entry and finally the chosen edition.
    /// Empty strings in the configuration leave the lower layer in place.
    pub fn from_config(
        config: &InductorConfig,
        os_name: &str,
        edition: Option<&str>,
    ) -> TemplateResult<Self> {
        let os = config.get_required(os_name)?;
        let settings = &config.settings;
        let mut opts = Self {
            os_name: os.name.clone(),
            ..Self::default()
        };

        if let Some(headless) = settings.headless() {
            opts.headless = headless;
        }
        opts.windows_updates = settings.windows_updates;
        opts.communicator = settings.communicator;
        if let Some(username) = &settings.username {
            opts.username = username.clone();
        }
        if let Some(password) = &settings.password {
            opts.password = password.clone();
        }
        if let Some(ram) = settings.ram {
            opts.ram = ram;
        }
        if let Some(cpu) = settings.cpu {
            opts.cpu = cpu;
        }
        if let Some(disk_size) = settings.disk_size {
            opts.disk_size = disk_size;
        }

        set_if_present(&mut opts.iso_url, &os.iso_url);
        set_if_present(&mut opts.iso_checksum, &os.iso_checksum);
        set_if_present(&mut opts.iso_checksum_type, &os.iso_checksum_type);
        set_if_present(&mut opts.virtualbox_guest_os_type, &os.virtualbox_guest_os_type);
        set_if_present(&mut opts.vmware_guest_os_type, &os.vmware_guest_os_type);
        if let Some(image) = &os.windows_image_name {
            set_if_present(&mut opts.windows_image_name, image);
        }
        if let Some(key) = &os.product_key {
            set_if_present(&mut opts.product_key, key);
        }

        if let Some((name, edition)) = os.edition(edition)? {
            debug!("Using edition {} of {}", name, os.name);
            set_if_present(&mut opts.windows_image_name, &edition.windows_image_name);
            set_if_present(&mut opts.product_key, &edition.product_key);
        }

        Ok(opts)
    }

    /// Apply command line overrides on top of everything else.
    pub fn apply(&mut self, overrides: &RenderOverrides) {
        if let Some(key) = overrides.product_key.as_deref().filter(|k| !k.is_empty()) {
            self.product_key = key.to_string();
        }
        if overrides.skip_windows_updates {
            self.windows_updates = false;
        }
        if overrides.ssh {
            self.communicator = Communicator::Ssh;
        }
        if overrides.gui {
            self.headless = false;
        }
    }

    /// Field map handed to the template engine.
    pub fn to_value(&self) -> TemplateResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Overrides given on the command line. Unset flags leave the options alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOverrides {
    pub product_key: Option<String>,
    pub skip_windows_updates: bool,
    pub ssh: bool,
    pub gui: bool,
}

fn set_if_present(target: &mut String, value: &str) {
    if !value.is_empty() {
        *target = value.to_string();
    }
}
