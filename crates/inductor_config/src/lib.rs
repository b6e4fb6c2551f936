//! # inductor_config
//!
//! Configuration loading for Inductor.
//!
//! The configuration file is a JSON document with two required sections:
//!
//! - `config` - global defaults (headless, windows_updates, communicator, out_dir, ...)
//! - `operating_systems` - map of OS name to ISO and guest details, with optional editions
//!
//! ## Example
//!
//! ```rust,no_run
//! use inductor_config::InductorConfig;
//!
//! let config = InductorConfig::from_file("inductor.json").unwrap();
//! for name in config.list() {
//!     println!("{}", name);
//! }
//!
//! if let Some(os) = config.get("windows10") {
//!     println!("{} => {}", os.name, os.iso_url);
//! }
//! ```

pub mod error;
pub mod models;
pub mod registry;

pub use error::{ConfigError, ConfigResult};
pub use models::{Communicator, Edition, GlobalSettings, OperatingSystem};
pub use registry::InductorConfig;
