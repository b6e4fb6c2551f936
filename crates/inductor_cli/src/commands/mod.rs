//! CLI argument definitions.

use std::path::PathBuf;

use clap::Parser;

use inductor_templates::RenderOverrides;

pub mod build;

/// Inductor - Packer template generator for Windows boxes
#[derive(Parser, Debug)]
#[command(name = "inductor")]
#[command(version, about = "Generates packer.json, Autounattend.xml and a Vagrantfile for a Windows box")]
#[command(long_about = r#"
Inductor renders the Packer template, unattended install answer file and
Vagrantfile for one operating system described in the configuration file.

Root templates (*.tpl) and partial templates (*.ptpl) in the templates
directory are rendered into the output directory; a partial inside a
directory named after the operating system replaces the shared partial of
the same name. Everything else (scripts, certificates, ...) is copied over.

Run without an operating system to list the ones the configuration knows.

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Configuration error
  4 - Template error
"#)]
pub struct Cli {
    /// Operating system to build, as named in the configuration file
    #[arg(value_name = "OS_NAME")]
    pub os_name: Option<String>,

    /// Configuration file
    #[arg(short, long, env = "INDUCTOR_CONFIG", default_value = "inductor.json")]
    pub config: PathBuf,

    /// Output directory (defaults to the configured out_dir)
    #[arg(short = 'o', long = "outdir")]
    pub out_dir: Option<PathBuf>,

    /// Windows edition, e.g. standard or datacenter
    #[arg(short, long)]
    pub edition: Option<String>,

    /// Product key to embed in Autounattend.xml
    #[arg(short = 'k', long = "productkey")]
    pub product_key: Option<String>,

    /// Do not install Windows updates during the build
    #[arg(long = "skipwindowsupdates")]
    pub skip_windows_updates: bool,

    /// Use SSH instead of WinRM
    #[arg(long)]
    pub ssh: bool,

    /// Show the hypervisor GUI during the build
    #[arg(short, long)]
    pub gui: bool,

    /// Directory holding the templates and static files (defaults to the current directory)
    #[arg(long)]
    pub templates_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn overrides(&self) -> RenderOverrides {
        RenderOverrides {
            product_key: self.product_key.clone(),
            skip_windows_updates: self.skip_windows_updates,
            ssh: self.ssh,
            gui: self.gui,
        }
    }
}
