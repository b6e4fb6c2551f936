//! # inductor_templates
//!
//! Template discovery, composition and rendering for Inductor.
//!
//! A working directory holds root templates (`*.tpl`) and partial templates
//! (`*.ptpl`). Each partial is attached to the root whose name it extends
//! (`Autounattend.xml.disks.ptpl` belongs to `Autounattend.xml.tpl`) and is
//! wrapped in a `define` block named after the remaining suffix (`disks`).
//! Partials inside a directory named after the target OS replace the shared
//! partial of the same name. Rendered output is written under the root's
//! name without the `.tpl` extension.
//!
//! ## Example
//!
//! ```rust,no_run
//! use inductor_templates::{RenderOptions, Renderer, StaticCopier, TemplateDiscovery};
//! use std::path::Path;
//!
//! let options = RenderOptions::default();
//! let templates = TemplateDiscovery::new()
//!     .discover(Path::new("."), &options.os_name)
//!     .unwrap()
//!     .with_builtin_defaults();
//!
//! Renderer::new(options, "out").render(&templates).unwrap();
//! StaticCopier::new().copy(Path::new("."), Path::new("out")).unwrap();
//! ```

pub mod copier;
pub mod defaults;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod funcs;
pub mod key;
pub mod lister;
pub mod options;
pub mod renderer;
pub mod template;

pub use copier::StaticCopier;
pub use discovery::{TemplateDiscovery, TemplateSet};
pub use engine::{FuncMap, Template};
pub use error::{TemplateError, TemplateResult};
pub use funcs::{safe_computer_name, template_funcs};
pub use key::{partial_template_key, template_key, PARTIAL_TEMPLATE_EXT, ROOT_TEMPLATE_EXT};
pub use lister::{DirectoryLister, FsLister};
pub use options::{RenderOptions, RenderOverrides};
pub use renderer::{render_to_string, Renderer};
pub use template::{BuiltinTemplate, PartialTemplate, RootTemplate, Templater};
