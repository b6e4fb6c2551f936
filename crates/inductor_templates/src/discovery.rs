//! Template discovery.
//!
//! Discovery walks a base directory for root templates (`.tpl`) and partial
//! templates (`.ptpl`), attaches every partial to the root whose key is the
//! longest match of the partial's key, and lets partials inside a directory
//! named after the target OS override shared partials with the same name.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::defaults::builtin_templates;
use crate::error::TemplateResult;
use crate::key::{partial_template_key, template_key, PARTIAL_TEMPLATE_EXT, ROOT_TEMPLATE_EXT};
use crate::lister::{DirectoryLister, FsLister};
use crate::template::{BuiltinTemplate, PartialTemplate, RootTemplate, Templater};

/// Finds and composes templates for a target operating system.
pub struct TemplateDiscovery<L = FsLister> {
    lister: L,
}

impl Default for TemplateDiscovery<FsLister> {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateDiscovery<FsLister> {
    /// Discovery backed by the real filesystem.
    pub fn new() -> Self {
        Self { lister: FsLister }
    }
}

impl<L: DirectoryLister> TemplateDiscovery<L> {
    /// Discovery backed by a custom lister.
    pub fn with_lister(lister: L) -> Self {
        Self { lister }
    }

    /// Discover every root template under `base_dir` with its partials resolved for `os_name`.
    pub fn discover(&self, base_dir: &Path, os_name: &str) -> TemplateResult<TemplateSet> {
        info!("Discovering templates in {:?} for {}", base_dir, os_name);

        let mut roots: Vec<(String, PathBuf)> = self
            .lister
            .list_files(base_dir, ROOT_TEMPLATE_EXT)?
            .into_iter()
            .filter_map(|path| template_key(&path).map(|key| (key, path)))
            .collect();
        roots.sort_by(|a, b| a.1.cmp(&b.1));

        let root_keys: BTreeSet<String> = roots.iter().map(|(key, _)| key.clone()).collect();

        // root key -> logical path (OS dir removed) -> actual path
        let mut grouped: BTreeMap<String, BTreeMap<PathBuf, PathBuf>> = BTreeMap::new();

        for path in self.lister.list_files(base_dir, PARTIAL_TEMPLATE_EXT)? {
            let logical = remove_os_dir(&path, os_name);
            let Some(key) = partial_template_key(&root_keys, &logical) else {
                debug!("Ignoring orphaned partial template {:?}", path);
                continue;
            };

            let partials = grouped.entry(key).or_default();
            match partials.get(&logical) {
                // the OS specific path is always the longer one
                Some(existing) if existing.as_os_str().len() >= path.as_os_str().len() => {
                    debug!("Keeping {:?} over {:?}", existing, path);
                }
                _ => {
                    debug!("Resolved partial template {:?}", path);
                    partials.insert(logical, path);
                }
            }
        }

        let templates: Vec<RootTemplate> = roots
            .into_iter()
            .map(|(key, path)| {
                let partials = grouped
                    .get(&key)
                    .map(|partials| partials.values().map(PartialTemplate::new).collect())
                    .unwrap_or_default();
                RootTemplate::new(key, path).with_partials(partials)
            })
            .collect();

        info!("Discovered {} root template(s)", templates.len());

        Ok(TemplateSet {
            base_dir: base_dir.to_path_buf(),
            templates,
            builtins: Vec::new(),
        })
    }
}

/// Strip the OS directory from a partial path, if the partial lives in one.
///
/// Only the immediate parent directory is considered and it is compared
/// ASCII case-insensitively, so `nano/Autounattend.xml.disks.ptpl` maps to
/// `Autounattend.xml.disks.ptpl` for both `nano` and `Nano`.
fn remove_os_dir(path: &Path, os_name: &str) -> PathBuf {
    let (Some(parent), Some(file_name)) = (path.parent(), path.file_name()) else {
        return path.to_path_buf();
    };
    let in_os_dir = parent
        .file_name()
        .is_some_and(|dir| dir.to_string_lossy().eq_ignore_ascii_case(os_name));

    match parent.parent() {
        Some(grandparent) if in_os_dir => grandparent.join(file_name),
        _ => path.to_path_buf(),
    }
}

/// All templates found for one render pass.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    base_dir: PathBuf,
    templates: Vec<RootTemplate>,
    builtins: Vec<BuiltinTemplate>,
}

impl TemplateSet {
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Root templates found on disk, sorted by path.
    pub fn root_templates(&self) -> &[RootTemplate] {
        &self.templates
    }

    /// Every template to render, on-disk roots first.
    pub fn list_templates(&self) -> Vec<&dyn Templater> {
        self.templates
            .iter()
            .map(|t| t as &dyn Templater)
            .chain(self.builtins.iter().map(|t| t as &dyn Templater))
            .collect()
    }

    /// Find a root template by its full path.
    pub fn find_template(&self, path: &Path) -> Option<&RootTemplate> {
        self.templates.iter().find(|t| t.path() == path)
    }

    pub fn len(&self) -> usize {
        self.templates.len() + self.builtins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add the built-in template for every standard artifact that has no
    /// root template on disk.
    pub fn with_builtin_defaults(mut self) -> Self {
        for builtin in builtin_templates() {
            let name = builtin.base_filename();
            let provided = self
                .templates
                .iter()
                .any(|t| t.base_filename().eq_ignore_ascii_case(&name));
            if !provided {
                warn!(
                    "No {}.{} found in {:?}, using the built-in template",
                    name, ROOT_TEMPLATE_EXT, self.base_dir
                );
                self.builtins.push(builtin);
            }
        }
        self
    }
}
