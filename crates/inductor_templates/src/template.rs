//! Root, partial and built-in templates.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{TemplateError, TemplateResult};

/// Something that can be located, named and rendered.
pub trait Templater {
    /// Full path of the template source.
    fn full_path(&self) -> &Path;

    /// File name without the template extension, e.g. `Autounattend.xml`.
    /// Rendered output is written under this name.
    fn base_filename(&self) -> String;

    /// Text to hand to the template engine.
    fn content(&self) -> TemplateResult<String>;
}

/// A partial template fragment (`.ptpl`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialTemplate {
    path: PathBuf,
}

impl PartialTemplate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Templater for PartialTemplate {
    fn full_path(&self) -> &Path {
        &self.path
    }

    fn base_filename(&self) -> String {
        base_filename(&self.path)
    }

    fn content(&self) -> TemplateResult<String> {
        read_template(&self.path)
    }
}

/// A root template (`.tpl`) and the partial templates resolved for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootTemplate {
    key: String,
    path: PathBuf,
    partials: Vec<PartialTemplate>,
}

impl RootTemplate {
    pub fn new(key: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
            partials: Vec::new(),
        }
    }

    /// Attach partials, kept sorted by path so composed output is stable.
    pub fn with_partials(mut self, mut partials: Vec<PartialTemplate>) -> Self {
        partials.sort_by(|a, b| a.path.cmp(&b.path));
        self.partials = partials;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn partials(&self) -> &[PartialTemplate] {
        &self.partials
    }

    /// Find a resolved partial by its full path.
    pub fn find_partial(&self, path: &Path) -> Option<&PartialTemplate> {
        self.partials.iter().find(|p| p.path == path)
    }

    /// Name of the `define` block a partial is wrapped in.
    ///
    /// `Autounattend.xml.disks.ptpl` under `Autounattend.xml.tpl` becomes `disks`.
    pub fn block_name(&self, partial: &PartialTemplate) -> String {
        let root = self.base_filename();
        let name = partial.base_filename();
        let suffix = match name.get(..root.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(&root) => &name[root.len()..],
            _ => name.as_str(),
        };
        suffix.chars().filter(|c| *c != '.').collect()
    }
}

impl Templater for RootTemplate {
    fn full_path(&self) -> &Path {
        &self.path
    }

    fn base_filename(&self) -> String {
        base_filename(&self.path)
    }

    /// Root content followed by one `define` block per partial.
    fn content(&self) -> TemplateResult<String> {
        let mut buffer = read_template(&self.path)?;
        let mut names = BTreeSet::new();

        for partial in &self.partials {
            let name = self.block_name(partial);
            if name.is_empty() {
                return Err(TemplateError::EmptyBlockName {
                    template: self.path.clone(),
                    partial: partial.path.clone(),
                });
            }
            if !names.insert(name.clone()) {
                return Err(TemplateError::DuplicateBlock {
                    template: self.path.clone(),
                    name,
                });
            }

            buffer.push_str(&format!("\n{{{{define \"{}\"}}}}\n", name));
            buffer.push_str(&partial.content()?);
            buffer.push_str("\n{{end}}");
        }

        Ok(buffer)
    }
}

/// A template compiled into the binary, used when the working directory
/// does not provide one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinTemplate {
    path: PathBuf,
    content: &'static str,
}

impl BuiltinTemplate {
    pub fn new(filename: &'static str, content: &'static str) -> Self {
        Self {
            path: PathBuf::from(filename),
            content,
        }
    }
}

impl Templater for BuiltinTemplate {
    fn full_path(&self) -> &Path {
        &self.path
    }

    fn base_filename(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    fn content(&self) -> TemplateResult<String> {
        Ok(self.content.to_string())
    }
}

fn base_filename(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn read_template(path: &Path) -> TemplateResult<String> {
    fs::read_to_string(path).map_err(|source| TemplateError::Read {
        path: path.to_path_buf(),
        source,
    })
}
