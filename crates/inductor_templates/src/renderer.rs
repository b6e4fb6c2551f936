//! Rendering composed templates into output files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::discovery::TemplateSet;
use crate::engine::Template;
use crate::error::{TemplateError, TemplateResult};
use crate::funcs::template_funcs;
use crate::options::RenderOptions;
use crate::template::Templater;

/// Renders every template in a set into an output directory.
pub struct Renderer {
    options: RenderOptions,
    out_dir: PathBuf,
}

impl Renderer {
    pub fn new(options: RenderOptions, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            options,
            out_dir: out_dir.into(),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Render each template to `<out_dir>/<base filename>`, stopping at the
    /// first failure. Returns the written paths in render order.
    pub fn render(&self, templates: &TemplateSet) -> TemplateResult<Vec<PathBuf>> {
        info!(
            "Rendering {} template(s) for {} into {:?}",
            templates.len(),
            self.options.os_name,
            self.out_dir
        );

        if self.out_dir.exists() && !self.out_dir.is_dir() {
            return Err(TemplateError::NotADirectory(self.out_dir.clone()));
        }
        fs::create_dir_all(&self.out_dir)?;

        let mut written = Vec::new();
        for template in templates.list_templates() {
            written.push(self.write_template(template)?);
        }
        Ok(written)
    }

    fn write_template(&self, template: &dyn Templater) -> TemplateResult<PathBuf> {
        // render fully before touching the file so a failure leaves no partial output
        let rendered = render_to_string(template, &self.options)?;
        let target = self.out_dir.join(template.base_filename());

        fs::write(&target, rendered)?;
        debug!("Rendered {:?} to {:?}", template.full_path(), target);
        Ok(target)
    }
}

/// Compose, parse and execute a single template in memory.
pub fn render_to_string(template: &dyn Templater, options: &RenderOptions) -> TemplateResult<String> {
    let content = template.content()?;
    let name = template.full_path().display().to_string();
    let parsed = Template::parse(name, &content, template_funcs())?;
    parsed.execute(&options.to_value()?)
}
