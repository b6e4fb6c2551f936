//! Build command - render and copy everything Packer needs for one OS.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::info;

use inductor_config::InductorConfig;
use inductor_templates::{RenderOptions, Renderer, StaticCopier, TemplateDiscovery};

use super::Cli;

/// No operating system was given on the command line.
#[derive(Debug, Error)]
#[error("You must specify an operating system argument")]
pub struct MissingOsName;

pub fn execute(cli: Cli) -> Result<PathBuf> {
    let config = InductorConfig::from_file(&cli.config)
        .with_context(|| format!("Couldn't load the configuration file {:?}", cli.config))?;

    let Some(os_name) = cli.os_name.as_deref() else {
        print_available(&config, &mut std::io::stdout())?;
        return Err(MissingOsName.into());
    };

    let mut options = RenderOptions::from_config(&config, os_name, cli.edition.as_deref())?;
    options.apply(&cli.overrides());

    let current_dir = std::env::current_dir()?;
    let templates_dir = match &cli.templates_dir {
        Some(dir) => current_dir.join(dir),
        None => current_dir.clone(),
    };
    let out_dir = current_dir.join(
        cli.out_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.settings.out_dir)),
    );

    info!(
        "Building {} ({}) from {:?}",
        options.os_name, options.communicator, templates_dir
    );

    let templates = TemplateDiscovery::new()
        .discover(&templates_dir, &options.os_name)
        .with_context(|| format!("Failed to discover templates in {:?}", templates_dir))?
        .with_builtin_defaults();

    Renderer::new(options, &out_dir)
        .render(&templates)
        .context("Failed to render templates")?;

    StaticCopier::new()
        .copy(&templates_dir, &out_dir)
        .with_context(|| format!("Failed to copy static files to {:?}", out_dir))?;

    Ok(out_dir)
}

fn print_available(config: &InductorConfig, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "Available Operating Systems:")?;
    writeln!(out)?;
    for name in config.list() {
        writeln!(out, "  {}", name)?;
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_available() {
        let config = InductorConfig::load(
            r#"{"config": {}, "operating_systems": {"windows10": {}, "nano": {}}}"#.as_bytes(),
        )
        .unwrap();
        let mut out = Vec::new();
        print_available(&config, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Available Operating Systems:\n\n  nano\n  windows10\n\n"
        );
    }
}
