//! Config subcommands handler

use anyhow::{bail, Context, Result};
use std::path::Path;

use termreel::Config;

/// Show the effective configuration as TOML.
#[cfg(not(tarpaulin_include))]
pub fn handle_show(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let toml_str = toml::to_string_pretty(&config).context("Failed to serialize config")?;
    print!("{}", toml_str);
    Ok(())
}

/// Write the default configuration to the config path.
#[cfg(not(tarpaulin_include))]
pub fn handle_init(force: bool) -> Result<()> {
    let path = Config::config_path()?;
    if path.exists() && !force {
        bail!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    let path = Config::default().save()?;
    println!("Config written to {}", path.display());
    Ok(())
}
