//! Config file commands.

use crate::config::{self, Config};

/// Print the effective configuration as TOML
pub fn cmd_config_show(config: &Config) -> anyhow::Result<()> {
    match config::config_path() {
        Some(path) if path.exists() => println!("# {}", path.display()),
        Some(path) => println!("# {} (not created, showing defaults)", path.display()),
        None => println!("# no config directory, showing defaults"),
    }
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Write a default config file
pub fn cmd_config_init(force: bool) -> anyhow::Result<()> {
    if !force
        && let Some(path) = config::config_path()
        && path.exists()
    {
        anyhow::bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    let path = config::save(&Config::default())?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
