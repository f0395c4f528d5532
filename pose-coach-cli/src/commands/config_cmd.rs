use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::config::Config;

pub fn show_config(explicit: Option<&Path>) -> Result<()> {
    let config = Config::load(explicit)?;
    let config_str = toml::to_string_pretty(&config)?;

    println!("{}", "Current Configuration".bold());
    println!("────────────────────────────────");
    println!();
    println!("{}", config_str);

    Ok(())
}

pub fn init_config(explicit: Option<&Path>, force: bool) -> Result<()> {
    let config_file = Config::config_file(explicit)?;

    if config_file.exists() && !force {
        println!(
            "Configuration file already exists at: {}",
            config_file.display()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let written = Config::default().save(explicit)?;

    println!(
        "{} Configuration initialized at: {}",
        "✓".green(),
        written.display()
    );

    Ok(())
}
