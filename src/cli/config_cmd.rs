//! Configuration management CLI commands
//!
//! Provides commands for managing ~/.lbclone/config.toml

use anyhow::Result;
use clap::Subcommand;
use owo_colors::OwoColorize;

use super::config::CliConfig;
use super::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize configuration file with default values
    Init {
        /// Overwrite existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration
    Show {
        /// Output format (json, yaml, or table)
        #[arg(short, long, default_value = "yaml", value_parser = ["json", "yaml", "table"])]
        output: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (token, base_url, tenant, or timeout)
        key: String,

        /// Configuration value
        value: String,
    },

    /// Get configuration file path
    Path,
}

/// Handle config commands
pub async fn handle_config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Init { force } => init_config(force)?,
        ConfigCommands::Show { output } => show_config(&output)?,
        ConfigCommands::Set { key, value } => set_config(&key, &value)?,
        ConfigCommands::Path => println!("{}", CliConfig::config_path()?.display()),
    }

    Ok(())
}

fn init_config(force: bool) -> Result<()> {
    let path = CliConfig::config_path()?;

    if path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at: {}\nUse --force to overwrite",
            path.display()
        );
    }

    CliConfig::default().save_to_path(&path)?;

    println!("{} {}", "Configuration file created at:".green(), path.display());
    println!("\nYou can now set values using:");
    println!("  lbclone config set token <your-token>");
    println!("  lbclone config set base_url <api-url>");
    println!("  lbclone config set tenant <tenant-id>");
    println!("  lbclone config set timeout <seconds>");

    Ok(())
}

fn show_config(output_format: &str) -> Result<()> {
    let path = CliConfig::config_path()?;

    if !path.exists() {
        println!("No configuration file found at: {}", path.display());
        println!("\nRun 'lbclone config init' to create one");
        return Ok(());
    }

    let config = CliConfig::load_from_path(&path)?;

    if output_format == "table" {
        print_config_table(&config);
    } else {
        output::print_output(&masked(&config), output_format)?;
    }

    Ok(())
}

fn set_config(key: &str, value: &str) -> Result<()> {
    let path = CliConfig::config_path()?;
    let mut config = CliConfig::load_from_path(&path)?;
    config.set(key, value)?;
    config.save_to_path(&path)?;

    let shown = if key == "token" { mask_token(value) } else { value.to_string() };
    println!("{} {} = {}", "Set".green(), key, shown);
    println!("Configuration saved to: {}", path.display());

    Ok(())
}

/// Copy of `config` with the token masked for display
fn masked(config: &CliConfig) -> CliConfig {
    CliConfig { token: config.token.as_deref().map(mask_token), ..config.clone() }
}

fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    if token.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

fn print_config_table(config: &CliConfig) {
    let not_set = || "<not set>".to_string();

    output::print_table_header(&[("Key", 15), ("Value", 50)]);
    println!("{:<15} {}", "token", config.token.as_deref().map(mask_token).unwrap_or_else(not_set));
    println!("{:<15} {}", "base_url", config.base_url.clone().unwrap_or_else(not_set));
    println!("{:<15} {}", "tenant", config.tenant.clone().unwrap_or_else(not_set));
    println!(
        "{:<15} {}",
        "timeout",
        config.timeout.map(|t| format!("{} seconds", t)).unwrap_or_else(not_set)
    );
    println!();
}
