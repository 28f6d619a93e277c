// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use ekacare_sdk::config::CONFIG_PATH_ENV;
use ekacare_sdk::SdkConfig;

use crate::output::display_token;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./ekacare-config.yaml)
        #[arg(short, long, default_value = "./ekacare-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths),
        ConfigCommand::Validate { file } => validate(file.or(config_override)),
        ConfigCommand::Generate {
            output,
            examples,
            force,
        } => generate(output, examples, force).await,
    }
}

fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = SdkConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        match &config_override {
            Some(path) => println!("  1. --config flag: {}", path.display()),
            None => println!("  1. --config flag: {}", "(not set)".dimmed()),
        }
        println!(
            "  2. {}: {}",
            CONFIG_PATH_ENV,
            std::env::var(CONFIG_PATH_ENV)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./ekacare-config.yaml");
        println!("  4. ~/.ekacare/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Credentials:".bold());
    println!("  Client ID: {}", or_unset(&config.client_id));
    println!(
        "  Client Secret: {}",
        if config.client_secret.is_empty() {
            "(not set)".dimmed().to_string()
        } else {
            display_token(&config.client_secret, false)
        }
    );
    println!(
        "  API Key: {}",
        config
            .api_key
            .as_deref()
            .map(|key| display_token(key, false))
            .unwrap_or_else(|| "(not set)".dimmed().to_string())
    );
    println!();

    println!("{}", "Endpoint:".bold());
    println!("  Base URL: {}", config.base_url);
    println!("  Request timeout: {}s", config.timeout_secs);
    println!(
        "  Session polling: every {}s, up to {}s",
        config.poll_interval_secs, config.poll_timeout_secs
    );
    println!();

    Ok(())
}

fn or_unset(value: &str) -> String {
    if value.is_empty() {
        "(not set)".dimmed().to_string()
    } else {
        value.to_string()
    }
}

fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config =
        SdkConfig::load_or_default(config_path).context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }

    tokio::fs::write(&output, sample_config(with_examples))
        .await
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

fn sample_config(with_examples: bool) -> &'static str {
    if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_configs_parse() {
        for with_examples in [false, true] {
            let config = SdkConfig::from_yaml_str(sample_config(with_examples)).unwrap();
            assert_eq!(config.base_url, "https://api.eka.care");
            assert!(!config.client_id.is_empty());
        }
    }

    #[tokio::test]
    async fn test_generate_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ekacare-config.yaml");

        generate(path.clone(), false, false).await.unwrap();
        assert!(generate(path.clone(), true, false).await.is_err());
        generate(path.clone(), true, true).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, sample_config(true));
    }
}
