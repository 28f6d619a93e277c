// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the Eka Care CLI

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::PathBuf;

use ekacare_sdk::{EkaCareClient, SdkConfig};

pub mod auth;
pub mod config;
pub mod profile;
pub mod records;
pub mod scribe;
pub mod vitals;

pub use self::auth::AuthArgs;
pub use self::config::ConfigCommand;
pub use self::profile::ProfileCommand;
pub use self::records::RecordsCommand;
pub use self::scribe::{DemoArgs, StatusArgs, UploadArgs};
pub use self::vitals::VitalsArgs;

/// Load configuration and build a client from it
pub fn load_client(config_path: Option<PathBuf>) -> Result<EkaCareClient> {
    let config =
        SdkConfig::load_or_default(config_path).context("Failed to load configuration")?;

    config.validate().context(
        "Invalid configuration (set EKACARE_CLIENT_ID and EKACARE_CLIENT_SECRET, \
         or run `ekacare config generate`)",
    )?;

    EkaCareClient::from_config(&config).context("Failed to create Eka Care client")
}

/// Parse `KEY=VALUE`; the value is read as JSON when it parses, otherwise as a string
pub fn parse_key_value(input: &str) -> Result<(String, Value)> {
    let (key, value) = input
        .split_once('=')
        .with_context(|| format!("Expected KEY=VALUE, got '{}'", input))?;

    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Empty key in '{}'", input);
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("mode=dictation").unwrap(),
            ("mode".to_string(), json!("dictation"))
        );
        assert_eq!(parse_key_value("count=3").unwrap().1, json!(3));
        assert_eq!(parse_key_value("flag=true").unwrap().1, json!(true));
        assert_eq!(parse_key_value("note=a=b").unwrap().1, json!("a=b"));
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }
}
