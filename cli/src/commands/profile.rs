// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! ABDM profile commands
//!
//! Commands: show, update, card, qr, delete

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use serde_json::{Map, Value};
use std::path::PathBuf;

use ekacare_sdk::{AbhaQrCode, EkaCareClient};

use crate::commands::parse_key_value;
use crate::output::{print_json, section};

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Show the ABDM profile
    Show {
        /// Print the full profile body
        #[arg(long)]
        raw: bool,
    },

    /// Update profile fields
    Update {
        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        pincode: Option<String>,

        /// Additional field, repeatable: KEY=VALUE
        #[arg(long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },

    /// Download the ABHA card image
    Card {
        #[arg(short, long, default_value = "abha_card.png")]
        output: PathBuf,
    },

    /// Fetch the ABHA QR code
    Qr {
        /// json or png
        #[arg(long, default_value = "json")]
        format: String,

        /// Where to write image data (default: abha_qr.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete the ABDM profile
    Delete {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

pub async fn handle_command(command: ProfileCommand, client: &EkaCareClient) -> Result<()> {
    match command {
        ProfileCommand::Show { raw } => show(client, raw).await,
        ProfileCommand::Update {
            address,
            pincode,
            fields,
        } => update(client, address, pincode, fields).await,
        ProfileCommand::Card { output } => card(client, output).await,
        ProfileCommand::Qr { format, output } => qr(client, &format, output).await,
        ProfileCommand::Delete { yes } => delete(client, yes).await,
    }
}

/// ABHA address from a profile body, checking the keys the platform has used
pub fn abha_address(profile: &Value) -> Option<&str> {
    ["abha_address", "phr_address", "healthIdNumber"]
        .iter()
        .find_map(|key| profile.get(key).and_then(Value::as_str))
        .or_else(|| {
            profile
                .pointer("/profile/abha_address")
                .and_then(Value::as_str)
        })
}

async fn show(client: &EkaCareClient, raw: bool) -> Result<()> {
    section("ABDM Profile");

    let profile = client
        .abdm_profile()
        .get_profile()
        .await
        .context("Failed to fetch profile")?;

    println!(
        "ABHA Address: {}",
        abha_address(&profile).unwrap_or("Not available")
    );
    if raw {
        print_json(&profile);
    }
    Ok(())
}

pub fn build_profile_update(
    address: Option<String>,
    pincode: Option<String>,
    fields: &[String],
) -> Result<Map<String, Value>> {
    let mut update = Map::new();
    if let Some(address) = address {
        update.insert("address".into(), Value::String(address));
    }
    if let Some(pincode) = pincode {
        update.insert("pincode".into(), Value::String(pincode));
    }
    for field in fields {
        let (key, value) = parse_key_value(field)?;
        update.insert(key, value);
    }
    Ok(update)
}

async fn update(
    client: &EkaCareClient,
    address: Option<String>,
    pincode: Option<String>,
    fields: Vec<String>,
) -> Result<()> {
    section("Profile Update");

    let update = build_profile_update(address, pincode, &fields)?;
    if update.is_empty() {
        anyhow::bail!("Nothing to update: pass --address, --pincode or --field");
    }

    let response = client
        .abdm_profile()
        .update_profile(&update)
        .await
        .context("Failed to update profile")?;

    println!("{}", "✓ Profile updated".green());
    if !response.is_null() {
        print_json(&response);
    }
    Ok(())
}

async fn card(client: &EkaCareClient, output: PathBuf) -> Result<()> {
    section("ABHA Card");

    let data = client
        .abdm_profile()
        .get_abha_card()
        .await
        .context("Failed to fetch ABHA card")?;

    tokio::fs::write(&output, &data)
        .await
        .with_context(|| format!("Failed to write card to {:?}", output))?;
    println!("Saved {} bytes to {}", data.len(), output.display());
    Ok(())
}

fn image_extension(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/svg+xml" => "svg",
        "image/gif" => "gif",
        _ => "png",
    }
}

async fn qr(client: &EkaCareClient, format: &str, output: Option<PathBuf>) -> Result<()> {
    section("ABHA QR Code");

    let qr = client
        .abdm_profile()
        .get_abha_qr_code(format)
        .await
        .context("Failed to fetch QR code")?;

    match qr {
        AbhaQrCode::Json(value) => print_json(&value),
        AbhaQrCode::Image { content_type, data } => {
            let output = output.unwrap_or_else(|| {
                PathBuf::from(format!("abha_qr.{}", image_extension(&content_type)))
            });
            tokio::fs::write(&output, &data)
                .await
                .with_context(|| format!("Failed to write QR code to {:?}", output))?;
            println!(
                "Saved {} ({} bytes) to {}",
                content_type,
                data.len(),
                output.display()
            );
        }
    }
    Ok(())
}

async fn delete(client: &EkaCareClient, yes: bool) -> Result<()> {
    if !yes {
        anyhow::bail!("Refusing to delete the profile without --yes");
    }

    client
        .abdm_profile()
        .delete_profile()
        .await
        .context("Failed to delete profile")?;
    println!("{}", "✓ Profile deleted".green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_abha_address() {
        assert_eq!(
            abha_address(&json!({"abha_address": "jane@abdm"})),
            Some("jane@abdm")
        );
        assert_eq!(
            abha_address(&json!({"profile": {"abha_address": "raj@sbx"}})),
            Some("raj@sbx")
        );
        assert_eq!(abha_address(&json!({"name": "x"})), None);
    }

    #[test]
    fn test_build_profile_update() {
        let update = build_profile_update(
            Some("12 MG Road".into()),
            None,
            &["state=\"KA\"".to_string()],
        )
        .unwrap();
        assert_eq!(update["address"], json!("12 MG Road"));
        assert_eq!(update["state"], json!("KA"));
        assert!(!update.contains_key("pincode"));

        assert!(build_profile_update(None, None, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("image/png"), "png");
        assert_eq!(image_extension("image/jpeg"), "jpg");
    }
}
