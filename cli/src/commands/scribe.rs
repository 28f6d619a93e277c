// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! EkaScribe commands
//!
//! Commands: upload, status, demo

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

use ekacare_sdk::{actions, EkaCareClient, OutputFormat, OutputTemplate, UploadedFile};

use crate::commands::{auth, parse_key_value};
use crate::output::{print_session, print_uploaded, section};

const DEFAULT_LANGUAGE: &str = "en-IN";

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Audio files to upload
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Transaction ID (default: random UUID)
    #[arg(long, value_name = "TXN_ID")]
    pub txn_id: Option<String>,

    /// Upload action
    #[arg(long, default_value = actions::EKASCRIBE)]
    pub action: String,

    /// Recording mode (dictation or consultation)
    #[arg(long, default_value = "dictation")]
    pub mode: String,

    /// Spoken language, repeatable (e.g. en-IN, hi)
    #[arg(long = "input-language", value_name = "LANG")]
    pub input_language: Vec<String>,

    /// Output template, repeatable: ID[:LANG[:CODIFY]]
    #[arg(long = "template", value_name = "SPEC")]
    pub templates: Vec<String>,

    /// Extra data sent with the transaction, repeatable: KEY=VALUE
    #[arg(long = "extra", value_name = "KEY=VALUE")]
    pub extra: Vec<String>,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Transaction ID used at upload
    #[arg(value_name = "TXN_ID")]
    pub txn_id: String,

    #[arg(long, default_value = actions::EKASCRIBE)]
    pub action: String,

    /// Poll until every template has finished
    #[arg(short, long)]
    pub wait: bool,

    /// Print the raw response body
    #[arg(long)]
    pub raw: bool,
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    #[command(flatten)]
    pub upload: UploadArgs,

    /// Fetch status once instead of polling (results normally follow the webhook)
    #[arg(long)]
    pub no_wait: bool,
}

/// Parse `ID[:LANG[:CODIFY]]`
pub fn parse_template_spec(spec: &str, default_language: &str) -> Result<OutputTemplate> {
    let mut parts = spec.splitn(3, ':');

    let template_id = parts.next().unwrap_or_default().trim();
    if template_id.is_empty() {
        anyhow::bail!("Template spec '{}' has no template ID", spec);
    }

    let language = match parts.next().map(str::trim) {
        Some(lang) if !lang.is_empty() => lang,
        _ => default_language,
    };

    let codify = match parts.next().map(|s| s.trim().to_ascii_lowercase()) {
        None => false,
        Some(flag) => match flag.as_str() {
            "true" | "1" | "yes" | "codify" => true,
            "false" | "0" | "no" | "" => false,
            other => anyhow::bail!("Invalid codification flag '{}' in '{}'", other, spec),
        },
    };

    Ok(OutputTemplate::new(template_id, language).with_codification(codify))
}

pub fn build_output_format(
    input_language: &[String],
    templates: &[String],
) -> Result<Option<OutputFormat>> {
    if input_language.is_empty() && templates.is_empty() {
        return Ok(None);
    }

    let default_language = input_language
        .first()
        .map(String::as_str)
        .unwrap_or(DEFAULT_LANGUAGE);

    let output_template = templates
        .iter()
        .map(|spec| parse_template_spec(spec, default_language))
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(OutputFormat {
        input_language: if input_language.is_empty() {
            vec![DEFAULT_LANGUAGE.to_string()]
        } else {
            input_language.to_vec()
        },
        output_template,
    }))
}

pub fn build_extra_data(mode: &str, extra: &[String]) -> Result<Map<String, Value>> {
    let mut data = Map::new();
    data.insert("mode".to_string(), Value::String(mode.to_string()));
    for entry in extra {
        let (key, value) = parse_key_value(entry)?;
        data.insert(key, value);
    }
    Ok(data)
}

pub async fn upload(args: UploadArgs, client: &EkaCareClient) -> Result<(String, Vec<UploadedFile>)> {
    section("File Upload");

    let txn_id = args
        .txn_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let extra_data = build_extra_data(&args.mode, &args.extra)?;
    let output_format = build_output_format(&args.input_language, &args.templates)?;

    info!(txn_id = %txn_id, files = args.files.len(), "Uploading");
    let uploaded = client
        .files()
        .upload(
            &args.files,
            &txn_id,
            &args.action,
            &extra_data,
            output_format.as_ref(),
        )
        .await
        .with_context(|| format!("Upload failed for transaction {}", txn_id))?;

    println!("Transaction: {}", txn_id.bold());
    print_uploaded(&uploaded);

    Ok((txn_id, uploaded))
}

pub async fn status(args: StatusArgs, client: &EkaCareClient) -> Result<()> {
    section("V2RX Session Status");

    let status = if args.wait {
        client
            .v2rx()
            .wait_for_session(&args.txn_id, &args.action, client.poll_options())
            .await
    } else {
        client.v2rx().get_session_status(&args.txn_id, &args.action).await
    }
    .with_context(|| format!("Failed to fetch status for {}", args.txn_id))?;

    if !status.is_complete() {
        println!("{}", "Session still processing".yellow());
    }
    print_session(&status, args.raw);

    Ok(())
}

/// Authentication, upload and status fetch in sequence
pub async fn demo(args: DemoArgs, client: &EkaCareClient) -> Result<()> {
    auth::handle(
        auth::AuthArgs {
            show_tokens: false,
            skip_refresh: false,
        },
        client,
    )
    .await?;
    println!();

    let action = args.upload.action.clone();
    let (txn_id, _) = upload(args.upload, client).await?;
    println!();

    status(
        StatusArgs {
            txn_id,
            action,
            wait: !args.no_wait,
            raw: false,
        },
        client,
    )
    .await
}
