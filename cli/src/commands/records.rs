// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Health records commands
//!
//! Commands: upload, list, get, update, delete, fhir

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use serde_json::Value;
use std::path::PathBuf;

use ekacare_sdk::records::document_ids;
use ekacare_sdk::{DocumentType, DocumentUpdate, EkaCareClient};

use crate::output::{print_json, section};

#[derive(Subcommand, Debug)]
pub enum RecordsCommand {
    /// Upload a document
    Upload {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Code (lr, ps, ...) or name (lab_report, prescription, ...)
        #[arg(long = "type", default_value = "lab_report")]
        document_type: DocumentType,

        /// Document date as epoch seconds
        #[arg(long)]
        date: Option<i64>,

        /// Tag, repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,

        #[arg(long)]
        title: Option<String>,
    },

    /// List documents
    List {
        /// Only documents updated after this epoch timestamp
        #[arg(long)]
        updated_after: Option<i64>,

        /// Page token from a previous listing
        #[arg(long)]
        offset: Option<String>,

        #[arg(long)]
        raw: bool,
    },

    /// Show one document
    Get {
        #[arg(value_name = "DOCUMENT_ID")]
        id: String,
    },

    /// Update document metadata
    Update {
        #[arg(value_name = "DOCUMENT_ID")]
        id: String,

        #[arg(long = "type")]
        document_type: Option<DocumentType>,

        #[arg(long)]
        date: Option<i64>,

        /// Replaces the tag list, repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Share with the ABDM network
        #[arg(long)]
        ndhm: Option<bool>,

        #[arg(long)]
        title: Option<String>,
    },

    /// Delete a document
    Delete {
        #[arg(value_name = "DOCUMENT_ID")]
        id: String,

        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },

    /// Retrieve a FHIR bundle for a care context
    Fhir {
        #[arg(long)]
        identifier: String,

        #[arg(long)]
        hip_id: Option<String>,

        /// ABHA address
        #[arg(long)]
        health_id: Option<String>,
    },
}

/// `total` from a listing page, "N/A" when the platform omits it
pub fn document_total(page: &Value) -> String {
    match page.get("total") {
        Some(Value::Number(total)) => total.to_string(),
        Some(Value::String(total)) => total.clone(),
        _ => "N/A".to_string(),
    }
}

pub async fn handle_command(command: RecordsCommand, client: &EkaCareClient) -> Result<()> {
    let records = client.records();

    match command {
        RecordsCommand::Upload {
            file,
            document_type,
            date,
            tags,
            title,
        } => {
            section("Document Upload");
            let upload = records
                .upload_document(&file, document_type, date, &tags, title.as_deref())
                .await
                .with_context(|| format!("Failed to upload {:?}", file))?;
            println!(
                "{} {} ({})",
                "✓ Uploaded".green(),
                upload.document_id.bold(),
                document_type
            );
        }

        RecordsCommand::List {
            updated_after,
            offset,
            raw,
        } => {
            section("Documents");
            let page = records
                .list_documents(updated_after, offset.as_deref())
                .await
                .context("Failed to list documents")?;

            if raw {
                print_json(&page);
            } else {
                println!("Total Documents: {}", document_total(&page));
                let ids = document_ids(&page);
                if ids.is_empty() {
                    println!("{}", "No documents".dimmed());
                }
                for id in &ids {
                    println!("  {}", id);
                }
                if let Some(next) = page.get("next_token").and_then(|v| v.as_str()) {
                    println!("Next page: --offset {}", next);
                }
            }
        }

        RecordsCommand::Get { id } => {
            section("Document");
            let document = records
                .get_document(&id)
                .await
                .with_context(|| format!("Failed to fetch document {}", id))?;
            print_json(&document);
        }

        RecordsCommand::Update {
            id,
            document_type,
            date,
            tags,
            ndhm,
            title,
        } => {
            section("Document Update");
            let update = DocumentUpdate {
                document_type,
                document_date: date,
                tags: (!tags.is_empty()).then_some(tags),
                ndhm,
                title,
            };
            if update.is_empty() {
                anyhow::bail!("Nothing to update: pass --type, --date, --tag, --ndhm or --title");
            }
            records
                .update_document(&id, &update)
                .await
                .with_context(|| format!("Failed to update document {}", id))?;
            println!("{} {}", "✓ Updated".green(), id);
        }

        RecordsCommand::Delete { id, yes } => {
            if !yes {
                anyhow::bail!("Refusing to delete document {} without --yes", id);
            }
            records
                .delete_document(&id)
                .await
                .with_context(|| format!("Failed to delete document {}", id))?;
            println!("{} {}", "✓ Deleted".green(), id);
        }

        RecordsCommand::Fhir {
            identifier,
            hip_id,
            health_id,
        } => {
            section("FHIR Records");
            let bundle = records
                .retrieve_health_records(&identifier, hip_id.as_deref(), health_id.as_deref())
                .await
                .context("Failed to retrieve health records")?;
            print_json(&bundle);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_total() {
        assert_eq!(document_total(&json!({"total": 3, "items": []})), "3");
        assert_eq!(document_total(&json!({"total": "12"})), "12");
        assert_eq!(document_total(&json!({"items": []})), "N/A");
        assert_eq!(document_total(&Value::Null), "N/A");
    }
}
