// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Terminal rendering for SDK responses

use base64::Engine;
use colored::Colorize;
use serde_json::Value;

use ekacare_sdk::{SessionStatus, TemplateOutput, TemplateStatus, UploadedFile};

pub fn section(title: &str) {
    println!("{}", format!("=== {} ===", title).bold());
}

pub fn print_json(value: &Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}

/// Tokens are masked unless explicitly revealed
pub fn display_token(token: &str, reveal: bool) -> String {
    if reveal || token.chars().count() <= 12 {
        return token.to_string();
    }
    let prefix: String = token.chars().take(8).collect();
    format!("{}… ({} chars)", prefix, token.chars().count())
}

pub fn print_uploaded(files: &[UploadedFile]) {
    for file in files {
        println!("Uploaded: {}", file.key.bold());
        println!("  Content Type: {}", file.content_type);
        println!("  File Size: {} bytes", file.size);
    }
}

/// Template values arrive base64 encoded; decode to JSON, then to text, else keep as-is
pub fn decode_template_value(output: &TemplateOutput) -> Option<Value> {
    let value = output.value.as_ref()?;
    let Some(encoded) = value.as_str() else {
        return Some(value.clone());
    };

    match base64::engine::general_purpose::STANDARD.decode(encoded) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => Some(serde_json::from_str(&text).unwrap_or(Value::String(text))),
            Err(_) => Some(value.clone()),
        },
        Err(_) => Some(value.clone()),
    }
}

fn colored_status(status: &TemplateStatus) -> String {
    let text = status.to_string();
    match status {
        TemplateStatus::Success => text.green().to_string(),
        TemplateStatus::PartialSuccess => text.yellow().to_string(),
        TemplateStatus::Failure => text.red().to_string(),
        _ => text.dimmed().to_string(),
    }
}

pub fn print_session(status: &SessionStatus, raw: bool) {
    if raw {
        print_json(&status.raw);
        return;
    }

    if status.output.is_empty() {
        println!("{}", "No template output yet".dimmed());
        return;
    }

    for output in &status.output {
        println!(
            "{} ({}) - {}",
            output.name.as_deref().unwrap_or("Template").bold(),
            output.template_id,
            colored_status(&output.status)
        );

        for error in &output.errors {
            println!("  {} {}", "error:".red(), error);
        }
        for warning in &output.warnings {
            println!("  {} {}", "warning:".yellow(), warning);
        }

        if let Some(value) = decode_template_value(output) {
            match value {
                Value::String(text) => println!("{}", text),
                other => print_json(&other),
            }
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template(value: Option<Value>) -> TemplateOutput {
        TemplateOutput {
            template_id: "t".into(),
            name: None,
            status: TemplateStatus::Success,
            errors: vec![],
            warnings: vec![],
            value,
            kind: Some("json".into()),
        }
    }

    #[test]
    fn test_display_token() {
        assert_eq!(display_token("short", false), "short");
        assert_eq!(
            display_token("eyJhbGciOiJIUzI1NiJ9.payload", false),
            "eyJhbGci… (28 chars)"
        );
        assert_eq!(
            display_token("eyJhbGciOiJIUzI1NiJ9.payload", true),
            "eyJhbGciOiJIUzI1NiJ9.payload"
        );
    }

    #[test]
    fn test_decode_template_value() {
        // {"notes": "headache"}
        let decoded = decode_template_value(&template(Some(json!("eyJub3RlcyI6ICJoZWFkYWNoZSJ9"))));
        assert_eq!(decoded, Some(json!({"notes": "headache"})));

        // "plain text"
        let decoded = decode_template_value(&template(Some(json!("cGxhaW4gdGV4dA=="))));
        assert_eq!(decoded, Some(json!("plain text")));

        let decoded = decode_template_value(&template(Some(json!("not base64!"))));
        assert_eq!(decoded, Some(json!("not base64!")));

        let decoded = decode_template_value(&template(Some(json!({"already": "json"}))));
        assert_eq!(decoded, Some(json!({"already": "json"})));

        assert_eq!(decode_template_value(&template(None)), None);
    }
}
