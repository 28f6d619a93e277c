// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Types
//!
//! Request and response types shared across resources.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Token, upload and output-format payloads

use serde::{Deserialize, Serialize};

/// Upload action tags understood by the file upload endpoint.
pub mod actions {
    /// Dictation / conversation transcription into structured templates
    pub const EKASCRIBE: &str = "ekascribe";
    pub const EKASCRIBE_V2: &str = "ekascribe-v2";
}

/// Tokens returned by login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,

    /// Refresh responses may omit a new refresh token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Access token lifetime in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

/// One file stored through a presigned upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Object key under the transaction folder
    pub key: String,

    #[serde(rename = "contentType")]
    pub content_type: String,

    /// Size in bytes
    pub size: u64,
}

/// Output configuration for transcription actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFormat {
    /// Languages spoken in the audio (e.g. "en-IN", "hi")
    #[serde(default)]
    pub input_language: Vec<String>,

    #[serde(default)]
    pub output_template: Vec<OutputTemplate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputTemplate {
    pub template_id: String,

    /// Language the template output is rendered in
    pub language_output: String,

    /// Attach medical codes (SNOMED/ICD) to extracted entities
    #[serde(default)]
    pub codification_needed: bool,
}

impl OutputTemplate {
    pub fn new(template_id: impl Into<String>, language_output: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            language_output: language_output.into(),
            codification_needed: false,
        }
    }

    pub fn with_codification(mut self, codification_needed: bool) -> Self {
        self.codification_needed = codification_needed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uploaded_file_wire_names() {
        let file: UploadedFile = serde_json::from_str(
            r#"{"key": "txn-1/a.wav", "contentType": "audio/wav", "size": 42}"#,
        )
        .unwrap();
        assert_eq!(file.key, "txn-1/a.wav");
        assert_eq!(file.content_type, "audio/wav");
        assert_eq!(file.size, 42);
    }

    #[test]
    fn test_token_pair_without_refresh() {
        let tokens: TokenPair = serde_json::from_str(r#"{"access_token": "abc"}"#).unwrap();
        assert_eq!(tokens.access_token, "abc");
        assert!(tokens.refresh_token.is_none());
        assert!(tokens.expires_in.is_none());
    }

    #[test]
    fn test_output_format_serialization() {
        let format = OutputFormat {
            input_language: vec!["en-IN".to_string()],
            output_template: vec![OutputTemplate::new("clinical_notes_template", "en-IN")
                .with_codification(true)],
        };
        let value = serde_json::to_value(&format).unwrap();
        assert_eq!(value["input_language"][0], "en-IN");
        assert_eq!(value["output_template"][0]["template_id"], "clinical_notes_template");
        assert_eq!(value["output_template"][0]["codification_needed"], true);
    }
}
