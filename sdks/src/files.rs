// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Presigned File Uploads
//!
//! Audio and document files are never sent through the API host itself. The
//! API hands out a presigned form for the transaction folder and every file is
//! POSTed straight to object storage.
//!
//! # Flow
//!
//! 1. `POST /v1/file-upload?txn_id=..&action=..` returns the presigned form
//! 2. each file is uploaded as multipart with the form fields and its key
//! 3. for EkaScribe actions the transcription transaction is initialised

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

use crate::client::{check_status, path_segment, ApiRequest, EkaCareClient};
use crate::error::{EkaCareError, Result};
use crate::types::{actions, OutputFormat, UploadedFile};

const PRESIGN_PATH: &str = "/v1/file-upload";
const TRANSACTION_INIT_PATH: &str = "/voice/api/v2/transaction/init";

pub struct Files<'a> {
    client: &'a EkaCareClient,
}

#[derive(Debug, Deserialize)]
struct PresignedUpload {
    #[serde(rename = "uploadData")]
    upload_data: PresignedForm,

    #[serde(rename = "folderPath")]
    folder_path: String,
}

/// Target URL plus the form fields object storage expects verbatim
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PresignedForm {
    pub url: String,

    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl<'a> Files<'a> {
    pub(crate) fn new(client: &'a EkaCareClient) -> Self {
        Self { client }
    }

    /// Upload files for a transaction.
    ///
    /// All files are read before any request is made, so a missing file
    /// fails the call without touching the network. For `ekascribe*`
    /// actions the transcription transaction is initialised afterwards with
    /// `extra_data` (its `mode` entry selects dictation or consultation) and
    /// the optional output format.
    pub async fn upload<P: AsRef<Path>>(
        &self,
        files: &[P],
        txn_id: &str,
        action: &str,
        extra_data: &Map<String, Value>,
        output_format: Option<&OutputFormat>,
    ) -> Result<Vec<UploadedFile>> {
        if files.is_empty() {
            return Err(EkaCareError::InvalidInput("no files to upload".into()));
        }
        let encoded_txn = path_segment("txn_id", txn_id)?;
        if action.trim().is_empty() {
            return Err(EkaCareError::InvalidInput("action cannot be empty".into()));
        }

        let mut local_files = Vec::with_capacity(files.len());
        let mut seen = HashSet::new();
        for path in files {
            let file = LocalFile::read(path.as_ref()).await?;
            if !seen.insert(file.file_name.clone()) {
                return Err(EkaCareError::InvalidInput(format!(
                    "duplicate file name in upload: {}",
                    file.file_name
                )));
            }
            local_files.push(file);
        }

        let presigned: PresignedUpload = self
            .client
            .send_json(
                &ApiRequest::post(PRESIGN_PATH)
                    .query("txn_id", txn_id)
                    .query("action", action),
            )
            .await?;

        let folder = if presigned.folder_path.ends_with('/') || presigned.folder_path.is_empty() {
            presigned.folder_path.clone()
        } else {
            format!("{}/", presigned.folder_path)
        };

        let mut uploaded = Vec::with_capacity(local_files.len());
        for file in local_files {
            let key = format!("{}{}", folder, file.file_name);
            let result = UploadedFile {
                key: key.clone(),
                content_type: file.content_type.clone(),
                size: file.size(),
            };

            info!(key = %key, size = result.size, "Uploading file");
            upload_to_presigned(self.client.http(), &presigned.upload_data, Some(&key), file)
                .await?;
            uploaded.push(result);
        }

        if action.starts_with(actions::EKASCRIBE) {
            let body = transaction_init_body(
                &presigned.upload_data.url,
                &folder,
                &uploaded,
                extra_data,
                output_format,
            );
            let response = self
                .client
                .send_value(
                    &ApiRequest::post(format!("{}/{}", TRANSACTION_INIT_PATH, encoded_txn))
                        .json(body),
                )
                .await?;
            debug!(txn_id = %txn_id, response = %response, "Transaction initialised");
        }

        Ok(uploaded)
    }
}

fn transaction_init_body(
    upload_url: &str,
    folder: &str,
    uploaded: &[UploadedFile],
    extra_data: &Map<String, Value>,
    output_format: Option<&OutputFormat>,
) -> Value {
    let mode = extra_data
        .get("mode")
        .and_then(Value::as_str)
        .unwrap_or("dictation");

    let file_names: Vec<&str> = uploaded
        .iter()
        .map(|file| file.key.rsplit('/').next().unwrap_or(&file.key))
        .collect();

    // extra_data sits at the top level; the fields below always win over it
    let mut body = extra_data.clone();
    body.insert("mode".into(), json!(mode));
    body.insert(
        "s3_url".into(),
        json!(format!(
            "{}/{}",
            upload_url.trim_end_matches('/'),
            folder.trim_end_matches('/')
        )),
    );
    body.insert("uploaded_files".into(), json!(file_names));

    if let Some(format) = output_format {
        body.insert("input_language".into(), json!(format.input_language));
        body.insert("output_format_template".into(), json!(format.output_template));
    }

    Value::Object(body)
}

/// A file read into memory ahead of upload
#[derive(Debug)]
pub(crate) struct LocalFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub(crate) async fn read(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                EkaCareError::InvalidInput(format!("not a file path: {}", path.display()))
            })?
            .to_string();

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            EkaCareError::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {}", path.display(), e),
            ))
        })?;

        let content_type = detect_content_type(path, &bytes);

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    pub(crate) fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Sniff the content type from the file bytes, falling back to the extension
pub(crate) fn detect_content_type(path: &Path, bytes: &[u8]) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("m4a") | Some("mp4") => "audio/mp4",
        Some("ogg") | Some("opus") => "audio/ogg",
        Some("webm") => "audio/webm",
        Some("pdf") => "application/pdf",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("json") => "application/json",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// POST one file to a presigned form. `key` replaces the form's own key field when given.
pub(crate) async fn upload_to_presigned(
    http: &Client,
    form: &PresignedForm,
    key: Option<&str>,
    file: LocalFile,
) -> Result<()> {
    let mut multipart = Form::new();
    for (name, value) in &form.fields {
        if key.is_some() && name == "key" {
            continue;
        }
        multipart = multipart.text(name.clone(), value.clone());
    }
    if let Some(key) = key {
        multipart = multipart.text("key", key.to_string());
    }

    // Object storage ignores every field after the file part
    let part = Part::bytes(file.bytes)
        .file_name(file.file_name)
        .mime_str(&file.content_type)
        .map_err(|e| {
            EkaCareError::InvalidInput(format!(
                "invalid content type '{}': {}",
                file.content_type, e
            ))
        })?;
    multipart = multipart.part("file", part);

    let response = http.post(&form.url).multipart(multipart).send().await?;
    check_status(response).await?;
    Ok(())
}
