// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Records
//!
//! Health documents (lab reports, prescriptions, ...) stored against the
//! patient, and FHIR retrieval of linked ABDM care contexts.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Document CRUD over `/mr/api/v1/docs`
//! - **Integration:** batch request → presigned form → object storage

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::client::{path_segment, ApiRequest, EkaCareClient};
use crate::error::{EkaCareError, Result};
use crate::files::{upload_to_presigned, LocalFile, PresignedForm};

const DOCS_PATH: &str = "/mr/api/v1/docs";
const FHIR_RETRIEVE_PATH: &str = "/health/api/v1/fhir/retrieve";

pub struct Records<'a> {
    client: &'a EkaCareClient,
}

/// Document categories, serialized as the platform's two-letter codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "lr")]
    LabReport,
    #[serde(rename = "ps")]
    Prescription,
    #[serde(rename = "ds")]
    DischargeSummary,
    #[serde(rename = "vc")]
    VaccineCertificate,
    #[serde(rename = "in")]
    Insurance,
    #[serde(rename = "iv")]
    Invoice,
    #[serde(rename = "sc")]
    Scan,
    #[serde(rename = "ot")]
    Other,
}

impl DocumentType {
    pub const ALL: [DocumentType; 8] = [
        DocumentType::LabReport,
        DocumentType::Prescription,
        DocumentType::DischargeSummary,
        DocumentType::VaccineCertificate,
        DocumentType::Insurance,
        DocumentType::Invoice,
        DocumentType::Scan,
        DocumentType::Other,
    ];

    pub fn code(self) -> &'static str {
        match self {
            DocumentType::LabReport => "lr",
            DocumentType::Prescription => "ps",
            DocumentType::DischargeSummary => "ds",
            DocumentType::VaccineCertificate => "vc",
            DocumentType::Insurance => "in",
            DocumentType::Invoice => "iv",
            DocumentType::Scan => "sc",
            DocumentType::Other => "ot",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DocumentType::LabReport => "lab_report",
            DocumentType::Prescription => "prescription",
            DocumentType::DischargeSummary => "discharge_summary",
            DocumentType::VaccineCertificate => "vaccine_certificate",
            DocumentType::Insurance => "insurance",
            DocumentType::Invoice => "invoice",
            DocumentType::Scan => "scan",
            DocumentType::Other => "other",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Accepts either the code ("lr") or the name ("lab_report")
impl FromStr for DocumentType {
    type Err = EkaCareError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        DocumentType::ALL
            .into_iter()
            .find(|t| t.code() == needle || t.name() == needle)
            .ok_or_else(|| EkaCareError::InvalidInput(format!("unknown document type '{}'", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpload {
    pub document_id: String,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    batch_response: Vec<BatchItem>,
}

#[derive(Debug, Deserialize)]
struct BatchItem {
    document_id: String,

    #[serde(default)]
    forms: Vec<PresignedForm>,
}

/// Fields to change on a document; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentUpdate {
    #[serde(rename = "dt", skip_serializing_if = "Option::is_none")]
    pub document_type: Option<DocumentType>,

    /// Epoch seconds
    #[serde(rename = "dd_e", skip_serializing_if = "Option::is_none")]
    pub document_date: Option<i64>,

    #[serde(rename = "tg", skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Share with the ABDM network
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ndhm: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl DocumentUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Document IDs from a `list_documents` page (`items[].record.item.document_id`)
pub fn document_ids(page: &Value) -> Vec<String> {
    page.get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.pointer("/record/item/document_id"))
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl<'a> Records<'a> {
    pub(crate) fn new(client: &'a EkaCareClient) -> Self {
        Self { client }
    }

    /// Register a document and upload its file.
    pub async fn upload_document(
        &self,
        path: impl AsRef<Path>,
        document_type: DocumentType,
        document_date: Option<i64>,
        tags: &[String],
        title: Option<&str>,
    ) -> Result<DocumentUpload> {
        if let Some(date) = document_date {
            if date <= 0 {
                return Err(EkaCareError::InvalidInput(format!(
                    "document_date must be positive epoch seconds, got {}",
                    date
                )));
            }
        }

        let file = LocalFile::read(path.as_ref()).await?;

        let mut item = json!({
            "dt": document_type,
            "tg": tags,
            "files": [{
                "contentType": file.content_type,
                "file_size": file.size(),
            }],
        });
        if let Some(date) = document_date {
            item["dd_e"] = json!(date);
        }
        if let Some(title) = title {
            item["title"] = json!(title);
        }

        let batch: BatchResponse = self
            .client
            .send_json(&ApiRequest::post(DOCS_PATH).json(json!({ "batch_request": [item] })))
            .await?;

        let entry = batch
            .batch_response
            .into_iter()
            .next()
            .ok_or_else(|| EkaCareError::Decode("empty batch_response".into()))?;
        let form = entry.forms.into_iter().next().ok_or_else(|| {
            EkaCareError::Decode(format!("no upload form for document {}", entry.document_id))
        })?;

        info!(document_id = %entry.document_id, size = file.size(), "Uploading document");
        upload_to_presigned(self.client.http(), &form, None, file).await?;

        Ok(DocumentUpload {
            document_id: entry.document_id,
        })
    }

    /// One page of documents, optionally only those updated after an epoch timestamp.
    pub async fn list_documents(
        &self,
        updated_after: Option<i64>,
        offset: Option<&str>,
    ) -> Result<Value> {
        let mut request = ApiRequest::get(DOCS_PATH);
        if let Some(after) = updated_after {
            request = request.query("u_at__gt", after);
        }
        if let Some(offset) = offset {
            request = request.query("offset", offset);
        }
        self.client.send_value(&request).await
    }

    pub async fn get_document(&self, document_id: &str) -> Result<Value> {
        let encoded = path_segment("document_id", document_id)?;
        self.client
            .send_value(&ApiRequest::get(format!("{}/{}", DOCS_PATH, encoded)))
            .await
    }

    pub async fn update_document(&self, document_id: &str, update: &DocumentUpdate) -> Result<Value> {
        let encoded = path_segment("document_id", document_id)?;
        if update.is_empty() {
            return Err(EkaCareError::InvalidInput("no document fields to update".into()));
        }

        self.client
            .send_value(
                &ApiRequest::patch(format!("{}/{}", DOCS_PATH, encoded))
                    .json(serde_json::to_value(update)?),
            )
            .await
    }

    pub async fn delete_document(&self, document_id: &str) -> Result<()> {
        let encoded = path_segment("document_id", document_id)?;
        self.client
            .execute(&ApiRequest::delete(format!("{}/{}", DOCS_PATH, encoded)))
            .await?;
        Ok(())
    }

    /// FHIR bundle for a care context, optionally scoped to a HIP and ABHA address.
    pub async fn retrieve_health_records(
        &self,
        identifier: &str,
        hip_id: Option<&str>,
        health_id: Option<&str>,
    ) -> Result<Value> {
        if identifier.trim().is_empty() {
            return Err(EkaCareError::InvalidInput("identifier cannot be empty".into()));
        }

        let mut request = ApiRequest::get(FHIR_RETRIEVE_PATH).query("identifier", identifier);
        if let Some(hip_id) = hip_id {
            request = request.query("hip_id", hip_id);
        }
        if let Some(health_id) = health_id {
            request = request.query("health_id", health_id);
        }
        self.client.send_value(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_parsing() {
        assert_eq!("lr".parse::<DocumentType>().unwrap(), DocumentType::LabReport);
        assert_eq!(
            "Discharge_Summary".parse::<DocumentType>().unwrap(),
            DocumentType::DischargeSummary
        );
        assert!("xray".parse::<DocumentType>().is_err());

        for doc_type in DocumentType::ALL {
            assert_eq!(serde_json::to_value(doc_type).unwrap(), doc_type.code());
        }
    }

    #[test]
    fn test_update_sends_only_given_fields() {
        let update = DocumentUpdate {
            tags: Some(vec!["updated".into(), "tag".into()]),
            ndhm: Some(true),
            ..Default::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 2);
        assert_eq!(value["tg"][1], "tag");
        assert_eq!(value["ndhm"], true);
        assert!(!update.is_empty());
        assert!(DocumentUpdate::default().is_empty());
    }

    #[test]
    fn test_document_ids() {
        let page = json!({
            "total": 2,
            "items": [
                {"record": {"item": {"document_id": "doc-1"}}},
                {"record": {"item": {}}},
                {"record": {"item": {"document_id": "doc-3"}}}
            ]
        });
        assert_eq!(document_ids(&page), vec!["doc-1", "doc-3"]);
        assert!(document_ids(&json!({})).is_empty());
    }
}
