// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! ABDM profile: ABHA address details, card image and QR code.

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use serde_json::{Map, Value};

use crate::client::{read_value, ApiRequest, EkaCareClient};
use crate::error::{EkaCareError, Result};

const PROFILE_PATH: &str = "/abdm/v1/profile";
const CARD_PATH: &str = "/abdm/v1/profile/asset/card";
const QR_PATH: &str = "/abdm/v1/profile/asset/qr";

pub struct AbdmProfile<'a> {
    client: &'a EkaCareClient,
}

/// QR code payload; the platform answers with JSON or an image depending on `format`
#[derive(Debug, Clone, PartialEq)]
pub enum AbhaQrCode {
    Json(Value),
    Image { content_type: String, data: Bytes },
}

impl<'a> AbdmProfile<'a> {
    pub(crate) fn new(client: &'a EkaCareClient) -> Self {
        Self { client }
    }

    pub async fn get_profile(&self) -> Result<Value> {
        self.client.send_value(&ApiRequest::get(PROFILE_PATH)).await
    }

    /// Patch profile fields (address, pincode, ...).
    pub async fn update_profile(&self, profile: &Map<String, Value>) -> Result<Value> {
        if profile.is_empty() {
            return Err(EkaCareError::InvalidInput("no profile fields to update".into()));
        }

        self.client
            .send_value(&ApiRequest::patch(PROFILE_PATH).json(Value::Object(profile.clone())))
            .await
    }

    pub async fn delete_profile(&self) -> Result<()> {
        self.client.execute(&ApiRequest::delete(PROFILE_PATH)).await?;
        Ok(())
    }

    /// ABHA card as image bytes (PNG).
    pub async fn get_abha_card(&self) -> Result<Bytes> {
        let response = self.client.execute(&ApiRequest::get(CARD_PATH)).await?;
        Ok(response.bytes().await?)
    }

    /// `format` is passed through, typically "json" or "png".
    pub async fn get_abha_qr_code(&self, format: &str) -> Result<AbhaQrCode> {
        let mut request = ApiRequest::get(QR_PATH);
        if !format.is_empty() {
            request = request.query("format", format);
        }

        let response = self.client.execute(&request).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/json")
            .to_string();

        if content_type.starts_with("image/") {
            let data = response.bytes().await?;
            Ok(AbhaQrCode::Image { content_type, data })
        } else {
            Ok(AbhaQrCode::Json(read_value(response).await?))
        }
    }
}
