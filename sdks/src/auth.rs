// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Authentication against the connect-auth service.
//!
//! Tokens obtained here are stored on the client and attached to every
//! subsequent request.

use serde_json::json;
use tracing::info;

use crate::client::{ApiRequest, EkaCareClient};
use crate::error::{EkaCareError, Result};
use crate::types::TokenPair;

const LOGIN_PATH: &str = "/connect-auth/v1/account/login";
const REFRESH_PATH: &str = "/connect-auth/v1/account/refresh-token";

pub struct Auth<'a> {
    client: &'a EkaCareClient,
}

impl<'a> Auth<'a> {
    pub(crate) fn new(client: &'a EkaCareClient) -> Self {
        Self { client }
    }

    /// Exchange client credentials for an access/refresh token pair.
    pub async fn login(&self) -> Result<TokenPair> {
        if !self.client.has_credentials() {
            return Err(EkaCareError::InvalidInput(
                "client_id and client_secret are required to log in".into(),
            ));
        }

        let mut body = json!({
            "client_id": self.client.client_id(),
            "client_secret": self.client.client_secret(),
        });
        if let Some(api_key) = self.client.api_key() {
            body["api_key"] = json!(api_key);
        }

        let response = self
            .client
            .execute_anonymous(&ApiRequest::post(LOGIN_PATH).json(body))
            .await?;
        let tokens: TokenPair = response.json().await?;

        self.client.store_tokens(&tokens);
        info!(client_id = %self.client.client_id(), "Logged in");

        Ok(tokens)
    }

    /// Obtain a new access token using a refresh token.
    ///
    /// When the response carries no new refresh token the one passed in is
    /// returned (and kept) instead.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair> {
        if refresh_token.is_empty() {
            return Err(EkaCareError::InvalidInput("refresh token cannot be empty".into()));
        }

        let body = json!({
            "refresh_token": refresh_token,
            "access_token": self.client.access_token(),
        });

        let response = self
            .client
            .execute_anonymous(&ApiRequest::post(REFRESH_PATH).json(body))
            .await?;
        let mut tokens: TokenPair = response.json().await?;
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = Some(refresh_token.to_string());
        }

        self.client.store_tokens(&tokens);
        info!("Access token refreshed");

        Ok(tokens)
    }
}
