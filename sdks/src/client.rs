// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use parking_lot::RwLock;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::auth::Auth;
use crate::config::{SdkConfig, DEFAULT_BASE_URL};
use crate::error::{EkaCareError, Result};
use crate::files::Files;
use crate::profile::AbdmProfile;
use crate::records::Records;
use crate::types::TokenPair;
use crate::v2rx::{PollOptions, V2Rx};
use crate::vitals::Vitals;

/// Client for the Eka Care platform.
///
/// Cloning is cheap: clones share the HTTP connection pool and token state.
#[derive(Clone)]
pub struct EkaCareClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    api_key: Option<String>,
    poll_options: PollOptions,
    tokens: RwLock<TokenState>,
}

#[derive(Debug, Default)]
struct TokenState {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl EkaCareClient {
    /// Create a client for the production API.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self::from_parts(
            Client::new(),
            EkaCareClientBuilder::new(client_id, client_secret),
        )
    }

    pub fn builder(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> EkaCareClientBuilder {
        EkaCareClientBuilder::new(client_id, client_secret)
    }

    /// Create a client from loaded configuration.
    pub fn from_config(config: &SdkConfig) -> Result<Self> {
        let mut builder = Self::builder(&config.client_id, &config.client_secret)
            .base_url(&config.base_url)
            .timeout(config.timeout())
            .poll_options(PollOptions {
                interval: config.poll_interval(),
                timeout: config.poll_timeout(),
            });
        if let Some(key) = &config.api_key {
            builder = builder.api_key(key);
        }
        builder.build()
    }

    fn from_parts(http: Client, builder: EkaCareClientBuilder) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: builder.base_url.trim_end_matches('/').to_string(),
                client_id: builder.client_id,
                client_secret: builder.client_secret,
                api_key: builder.api_key,
                poll_options: builder.poll_options,
                tokens: RwLock::new(TokenState {
                    access_token: builder.access_token,
                    refresh_token: None,
                }),
            }),
        }
    }

    pub fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    pub fn files(&self) -> Files<'_> {
        Files::new(self)
    }

    pub fn v2rx(&self) -> V2Rx<'_> {
        V2Rx::new(self)
    }

    pub fn vitals(&self) -> Vitals<'_> {
        Vitals::new(self)
    }

    pub fn abdm_profile(&self) -> AbdmProfile<'_> {
        AbdmProfile::new(self)
    }

    pub fn records(&self) -> Records<'_> {
        Records::new(self)
    }

    /// Use an access token obtained elsewhere.
    pub fn set_access_token(&self, token: impl Into<String>) {
        self.inner.tokens.write().access_token = Some(token.into());
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner.tokens.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.inner.tokens.read().refresh_token.clone()
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn client_id(&self) -> &str {
        &self.inner.client_id
    }

    pub fn poll_options(&self) -> PollOptions {
        self.inner.poll_options
    }

    pub(crate) fn client_secret(&self) -> &str {
        &self.inner.client_secret
    }

    pub(crate) fn api_key(&self) -> Option<&str> {
        self.inner.api_key.as_deref()
    }

    pub(crate) fn http(&self) -> &Client {
        &self.inner.http
    }

    pub(crate) fn has_credentials(&self) -> bool {
        !self.inner.client_id.is_empty() && !self.inner.client_secret.is_empty()
    }

    /// Store tokens from a login or refresh; a missing refresh token keeps the previous one
    pub(crate) fn store_tokens(&self, tokens: &TokenPair) {
        let mut state = self.inner.tokens.write();
        state.access_token = Some(tokens.access_token.clone());
        if let Some(refresh) = &tokens.refresh_token {
            state.refresh_token = Some(refresh.clone());
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    /// Send an authenticated request, logging in first if no token is held.
    ///
    /// A 401 response triggers one refresh (or re-login) and one replay.
    pub(crate) async fn execute(&self, request: &ApiRequest) -> Result<Response> {
        self.ensure_token().await?;

        let response = self.send_once(request, true).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check_status(response).await;
        }

        warn!(path = %request.path, "Access token rejected, re-authenticating");
        self.reauthenticate().await?;

        let response = self.send_once(request, true).await?;
        check_status(response).await
    }

    /// Send a request without bearer authentication (login, refresh)
    pub(crate) async fn execute_anonymous(&self, request: &ApiRequest) -> Result<Response> {
        let response = self.send_once(request, false).await?;
        check_status(response).await
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        let response = self.execute(request).await?;
        Ok(response.json().await?)
    }

    /// Like `send_json` but tolerates empty bodies, which decode as `Value::Null`
    pub(crate) async fn send_value(&self, request: &ApiRequest) -> Result<Value> {
        let response = self.execute(request).await?;
        read_value(response).await
    }

    async fn ensure_token(&self) -> Result<()> {
        if self.inner.tokens.read().access_token.is_some() {
            return Ok(());
        }

        if !self.has_credentials() {
            return Err(EkaCareError::Authentication(
                "no access token set and no client credentials configured".into(),
            ));
        }

        debug!("No access token held, logging in");
        self.auth().login().await?;
        Ok(())
    }

    async fn reauthenticate(&self) -> Result<()> {
        let refresh = self.refresh_token();

        match refresh {
            Some(refresh) => match self.auth().refresh_token(&refresh).await {
                Ok(_) => Ok(()),
                Err(err) if err.is_unauthorized() && self.has_credentials() => {
                    warn!("Refresh token rejected, logging in again");
                    self.auth().login().await.map(|_| ())
                }
                Err(err) => Err(err),
            },
            None if self.has_credentials() => self.auth().login().await.map(|_| ()),
            None => Err(EkaCareError::Authentication(
                "access token rejected and no refresh token or credentials available".into(),
            )),
        }
    }

    async fn send_once(&self, request: &ApiRequest, authenticated: bool) -> Result<Response> {
        debug!(method = %request.method, path = %request.path, "Sending request");

        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), self.url(&request.path));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        if !self.inner.client_id.is_empty() {
            builder = builder.header("client-id", &self.inner.client_id);
        }

        if authenticated {
            if let Some(token) = self.access_token() {
                builder = builder.bearer_auth(token);
            }
        }

        Ok(builder.send().await?)
    }
}

/// Pass through success responses, converting everything else into an error
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!(status = %status, "Request failed");
    Err(EkaCareError::from_status(status, body))
}

pub(crate) async fn read_value(response: Response) -> Result<Value> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

/// Characters left as-is in a path segment (RFC 3986 unreserved)
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a caller-supplied identifier for use as one path segment.
/// Empty identifiers are rejected.
pub(crate) fn path_segment(name: &str, value: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(EkaCareError::InvalidInput(format!("{} cannot be empty", name)));
    }
    Ok(utf8_percent_encode(value, PATH_SEGMENT).to_string())
}

/// A replayable API call relative to the client's base URL
#[derive(Debug, Clone)]
pub(crate) struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl ApiRequest {
    pub(crate) fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub(crate) fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub(crate) fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub(crate) fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub(crate) fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub(crate) fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub(crate) fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub(crate) fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Builder for clients that need non-default endpoints or timeouts.
pub struct EkaCareClientBuilder {
    client_id: String,
    client_secret: String,
    api_key: Option<String>,
    base_url: String,
    access_token: Option<String>,
    timeout: Option<Duration>,
    user_agent: String,
    poll_options: PollOptions,
}

impl EkaCareClientBuilder {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
            timeout: None,
            user_agent: format!("ekacare-rust-sdk/{}", env!("CARGO_PKG_VERSION")),
            poll_options: PollOptions::default(),
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Start with an existing access token instead of logging in
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn poll_options(mut self, options: PollOptions) -> Self {
        self.poll_options = options;
        self
    }

    pub fn build(self) -> Result<EkaCareClient> {
        let mut http = Client::builder().user_agent(self.user_agent.clone());
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let http = http
            .build()
            .map_err(|e| EkaCareError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(EkaCareClient::from_parts(http, self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_storage() {
        let client = EkaCareClient::new("id", "secret");
        assert!(client.access_token().is_none());

        client.set_access_token("manual");
        assert_eq!(client.access_token().as_deref(), Some("manual"));

        client.store_tokens(&TokenPair {
            access_token: "a1".into(),
            refresh_token: Some("r1".into()),
            expires_in: None,
        });
        client.store_tokens(&TokenPair {
            access_token: "a2".into(),
            refresh_token: None,
            expires_in: Some(1800),
        });

        assert_eq!(client.access_token().as_deref(), Some("a2"));
        assert_eq!(client.refresh_token().as_deref(), Some("r1"));
    }

    #[test]
    fn test_clones_share_tokens() {
        let client = EkaCareClient::new("id", "secret");
        let clone = client.clone();
        clone.set_access_token("shared");
        assert_eq!(client.access_token().as_deref(), Some("shared"));
    }

    #[test]
    fn test_builder_normalizes_base_url() {
        let client = EkaCareClient::builder("id", "secret")
            .base_url("http://localhost:8080/")
            .access_token("preset")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.url("/v1/x"), "http://localhost:8080/v1/x");
        assert_eq!(client.access_token().as_deref(), Some("preset"));
    }

    #[test]
    fn test_from_config() {
        let mut config = SdkConfig::new("cfg-id", "cfg-secret");
        config.poll_interval_secs = 2;
        config.poll_timeout_secs = 20;
        let client = EkaCareClient::from_config(&config).unwrap();

        assert_eq!(client.client_id(), "cfg-id");
        assert_eq!(client.poll_options().interval, Duration::from_secs(2));
        assert_eq!(client.poll_options().timeout, Duration::from_secs(20));
        assert!(client.has_credentials());
    }

    #[test]
    fn test_path_segment_encoding() {
        assert_eq!(path_segment("txn_id", "txn-1_a.b~c").unwrap(), "txn-1_a.b~c");
        assert_eq!(path_segment("txn_id", "a/b c").unwrap(), "a%2Fb%20c");
        assert!(matches!(
            path_segment("document_id", " "),
            Err(EkaCareError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_io() {
        let client = EkaCareClient::builder("", "")
            .base_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        let err = client
            .send_value(&ApiRequest::get("/abdm/v1/profile"))
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
    }
}
