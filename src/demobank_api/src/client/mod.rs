pub mod account;
pub mod auth;
pub mod error;
pub mod models;
pub mod transaction;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    Response, StatusCode,
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    constants::{AUTH_FLAG_KEY, TOKEN_KEY, USER_KEY},
    storage::{load_json, KeyValueStore},
};

use self::error::ClientError;

/// Client of the demo bank REST backend
///
/// The bearer token lives in the key-value store, next to the local ledger, and is read
/// again on every request.
pub struct DemoBankClient {
    /// The client used to make requests to the backend.
    client: reqwest::Client,
    /// Base URL of the API, without trailing slash, e.g. `http://localhost:8080/api`.
    base_url: String,
    /// Store holding the token and the current user.
    store: Arc<dyn KeyValueStore>,
}

impl DemoBankClient {
    pub fn new(base_url: &str, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build the HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Get the headers sent with every request, including the bearer token once logged in.
    fn get_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = load_json::<String>(self.store.as_ref(), TOKEN_KEY)? {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .context("Stored token is not a valid header value")?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Forget the token and the user stored by a previous login
    fn clear_session(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        self.store.remove(AUTH_FLAG_KEY)?;
        Ok(())
    }

    /// Check the status of `response` and parse its JSON body.
    ///
    /// A `401` clears the stored session before failing with [`ClientError::Unauthorized`].
    async fn parse<T: DeserializeOwned>(&self, response: Response, what: &str) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            warn!("Backend rejected the credential, clearing the session");
            self.clear_session()?;
            bail!(ClientError::Unauthorized);
        }
        if !status.is_success() {
            debug!("Response: {}", body);
            bail!(ClientError::Status(status.as_u16()));
        }

        serde_json::from_str(&body).with_context(|| {
            debug!("Response: {}", body);
            format!("Failed to parse {what} response")
        })
    }
}
