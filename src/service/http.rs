//! HTTP document fetcher.
//!
//! Network and auth failures resolve here, before any parser runs: the
//! extraction engine only ever sees page text.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

use crate::error::AppError;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("galdex/", env!("CARGO_PKG_VERSION"));

/// Factory for the shared HTTP client.
pub fn create_client() -> Result<Client> {
    Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(USER_AGENT)
        .cookie_store(true)
        .build()
        .context("Failed to build HTTP client")
}

/// Fetches page text on behalf of the extraction engine.
#[derive(Debug, Clone)]
pub struct DocumentFetcher {
    client: Client,
    /// Session cookie header supplied by the host application.
    session_cookie: Option<String>,
}

impl DocumentFetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            session_cookie: None,
        }
    }

    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }

    /// Download one document as text.
    pub async fn fetch_html(&self, url: &str) -> Result<String, AppError> {
        let url: url::Url = url
            .parse()
            .map_err(|e| AppError::network(format!("invalid url {url}: {e}")))?;

        let mut request = self.client.get(url.clone());
        if let Some(cookie) = &self.session_cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::network(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::network(format!("{url} returned {status}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::network(format!("failed to read body of {url}: {e}")))?;
        tracing::debug!(%url, bytes = text.len(), "fetched document");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_factory_builds() {
        assert!(create_client().is_ok());
    }

    #[test]
    fn fetcher_keeps_the_session_cookie() {
        let fetcher = DocumentFetcher::new(create_client().unwrap())
            .with_session_cookie("ipb_member_id=1; ipb_pass_hash=x");
        assert!(fetcher.session_cookie.is_some());
    }
}
