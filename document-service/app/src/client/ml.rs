use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::DocumentError;
use crate::port::CategoryClassifier;

/// Category recorded when the ML service answers without one.
pub const FALLBACK_CATEGORY: &str = "Uncategorized";

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClassifyReply {
    #[serde(default)]
    category: Option<String>,
}

/// HTTP client for the ML service `POST /classify` endpoint.
#[derive(Debug, Clone)]
pub struct MlServiceClient {
    client: Client,
    base_url: Url,
}

impl MlServiceClient {
    /// Builds the client once; every request shares its connection pool and `timeout`.
    ///
    /// # Errors
    /// Returns the [`reqwest::Error`] raised while building the TLS backend.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn request_category(&self, text: &str) -> Result<String, DocumentError> {
        let url = self
            .base_url
            .join("classify")
            .map_err(|e| DocumentError::Internal(format!("invalid ML service URL: {e}")))?;

        let response = self
            .client
            .post(url)
            .json(&ClassifyRequest { text })
            .send()
            .await
            .map_err(DocumentError::UpstreamUnavailable)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            warn!(status = status.as_u16(), body = %body, "ML service rejected classification");
            return Err(DocumentError::UpstreamRejected { status, body });
        }

        let reply: ClassifyReply = response.json().await.map_err(|e| {
            if e.is_timeout() {
                DocumentError::UpstreamUnavailable(e)
            } else {
                DocumentError::Internal(format!("invalid ML service response: {e}"))
            }
        })?;

        let category = reply.category.unwrap_or_else(|| {
            warn!(
                fallback = FALLBACK_CATEGORY,
                "ML service response has no category"
            );
            FALLBACK_CATEGORY.to_string()
        });
        info!(category = %category, "ML service classified document");
        Ok(category)
    }
}

impl CategoryClassifier for MlServiceClient {
    fn classify(
        &self,
        text: String,
    ) -> Pin<Box<dyn Future<Output = Result<String, DocumentError>> + Send + '_>> {
        Box::pin(async move { self.request_category(&text).await })
    }
}
