//! HTTP client for the PDF stamping service.

use std::time::Duration;

use async_trait::async_trait;

use callsheet_core::stamp::{DocumentStamper, StampError};
use callsheet_shared::config::StamperConfig;

/// Stamping collaborator reached over HTTP: PDF bytes and footer text
/// in, stamped PDF bytes out.
pub struct HttpStamper {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStamper {
    /// Creates a client from the stamping collaborator config.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &StamperConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl DocumentStamper for HttpStamper {
    async fn stamp(&self, document: &[u8], footer: &str) -> Result<Vec<u8>, StampError> {
        let url = format!("{}/stamp", self.base_url);

        let part = reqwest::multipart::Part::bytes(document.to_vec())
            .file_name("invoice.pdf")
            .mime_str("application/pdf")
            .map_err(|e| StampError::Service(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("footer", footer.to_string());

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StampError::Service(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            let message = response.text().await.unwrap_or_default();
            return Err(StampError::InvalidDocument(message));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StampError::Service(format!("{status}: {message}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StampError::Service(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
