//! HTTP client for the AI document extraction service.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use callsheet_core::extraction::{
    DocumentExtractor, ExtractedFields, ExtractionError, ExtractionPayload, ExtractionRequest,
};
use callsheet_shared::config::ExtractionConfig;

/// Extraction collaborator reached over HTTP.
///
/// Documents go up as multipart, pre-extracted text as JSON; the
/// response is the extraction field set with nulls for unknown fields.
pub struct HttpExtractor {
    client: reqwest::Client,
    base_url: String,
}

impl HttpExtractor {
    /// Creates a client from the extraction collaborator config.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ExtractionConfig) -> Result<Self, reqwest::Error> {
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
impl DocumentExtractor for HttpExtractor {
    async fn extract(
        &self,
        request: ExtractionRequest,
    ) -> Result<ExtractedFields, ExtractionError> {
        let url = format!("{}/extract", self.base_url);

        let response = match request.payload {
            ExtractionPayload::Document { content, mime_type } => {
                let part = reqwest::multipart::Part::bytes(content)
                    .file_name(request.file_name)
                    .mime_str(&mime_type)
                    .map_err(|e| ExtractionError::Service(e.to_string()))?;
                let form = reqwest::multipart::Form::new().part("file", part);
                self.client.post(&url).multipart(form).send().await
            }
            ExtractionPayload::Text(text) => {
                let body = json!({ "file_name": request.file_name, "text": text });
                self.client.post(&url).json(&body).send().await
            }
        }
        .map_err(|e| ExtractionError::Service(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Service(format!("{status}: {message}")));
        }

        response
            .json::<ExtractedFields>()
            .await
            .map_err(|e| ExtractionError::InvalidResponse(e.to_string()))
    }
}
