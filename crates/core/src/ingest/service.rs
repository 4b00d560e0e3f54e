//! Ingestion service implementation.

use std::sync::Arc;

use uuid::Uuid;

use super::error::IngestError;
use super::types::{DraftInvoice, IngestFile, IngestItemReport, IngestOutcome};
use crate::dedup::{DuplicateProbe, InvoiceKey};
use crate::extraction::{DocumentExtractor, ExtractionPayload, ExtractionRequest};

/// Gateway trait for invoice persistence during ingestion.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait InvoiceGateway: Send + Sync {
    /// Fetch the dedup signals of existing invoices in the target scope
    /// (a project, or the global inbox for `None`).
    fn existing_keys(
        &self,
        project_id: Option<Uuid>,
    ) -> impl std::future::Future<Output = Result<Vec<InvoiceKey>, IngestError>> + Send;

    /// Persist a new draft invoice, returning its id.
    fn create_draft(
        &self,
        draft: DraftInvoice,
    ) -> impl std::future::Future<Output = Result<Uuid, IngestError>> + Send;
}

/// Ingestion service: extract, duplicate-check, persist.
pub struct IngestService<G: InvoiceGateway> {
    gateway: Arc<G>,
    extractor: Arc<dyn DocumentExtractor>,
}

impl<G: InvoiceGateway> IngestService<G> {
    /// Create a new ingestion service.
    #[must_use]
    pub fn new(gateway: Arc<G>, extractor: Arc<dyn DocumentExtractor>) -> Self {
        Self { gateway, extractor }
    }

    /// Process a batch of uploaded files, strictly one at a time.
    ///
    /// Every file gets its own report; a failure marks that file only
    /// and processing continues with the next one.
    pub async fn process_batch(
        &self,
        project_id: Option<Uuid>,
        user_id: Uuid,
        files: Vec<IngestFile>,
    ) -> Vec<IngestItemReport> {
        let mut reports = Vec::with_capacity(files.len());
        for file in files {
            let file_name = file.file_name.clone();
            let outcome = self
                .process_one(project_id, user_id, file)
                .await
                .unwrap_or_else(|err| IngestOutcome::Failed {
                    message: err.to_string(),
                });
            reports.push(IngestItemReport { file_name, outcome });
        }
        reports
    }

    /// Process a single uploaded file.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::Extraction` when the extractor fails and
    /// `IngestError::Gateway` when persistence fails. A detected
    /// duplicate is an outcome, not an error.
    pub async fn process_one(
        &self,
        project_id: Option<Uuid>,
        user_id: Uuid,
        file: IngestFile,
    ) -> Result<IngestOutcome, IngestError> {
        let payload = build_payload(&file);
        let extracted = self
            .extractor
            .extract(ExtractionRequest {
                file_name: file.file_name.clone(),
                payload,
            })
            .await?;

        let confidence = extracted.confidence;
        let raw_text = extracted.raw_text.clone();
        let fields = extracted.into_invoice_fields();

        let probe = DuplicateProbe::new(
            fields.ico.as_deref(),
            fields.variable_symbol.as_deref(),
            fields.amount_with_vat,
        );
        let existing = self.gateway.existing_keys(project_id).await?;
        if let Some(strength) = probe.find_match(&existing) {
            return Ok(IngestOutcome::Duplicate { strength });
        }

        let invoice_id = self
            .gateway
            .create_draft(DraftInvoice {
                project_id,
                user_id,
                fields,
                confidence,
                raw_text,
                file_name: file.file_name,
                mime_type: file.mime_type,
                file_content: file.content,
            })
            .await?;

        Ok(IngestOutcome::Accepted { invoice_id })
    }
}

/// Spreadsheet-ish sources arrive pre-flattened to text; everything else
/// goes to the extractor as raw bytes.
fn build_payload(file: &IngestFile) -> ExtractionPayload {
    if file.mime_type.starts_with("text/") {
        ExtractionPayload::Text(String::from_utf8_lossy(&file.content).into_owned())
    } else {
        ExtractionPayload::Document {
            content: file.content.clone(),
            mime_type: file.mime_type.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::extraction::{ExtractedFields, ExtractionError};

    /// Extractor stub that fails for file names containing "bad".
    struct StubExtractor;

    #[async_trait]
    impl DocumentExtractor for StubExtractor {
        async fn extract(
            &self,
            request: ExtractionRequest,
        ) -> Result<ExtractedFields, ExtractionError> {
            if request.file_name.contains("bad") {
                return Err(ExtractionError::Service("unreadable scan".to_string()));
            }
            Ok(ExtractedFields {
                ico: Some("123 45 678".to_string()),
                variable_symbol: Some(request.file_name.clone()),
                amount_with_vat: Some(dec!(12100)),
                amount_without_vat: Some(dec!(10000)),
                confidence: Some(0.9),
                ..Default::default()
            })
        }
    }

    /// Gateway stub that records created drafts in memory.
    #[derive(Default)]
    struct StubGateway {
        existing: Vec<InvoiceKey>,
        created: Mutex<Vec<DraftInvoice>>,
    }

    impl InvoiceGateway for StubGateway {
        async fn existing_keys(
            &self,
            _project_id: Option<Uuid>,
        ) -> Result<Vec<InvoiceKey>, IngestError> {
            Ok(self.existing.clone())
        }

        async fn create_draft(&self, draft: DraftInvoice) -> Result<Uuid, IngestError> {
            self.created.lock().unwrap().push(draft);
            Ok(Uuid::new_v4())
        }
    }

    fn file(name: &str) -> IngestFile {
        IngestFile {
            file_name: name.to_string(),
            content: b"%PDF-1.4".to_vec(),
            mime_type: "application/pdf".to_string(),
        }
    }

    #[tokio::test]
    async fn test_batch_isolates_failures() {
        let gateway = Arc::new(StubGateway::default());
        let service = IngestService::new(Arc::clone(&gateway), Arc::new(StubExtractor));

        let reports = service
            .process_batch(
                None,
                Uuid::new_v4(),
                vec![file("a.pdf"), file("bad.pdf"), file("c.pdf")],
            )
            .await;

        assert_eq!(reports.len(), 3);
        assert!(matches!(reports[0].outcome, IngestOutcome::Accepted { .. }));
        assert!(matches!(
            &reports[1].outcome,
            IngestOutcome::Failed { message } if message.contains("unreadable scan")
        ));
        assert!(matches!(reports[2].outcome, IngestOutcome::Accepted { .. }));
        assert_eq!(gateway.created.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_is_discarded_not_persisted() {
        let gateway = Arc::new(StubGateway {
            existing: vec![InvoiceKey {
                ico: Some("12345678".to_string()),
                variable_symbol: Some("dup.pdf".to_string()),
                amount_with_vat: Some(dec!(12100)),
            }],
            ..Default::default()
        });
        let service = IngestService::new(Arc::clone(&gateway), Arc::new(StubExtractor));

        let reports = service
            .process_batch(None, Uuid::new_v4(), vec![file("dup.pdf")])
            .await;

        assert!(matches!(
            reports[0].outcome,
            IngestOutcome::Duplicate {
                strength: crate::dedup::MatchStrength::Strong
            }
        ));
        assert!(gateway.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_text_sources_flow_through_as_text() {
        struct TextAssertingExtractor;

        #[async_trait]
        impl DocumentExtractor for TextAssertingExtractor {
            async fn extract(
                &self,
                request: ExtractionRequest,
            ) -> Result<ExtractedFields, ExtractionError> {
                match request.payload {
                    ExtractionPayload::Text(text) => {
                        assert!(text.contains("invoice"));
                        Ok(ExtractedFields::default())
                    }
                    ExtractionPayload::Document { .. } => {
                        panic!("expected text payload for text/csv")
                    }
                }
            }
        }

        let gateway = Arc::new(StubGateway::default());
        let service = IngestService::new(Arc::clone(&gateway), Arc::new(TextAssertingExtractor));

        let reports = service
            .process_batch(
                None,
                Uuid::new_v4(),
                vec![IngestFile {
                    file_name: "list.csv".to_string(),
                    content: b"invoice,amount".to_vec(),
                    mime_type: "text/csv".to_string(),
                }],
            )
            .await;

        // No vendor identity, so the dedup check passes and the draft
        // is persisted with empty fields.
        assert!(matches!(reports[0].outcome, IngestOutcome::Accepted { .. }));
    }
}
