//! Extraction pipeline: Extractor → Builder → Gateway → Normalizer → Validator.
//!
//! One call analyzes one upload. Any stage failure aborts the remaining stages.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{error, info};

use crate::analysis::error::AnalysisError;
use crate::analysis::extract::{extract_text_blocking, DocumentType};
use crate::analysis::normalize::normalize_response;
use crate::analysis::request::RequestBuilder;
use crate::analysis::validate::validate_response;
use crate::llm_client::{GatewayError, ModelGateway};
use crate::models::resume::CandidateRecord;

/// An uploaded document as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Bytes,
    pub file_name: String,
    pub document_type: DocumentType,
}

#[derive(Clone)]
pub struct ResumeAnalyzer {
    gateway: Arc<dyn ModelGateway>,
    builder: RequestBuilder,
}

impl ResumeAnalyzer {
    pub fn new(gateway: Arc<dyn ModelGateway>, builder: RequestBuilder) -> Self {
        Self { gateway, builder }
    }

    /// Runs the full pipeline for one upload.
    pub async fn analyze(&self, upload: Upload) -> Result<CandidateRecord, AnalysisError> {
        self.analyze_until(upload, std::future::pending::<()>()).await
    }

    /// Like `analyze`, but gives up with `GatewayError::Cancelled` if `cancelled`
    /// resolves while the model call is outstanding.
    pub async fn analyze_until<C>(
        &self,
        upload: Upload,
        cancelled: C,
    ) -> Result<CandidateRecord, AnalysisError>
    where
        C: Future<Output = ()>,
    {
        let Upload {
            bytes,
            file_name,
            document_type,
        } = upload;

        if bytes.is_empty() {
            return Err(AnalysisError::EmptyDocument);
        }

        info!("Analyzing '{}' ({} bytes)", file_name, bytes.len());
        let text = extract_text_blocking(bytes, document_type).await?;
        self.analyze_text_until(&text, &file_name, cancelled).await
    }

    /// Runs everything after text extraction.
    pub async fn analyze_text_until<C>(
        &self,
        text: &str,
        file_name: &str,
        cancelled: C,
    ) -> Result<CandidateRecord, AnalysisError>
    where
        C: Future<Output = ()>,
    {
        let request = self.builder.build(text);
        let instruction = request.instruction();

        let raw = tokio::select! {
            biased;
            _ = cancelled => {
                info!("Analysis of '{}' cancelled during model call", file_name);
                return Err(GatewayError::Cancelled.into());
            }
            reply = self.gateway.complete(&instruction) => reply?,
        };

        let normalized = normalize_response(&raw);
        let record = validate_response(&normalized, &raw, file_name).inspect_err(|e| {
            error!(
                "Unusable model response for '{}': {e}\n{}",
                file_name,
                e.raw_response().unwrap_or_default()
            );
        })?;

        info!(
            "Analyzed '{}': {} jobs, {} skills, rating {:?}",
            file_name,
            record.work_experience.len(),
            record.technical_skills.len(),
            record.resume_rating
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::analysis::error::Stage;
    use crate::analysis::prompts::{DOCUMENT_BEGIN, DOCUMENT_END};
    use crate::analysis::test_support::{sample_pdf, ScriptedGateway};

    fn analyzer(gateway: Arc<ScriptedGateway>) -> ResumeAnalyzer {
        ResumeAnalyzer::new(gateway, RequestBuilder::default())
    }

    fn pdf_upload(lines: &[&str]) -> Upload {
        Upload {
            bytes: Bytes::from(sample_pdf(lines)),
            file_name: "ada.pdf".to_string(),
            document_type: DocumentType::Pdf,
        }
    }

    #[tokio::test]
    async fn test_pdf_to_record() {
        let gateway = Arc::new(ScriptedGateway::replying(
            "```json\n{\"name\": \"Ada Lovelace\", \"technical_skills\": [\"Rust\"], \"resume_rating\": 8}\n```",
        ));
        let record = analyzer(gateway.clone())
            .analyze(pdf_upload(&["Ada Lovelace", "Skills Rust"]))
            .await
            .unwrap();

        assert_eq!(record.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(record.technical_skills, vec!["Rust"]);
        assert_eq!(record.resume_rating, Some(8.0));
        assert!(record.projects.is_empty());
        assert_eq!(record.file_name, "ada.pdf");

        let instructions = gateway.instructions.lock().unwrap();
        assert_eq!(instructions.len(), 1);
        let quoted_start = instructions[0].rfind(DOCUMENT_BEGIN).unwrap();
        let quoted_end = instructions[0].rfind(DOCUMENT_END).unwrap();
        assert!(instructions[0][quoted_start..quoted_end].contains("Lovelace"));
    }

    #[tokio::test]
    async fn test_pdf_without_text_layer_still_reaches_gateway() {
        let gateway = Arc::new(ScriptedGateway::replying(
            r#"{"name": null, "summary": "No readable text in the document"}"#,
        ));
        let record = analyzer(gateway.clone())
            .analyze(pdf_upload(&[]))
            .await
            .unwrap();

        assert_eq!(gateway.calls(), 1);
        assert_eq!(record.name, None);
        assert_eq!(
            record.summary.as_deref(),
            Some("No readable text in the document")
        );
        assert_eq!(record.file_name, "ada.pdf");

        let instructions = gateway.instructions.lock().unwrap();
        let begin = instructions[0].find(DOCUMENT_BEGIN).unwrap() + DOCUMENT_BEGIN.len();
        let end = instructions[0].find(DOCUMENT_END).unwrap();
        assert!(instructions[0][begin..end].trim().is_empty());
    }

    #[tokio::test]
    async fn test_empty_upload_never_reaches_gateway() {
        let gateway = Arc::new(ScriptedGateway::replying("{}"));
        let err = analyzer(gateway.clone())
            .analyze(Upload {
                bytes: Bytes::new(),
                file_name: "empty.pdf".to_string(),
                document_type: DocumentType::Pdf,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::EmptyDocument));
        assert_eq!(err.stage(), Stage::Upload);
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_document_never_reaches_gateway() {
        let gateway = Arc::new(ScriptedGateway::replying("{}"));
        let err = analyzer(gateway.clone())
            .analyze(Upload {
                bytes: Bytes::from_static(b"plain text resume"),
                file_name: "cv.txt".to_string(),
                document_type: DocumentType::Other("text/plain".to_string()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::UnsupportedDocument(_)));
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_gateway_error_propagates_unchanged() {
        let gateway = Arc::new(ScriptedGateway::failing(GatewayError::QuotaExhausted(
            "daily limit".to_string(),
        )));
        let err = analyzer(gateway.clone())
            .analyze_text_until("Ada", "ada.pdf", std::future::pending::<()>())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AnalysisError::Gateway(GatewayError::QuotaExhausted(ref m)) if m == "daily limit"
        ));
        assert_eq!(err.stage(), Stage::ModelGateway);
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_reply_keeps_raw_text() {
        let raw = "The document appears to be a cover letter, not a résumé.";
        let gateway = Arc::new(ScriptedGateway::replying(raw));
        let err = analyzer(gateway)
            .analyze_text_until("Dear hiring manager", "letter.pdf", std::future::pending::<()>())
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Stage::Validation);
        assert_eq!(err.raw_response(), Some(raw));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_model_call() {
        let gateway = Arc::new(
            ScriptedGateway::replying(r#"{"name": "Ada"}"#).delayed(Duration::from_secs(30)),
        );
        let err = analyzer(gateway.clone())
            .analyze_text_until(
                "Ada",
                "ada.pdf",
                tokio::time::sleep(Duration::from_secs(1)),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Gateway(GatewayError::Cancelled)));
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_uploads_are_independent() {
        let gateway = Arc::new(ScriptedGateway::with(vec![
            Ok(r#"{"name": "First"}"#.to_string()),
            Ok(r#"{"name": "Second"}"#.to_string()),
        ]));
        let analyzer = analyzer(gateway.clone());

        let (a, b) = tokio::join!(
            analyzer.analyze_text_until("one", "one.pdf", std::future::pending::<()>()),
            analyzer.analyze_text_until("two", "two.pdf", std::future::pending::<()>()),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(a.file_name, "one.pdf");
        assert_eq!(b.file_name, "two.pdf");
        let mut names = vec![a.name.unwrap(), b.name.unwrap()];
        names.sort();
        assert_eq!(names, vec!["First", "Second"]);
        assert_eq!(gateway.calls(), 2);
    }
}
