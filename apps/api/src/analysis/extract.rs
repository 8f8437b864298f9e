//! Text Extractor: turns an uploaded PDF into plain text.

use bytes::Bytes;
use tracing::{debug, warn};

use crate::analysis::error::AnalysisError;

const PDF_MAGIC: &[u8] = b"%PDF-";
/// The PDF header may be preceded by junk bytes, but only within the first KiB.
const PDF_HEADER_WINDOW: usize = 1024;

/// Declared type of an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentType {
    Pdf,
    Other(String),
}

impl DocumentType {
    /// Resolves the declared type from the upload's content type, falling back to the
    /// file extension when the content type is missing or generic.
    pub fn from_declared(content_type: Option<&str>, file_name: &str) -> Self {
        let mime = content_type
            .map(|ct| ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
            .unwrap_or_default();

        match mime.as_str() {
            "application/pdf" => DocumentType::Pdf,
            "" | "application/octet-stream" => {
                if file_name.to_ascii_lowercase().ends_with(".pdf") {
                    DocumentType::Pdf
                } else {
                    DocumentType::Other(
                        file_name
                            .rsplit_once('.')
                            .map(|(_, ext)| ext.to_ascii_lowercase())
                            .unwrap_or_else(|| "unknown".to_string()),
                    )
                }
            }
            _ => DocumentType::Other(mime),
        }
    }
}

fn has_pdf_header(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(PDF_HEADER_WINDOW)];
    window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC)
}

/// Extracts the text layer of a document. Image-only PDFs yield an empty string.
pub fn extract_text(bytes: &[u8], document_type: &DocumentType) -> Result<String, AnalysisError> {
    if let DocumentType::Other(kind) = document_type {
        return Err(AnalysisError::UnsupportedDocument(kind.clone()));
    }

    if !has_pdf_header(bytes) {
        return Err(AnalysisError::Extraction(
            "document is not a PDF (missing %PDF- header)".to_string(),
        ));
    }

    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| AnalysisError::Extraction(format!("PDF extraction error: {e}")))?;

    debug!("Extracted {} characters from PDF", text.chars().count());
    Ok(text)
}

/// Runs `extract_text` on the blocking pool. The buffer is owned by the task and
/// dropped when it completes, including when the parser panics.
pub async fn extract_text_blocking(
    bytes: Bytes,
    document_type: DocumentType,
) -> Result<String, AnalysisError> {
    let text = tokio::task::spawn_blocking(move || extract_text(&bytes, &document_type))
        .await
        .map_err(|e| {
            warn!("PDF extraction task failed: {e}");
            AnalysisError::Extraction("PDF parser crashed on this document".to_string())
        })??;

    if text.trim().is_empty() {
        warn!("PDF has no extractable text layer");
    }
    Ok(text)
}
