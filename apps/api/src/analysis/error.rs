//! Error taxonomy for the résumé analysis pipeline.

use std::fmt;

use thiserror::Error;

use crate::llm_client::GatewayError;

/// The pipeline stage a failure originated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Upload,
    Extraction,
    ModelGateway,
    Validation,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Upload => "upload",
            Stage::Extraction => "extraction",
            Stage::ModelGateway => "model_gateway",
            Stage::Validation => "validation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Uploaded document is empty")]
    EmptyDocument,

    #[error("Unsupported document type: {0}")]
    UnsupportedDocument(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Model gateway failed: {0}")]
    Gateway(#[from] GatewayError),

    /// The model answered, but nothing schema-shaped could be recovered.
    /// `raw_response` is the untouched model output.
    #[error("Model response could not be parsed: {reason}")]
    ResponseFormat {
        reason: String,
        raw_response: String,
    },
}

impl AnalysisError {
    pub fn stage(&self) -> Stage {
        match self {
            AnalysisError::EmptyDocument => Stage::Upload,
            AnalysisError::UnsupportedDocument(_) | AnalysisError::Extraction(_) => {
                Stage::Extraction
            }
            AnalysisError::Gateway(_) => Stage::ModelGateway,
            AnalysisError::ResponseFormat { .. } => Stage::Validation,
        }
    }

    /// The raw model output, when the failure happened after the model answered.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            AnalysisError::ResponseFormat { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }
}
