//! Request Builder: composes the deterministic extraction instruction.

use std::borrow::Cow;

use tracing::warn;

use crate::analysis::prompts::{
    render_schema, FieldShape, DOCUMENT_BEGIN, DOCUMENT_END, RESUME_ANALYSIS_PROMPT,
    RESUME_SCHEMA, TRUNCATION_NOTE,
};

/// Weakened spellings written in place of marker lines found in the document.
const ESCAPED_BEGIN: &str = "<<RESUME_TEXT_BEGIN>>";
const ESCAPED_END: &str = "<<RESUME_TEXT_END>>";

/// Rewrites any begin/end marker inside the document so the quoted region can only
/// be closed by the real end marker. Repeats until no marker can re-form.
fn escape_markers(text: &str) -> Cow<'_, str> {
    let has_marker = |t: &str| t.contains(DOCUMENT_BEGIN) || t.contains(DOCUMENT_END);
    if !has_marker(text) {
        return Cow::Borrowed(text);
    }

    let mut escaped = text.to_string();
    while has_marker(&escaped) {
        escaped = escaped
            .replace(DOCUMENT_BEGIN, ESCAPED_BEGIN)
            .replace(DOCUMENT_END, ESCAPED_END);
    }
    warn!("Résumé text contained document marker lines; they were escaped");
    Cow::Owned(escaped)
}

/// Default cap on document text sent to the model, in characters.
pub const DEFAULT_MAX_DOCUMENT_CHARS: usize = 50_000;

/// One extraction request: the (possibly truncated) document text plus the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    pub document_text: String,
    pub schema: &'static [(&'static str, FieldShape)],
    /// Set when `document_text` was cut at the character cap.
    pub truncated: bool,
}

impl ExtractionRequest {
    /// The full instruction string submitted to the model.
    pub fn instruction(&self) -> String {
        let note = if self.truncated { TRUNCATION_NOTE } else { "" };
        // Document text goes in last so its content is never treated as a placeholder.
        RESUME_ANALYSIS_PROMPT
            .replace("{begin}", DOCUMENT_BEGIN)
            .replace("{end}", DOCUMENT_END)
            .replace("{truncation_note}", note)
            .replace("{schema}", &render_schema(self.schema))
            .replace("{resume_text}", &escape_markers(&self.document_text))
    }
}

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    max_document_chars: usize,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DOCUMENT_CHARS)
    }
}

impl RequestBuilder {
    pub fn new(max_document_chars: usize) -> Self {
        Self { max_document_chars }
    }

    /// Builds the request, truncating the text to the first `max_document_chars`
    /// characters when it is longer.
    pub fn build(&self, document_text: &str) -> ExtractionRequest {
        let (document_text, truncated) =
            match document_text.char_indices().nth(self.max_document_chars) {
                Some((cut, _)) => {
                    warn!(
                        "Résumé text truncated from {} to {} characters",
                        document_text.chars().count(),
                        self.max_document_chars
                    );
                    (&document_text[..cut], true)
                }
                None => (document_text, false),
            };

        ExtractionRequest {
            document_text: document_text.to_string(),
            schema: RESUME_SCHEMA,
            truncated,
        }
    }
}
