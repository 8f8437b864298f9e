//! Response Normalizer: unwraps the model's reply and repairs its JSON syntax.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::IgnoredAny;

use crate::analysis::repair::repair_json;

/// A closed triple-backtick block with an optional language tag.
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[\w-]*[^\S\n]*\n?(.*?)```").expect("fence pattern is valid")
});

/// An opening fence at the very start of the reply. Without a closing fence
/// (reply cut off mid-block) the block runs to the end of the text.
static LEADING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[\w-]*[^\S\n]*\n?").expect("fence pattern is valid"));

/// Strips fences and surrounding prose, returning the candidate JSON text.
/// Text that already parses as JSON is returned trimmed and otherwise untouched.
pub fn strip_wrapping(raw: &str) -> &str {
    let trimmed = raw.trim();
    if serde_json::from_str::<IgnoredAny>(trimmed).is_ok() {
        return trimmed;
    }

    let candidate = match FENCED_BLOCK.captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => match LEADING_FENCE.find(trimmed) {
            Some(open) => trimmed[open.end()..].trim(),
            None => trimmed,
        },
    };

    if candidate.starts_with('{') || candidate.starts_with('[') {
        return candidate;
    }

    // Prose around a bare object: keep the outermost braces.
    match candidate.find('{') {
        Some(first) => match candidate.rfind('}') {
            Some(last) if last > first => &candidate[first..=last],
            _ => &candidate[first..],
        },
        None => candidate,
    }
}

/// Produces text a strict JSON parser can consume. Never fails; unrecoverable
/// input surfaces when the validator parses the result.
pub fn normalize_response(raw: &str) -> String {
    repair_json(strip_wrapping(raw))
}
