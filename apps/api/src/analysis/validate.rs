//! Schema Validator/Coercer: strict parse of the normalized text, then
//! coercion into `CandidateRecord`.
//!
//! Coercion rules:
//! - missing or null list fields become `[]`; a bare scalar in a list slot becomes a
//!   one-element list; nested containers inside string lists are dropped
//! - missing or null scalars stay `None`; an explicit `""` is kept as `Some("")`
//! - numbers and booleans in text slots are stringified; containers become `None`
//! - `resume_rating` must be a finite number in [1, 10], given as a JSON number or a
//!   numeric string; anything else is nulled out, never clamped
//! - unknown fields are ignored

use serde_json::{Map, Value};
use tracing::warn;

use crate::analysis::error::AnalysisError;
use crate::analysis::prompts::RESUME_SCHEMA;
use crate::models::resume::{CandidateRecord, Education, WorkExperience};

pub const RATING_MIN: f64 = 1.0;
pub const RATING_MAX: f64 = 10.0;

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn text(value: Option<&Value>, field: &str) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => {
            warn!("Ignoring {} in text field '{field}'", kind_of(other));
            None
        }
    }
}

fn text_list(value: Option<&Value>, field: &str) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Null => None,
                Value::Array(_) | Value::Object(_) => {
                    warn!("Dropping {} inside list field '{field}'", kind_of(item));
                    None
                }
                scalar => text(Some(scalar), field),
            })
            .collect(),
        Some(Value::Object(_)) => {
            warn!("Ignoring object in list field '{field}'");
            Vec::new()
        }
        Some(scalar) => text(Some(scalar), field).into_iter().collect(),
    }
}

fn object_list<T>(
    value: Option<&Value>,
    field: &str,
    build: impl Fn(&Map<String, Value>) -> T,
) -> Vec<T> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(entry)) => vec![build(entry)],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(entry) => Some(build(entry)),
                other => {
                    warn!("Dropping {} entry in '{field}'", kind_of(other));
                    None
                }
            })
            .collect(),
        Some(other) => {
            warn!("Ignoring {} in list field '{field}'", kind_of(other));
            Vec::new()
        }
    }
}

fn work_experience(entry: &Map<String, Value>) -> WorkExperience {
    WorkExperience {
        role: text(entry.get("role"), "work_experience.role"),
        company: text(entry.get("company"), "work_experience.company"),
        duration: text(entry.get("duration"), "work_experience.duration"),
        description: text_list(entry.get("description"), "work_experience.description"),
    }
}

fn education(entry: &Map<String, Value>) -> Education {
    Education {
        degree: text(entry.get("degree"), "education.degree"),
        institution: text(entry.get("institution"), "education.institution"),
        graduation_year: text(entry.get("graduation_year"), "education.graduation_year"),
    }
}

/// Applies the rating policy: in-range numbers pass, everything else is `None`.
pub fn coerce_rating(value: Option<&Value>) -> Option<f64> {
    let rating = match value? {
        Value::Null => return None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match rating {
        Some(r) if r.is_finite() && (RATING_MIN..=RATING_MAX).contains(&r) => Some(r),
        _ => {
            let shown = value.map(|v| v.to_string()).unwrap_or_default();
            warn!("Discarding resume_rating {shown}: not a number in [{RATING_MIN}, {RATING_MAX}]");
            None
        }
    }
}

/// Parses `normalized` and coerces it into a `CandidateRecord` tagged with
/// `file_name`. `raw` is the untouched model reply, kept for the error.
pub fn validate_response(
    normalized: &str,
    raw: &str,
    file_name: &str,
) -> Result<CandidateRecord, AnalysisError> {
    let parsed: Value =
        serde_json::from_str(normalized).map_err(|e| AnalysisError::ResponseFormat {
            reason: format!("invalid JSON after repair: {e}"),
            raw_response: raw.to_string(),
        })?;

    let obj = match parsed {
        Value::Object(obj) => obj,
        other => {
            return Err(AnalysisError::ResponseFormat {
                reason: format!("expected a JSON object, got {}", kind_of(&other)),
                raw_response: raw.to_string(),
            })
        }
    };

    // An object sharing no key with the schema is prose that repair turned into keys.
    let is_schema_field =
        |key: &String| RESUME_SCHEMA.iter().any(|(name, _)| *name == key.as_str());
    if !obj.is_empty() && !obj.keys().any(is_schema_field) {
        return Err(AnalysisError::ResponseFormat {
            reason: "object has none of the résumé fields".to_string(),
            raw_response: raw.to_string(),
        });
    }

    Ok(CandidateRecord {
        name: text(obj.get("name"), "name"),
        email: text(obj.get("email"), "email"),
        phone: text(obj.get("phone"), "phone"),
        linkedin_url: text(obj.get("linkedin_url"), "linkedin_url"),
        portfolio_url: text(obj.get("portfolio_url"), "portfolio_url"),
        summary: text(obj.get("summary"), "summary"),
        work_experience: object_list(obj.get("work_experience"), "work_experience", work_experience),
        education: object_list(obj.get("education"), "education", education),
        technical_skills: text_list(obj.get("technical_skills"), "technical_skills"),
        soft_skills: text_list(obj.get("soft_skills"), "soft_skills"),
        projects: text_list(obj.get("projects"), "projects"),
        certifications: text_list(obj.get("certifications"), "certifications"),
        resume_rating: coerce_rating(obj.get("resume_rating")),
        improvement_areas: text(obj.get("improvement_areas"), "improvement_areas"),
        upskill_suggestions: text_list(obj.get("upskill_suggestions"), "upskill_suggestions"),
        file_name: file_name.to_string(),
    })
}
