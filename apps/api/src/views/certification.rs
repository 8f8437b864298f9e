//! Certification Parser: splits `<name> — Issued by <organization> (<date>)`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Placeholder for a sub-field the parser could not determine.
pub const NOT_AVAILABLE: &str = "N/A";

static CERTIFICATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(.*?)\s*[–—―]\s*(?i:issued by)\s+(.*?)\s*\((.*?)\)")
        .expect("certification pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCertification {
    pub name: String,
    pub issuing_organization: String,
    pub issue_date: String,
}

/// Never fails: unrecognized text becomes the name, with `N/A` for the rest.
pub fn parse_certification(input: &str) -> ParsedCertification {
    match CERTIFICATION.captures(input) {
        Some(caps) => ParsedCertification {
            name: caps[1].trim().to_string(),
            issuing_organization: caps[2].trim().to_string(),
            issue_date: caps[3].trim().to_string(),
        },
        None => ParsedCertification {
            name: input.trim().to_string(),
            issuing_organization: NOT_AVAILABLE.to_string(),
            issue_date: NOT_AVAILABLE.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cert(name: &str, org: &str, date: &str) -> ParsedCertification {
        ParsedCertification {
            name: name.to_string(),
            issuing_organization: org.to_string(),
            issue_date: date.to_string(),
        }
    }

    #[test]
    fn test_em_dash_pattern() {
        assert_eq!(
            parse_certification("AWS Certified Developer — Issued by Amazon (2022)"),
            cert("AWS Certified Developer", "Amazon", "2022")
        );
    }

    #[test]
    fn test_unstructured_text_falls_back() {
        assert_eq!(
            parse_certification("Random unstructured text"),
            cert("Random unstructured text", "N/A", "N/A")
        );
    }

    #[test]
    fn test_en_dash_and_extra_whitespace() {
        assert_eq!(
            parse_certification("  CKA   –  Issued by   The Linux Foundation  ( March 2023 ) "),
            cert("CKA", "The Linux Foundation", "March 2023")
        );
    }

    #[test]
    fn test_lowercase_issued_by() {
        assert_eq!(
            parse_certification("Scrum Master — issued by Scrum.org (2021)"),
            cert("Scrum Master", "Scrum.org", "2021")
        );
    }

    #[test]
    fn test_hyphen_is_not_a_separator() {
        assert_eq!(
            parse_certification("PMP - Issued by PMI (2020)"),
            cert("PMP - Issued by PMI (2020)", "N/A", "N/A")
        );
    }

    #[test]
    fn test_missing_date_falls_back() {
        assert_eq!(
            parse_certification("  Azure Fundamentals — Issued by Microsoft "),
            cert("Azure Fundamentals — Issued by Microsoft", "N/A", "N/A")
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_certification(""), cert("", "N/A", "N/A"));
    }
}
