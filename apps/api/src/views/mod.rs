// Presentation views derived from stored free-text fields.
// Recomputed on every read; never persisted.

pub mod certification;
pub mod project;

use serde::Serialize;

use crate::models::resume::StoredResume;
use certification::{parse_certification, ParsedCertification};
use project::{parse_project, ParsedProject};

/// A stored résumé plus its decoded certifications and projects.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeDetail {
    #[serde(flatten)]
    pub resume: StoredResume,
    pub parsed_certifications: Vec<ParsedCertification>,
    pub parsed_projects: Vec<ParsedProject>,
}

impl From<StoredResume> for ResumeDetail {
    fn from(resume: StoredResume) -> Self {
        let parsed_certifications = resume
            .record
            .certifications
            .iter()
            .map(|c| parse_certification(c))
            .collect();
        let parsed_projects = resume
            .record
            .projects
            .iter()
            .map(|p| parse_project(p))
            .collect();

        ResumeDetail {
            resume,
            parsed_certifications,
            parsed_projects,
        }
    }
}
