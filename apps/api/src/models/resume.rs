use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// One entry of `work_experience`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub role: Option<String>,
    pub company: Option<String>,
    pub duration: Option<String>,
    #[serde(default)]
    pub description: Vec<String>,
}

/// One entry of `education`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub graduation_year: Option<String>,
}

/// The canonical structured résumé produced by the analysis pipeline.
///
/// Scalars are `None` when the model did not provide them; `Some("")` means the
/// model provided an explicit blank. List fields are always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub work_experience: Vec<WorkExperience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub technical_skills: Vec<String>,
    #[serde(default)]
    pub soft_skills: Vec<String>,
    /// Free text, decoded on read by `views::project::parse_project`.
    #[serde(default)]
    pub projects: Vec<String>,
    /// Free text, decoded on read by `views::certification::parse_certification`.
    #[serde(default)]
    pub certifications: Vec<String>,
    /// Within [1, 10] when present.
    pub resume_rating: Option<f64>,
    pub improvement_areas: Option<String>,
    #[serde(default)]
    pub upskill_suggestions: Vec<String>,
    pub file_name: String,
}

/// A persisted record with its storage-assigned identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResume {
    pub id: Uuid,
    pub uploaded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: CandidateRecord,
}

/// Listing projection of a stored résumé.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ResumeSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Row shape of the `resumes` table. List fields live in JSONB columns.
#[derive(Debug, Clone, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub file_name: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub summary: Option<String>,
    pub work_experience: Json<Vec<WorkExperience>>,
    pub education: Json<Vec<Education>>,
    pub technical_skills: Json<Vec<String>>,
    pub soft_skills: Json<Vec<String>>,
    pub projects: Json<Vec<String>>,
    pub certifications: Json<Vec<String>>,
    pub resume_rating: Option<f64>,
    pub improvement_areas: Option<String>,
    pub upskill_suggestions: Json<Vec<String>>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<ResumeRow> for StoredResume {
    fn from(row: ResumeRow) -> Self {
        StoredResume {
            id: row.id,
            uploaded_at: row.uploaded_at,
            record: CandidateRecord {
                name: row.name,
                email: row.email,
                phone: row.phone,
                linkedin_url: row.linkedin_url,
                portfolio_url: row.portfolio_url,
                summary: row.summary,
                work_experience: row.work_experience.0,
                education: row.education.0,
                technical_skills: row.technical_skills.0,
                soft_skills: row.soft_skills.0,
                projects: row.projects.0,
                certifications: row.certifications.0,
                resume_rating: row.resume_rating,
                improvement_areas: row.improvement_areas,
                upskill_suggestions: row.upskill_suggestions.0,
                file_name: row.file_name,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_resume_serializes_flat() {
        let stored = StoredResume {
            id: Uuid::nil(),
            uploaded_at: Utc::now(),
            record: CandidateRecord {
                name: Some("Jane Doe".to_string()),
                file_name: "jane.pdf".to_string(),
                ..Default::default()
            },
        };

        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["name"], "Jane Doe");
        assert_eq!(json["file_name"], "jane.pdf");
        assert!(json["projects"].as_array().unwrap().is_empty());
        assert!(json["email"].is_null());
        assert!(json.get("record").is_none());
    }

    #[test]
    fn test_row_converts_into_stored_resume() {
        let row = ResumeRow {
            id: Uuid::nil(),
            file_name: "cv.pdf".to_string(),
            name: Some("Sam".to_string()),
            email: None,
            phone: None,
            linkedin_url: None,
            portfolio_url: None,
            summary: None,
            work_experience: Json(vec![WorkExperience {
                role: Some("Engineer".to_string()),
                ..Default::default()
            }]),
            education: Json(vec![]),
            technical_skills: Json(vec!["Rust".to_string()]),
            soft_skills: Json(vec![]),
            projects: Json(vec![]),
            certifications: Json(vec![]),
            resume_rating: Some(7.0),
            improvement_areas: None,
            upskill_suggestions: Json(vec![]),
            uploaded_at: Utc::now(),
        };

        let stored = StoredResume::from(row);
        assert_eq!(stored.record.file_name, "cv.pdf");
        assert_eq!(stored.record.technical_skills, vec!["Rust"]);
        assert_eq!(
            stored.record.work_experience[0].role.as_deref(),
            Some("Engineer")
        );
        assert_eq!(stored.record.resume_rating, Some(7.0));
    }
}
