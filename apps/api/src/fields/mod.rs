//! Field extraction — one independent oracle request per semantic field.
//!
//! Each field is a separate call with its own prompt; a failed call yields
//! an empty response and never blocks the other fields. No caching, no
//! batching, no retries: the per-document cost is a fixed number of calls.

pub mod parser;
pub mod prompts;

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::oracle::Oracle;

/// One semantic category of resume information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Name,
    Education,
    Summary,
    Certifications,
    TechnicalSkills,
    WorkExperience,
    ProjectExperience,
}

impl FieldKind {
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Name => "name",
            FieldKind::Education => "education",
            FieldKind::Summary => "summary",
            FieldKind::Certifications => "certifications",
            FieldKind::TechnicalSkills => "technical skills",
            FieldKind::WorkExperience => "work experience",
            FieldKind::ProjectExperience => "project experience",
        }
    }

    fn prompt_template(&self) -> &'static str {
        match self {
            FieldKind::Name => prompts::NAME_PROMPT,
            FieldKind::Education => prompts::EDUCATION_PROMPT,
            FieldKind::Summary => prompts::SUMMARY_PROMPT,
            FieldKind::Certifications => prompts::CERTIFICATIONS_PROMPT,
            FieldKind::TechnicalSkills => prompts::TECHNICAL_SKILLS_PROMPT,
            FieldKind::WorkExperience => prompts::WORK_EXPERIENCE_PROMPT,
            FieldKind::ProjectExperience => prompts::PROJECT_EXPERIENCE_PROMPT,
        }
    }
}

/// The free-text oracle responses for one document, keyed by field.
/// A field that was never requested, or whose request failed, reads as "".
#[derive(Debug, Default, Clone)]
pub struct ResumeFields {
    responses: HashMap<FieldKind, String>,
}

impl ResumeFields {
    pub fn get(&self, kind: FieldKind) -> &str {
        self.responses.get(&kind).map(String::as_str).unwrap_or("")
    }

    pub fn insert(&mut self, kind: FieldKind, text: String) {
        self.responses.insert(kind, text);
    }
}

/// Runs one isolated oracle request per requested field.
///
/// An empty resume text short-circuits: every field stays empty and no
/// oracle calls are made.
pub async fn extract_fields(
    oracle: &dyn Oracle,
    resume_text: &str,
    kinds: &[FieldKind],
) -> ResumeFields {
    let mut fields = ResumeFields::default();

    if resume_text.trim().is_empty() {
        warn!("resume text is empty; all fields default to empty");
        return fields;
    }

    for kind in kinds {
        let prompt = kind.prompt_template().replace("{resume_text}", resume_text);
        match oracle.complete(&prompt).await {
            Ok(text) => {
                debug!("{} extracted ({} chars)", kind.label(), text.len());
                fields.insert(*kind, text.trim().to_string());
            }
            Err(e) => {
                warn!(
                    "{} extraction failed: {e} — continuing with empty field",
                    kind.label()
                );
            }
        }
    }

    fields
}
