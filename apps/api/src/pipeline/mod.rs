//! Pipeline orchestrator — runs each uploaded file through
//! extract → field extraction → parse → fill → post-process → save.
//!
//! Files are processed strictly sequentially; a failure is terminal for
//! that file only, never for the batch. One in-memory document handle is
//! threaded through all fill and cleanup stages and saved exactly once.

pub mod archive;
pub mod handlers;
pub mod variant;

use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::docx::{cleanup, fill, DocxError, DocxFile};
use crate::extract::{self, ResumeFormat};
use crate::fields::{self, parser, FieldKind};
use crate::oracle::Oracle;
use crate::photo;
use crate::pipeline::variant::{TableKind, TemplateVariant, VariantConfig};

/// Per-file processing errors. None of these abort the batch.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unsupported file format: {0:?}")]
    UnsupportedFormat(String),

    #[error("template not found: {0}")]
    MissingTemplate(PathBuf),

    #[error("document error: {0}")]
    Docx(#[from] DocxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stages of the per-file state machine. `Saved` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Uploaded,
    TextExtracted,
    FieldsExtracted,
    TemplateFilled,
    PostProcessed,
    Saved,
    Failed,
}

/// One uploaded resume, as received from the multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Bytes,
}

/// A failure carrying the stage the file had reached when it died.
#[derive(Debug)]
struct FileFailure {
    reached: Stage,
    source: PipelineError,
}

impl FileFailure {
    fn at(reached: Stage) -> impl FnOnce(PipelineError) -> FileFailure {
        move |source| FileFailure { reached, source }
    }
}

/// Terminal outcome for one file of a batch.
#[derive(Debug, Serialize)]
pub struct FileOutcome {
    pub file: String,
    pub stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Result of one batch submission.
#[derive(Debug, Serialize)]
pub struct BatchResult {
    pub batch_id: Uuid,
    pub variant: TemplateVariant,
    pub created_at: DateTime<Utc>,
    pub outcomes: Vec<FileOutcome>,
    pub saved: usize,
    pub failed: usize,
    #[serde(skip)]
    pub archive_path: Option<PathBuf>,
}

/// Runs a batch to completion: every file reaches `Saved` or `Failed`,
/// then all saved outputs are packaged into one ZIP archive.
pub async fn run_batch(
    config: &Config,
    oracle: &dyn Oracle,
    variant: TemplateVariant,
    files: &[UploadedFile],
) -> anyhow::Result<BatchResult> {
    let vcfg = variant.config();
    let batch_id = Uuid::new_v4();
    let out_dir = config
        .output_root
        .join(batch_id.to_string())
        .join(vcfg.output_dir);
    fs::create_dir_all(&out_dir)?;

    info!(
        "batch {batch_id}: {} file(s), variant {}",
        files.len(),
        vcfg.key
    );

    let mut outcomes = Vec::with_capacity(files.len());
    for file in files {
        info!("processing {}", file.name);
        match process_file(vcfg, &config.templates_dir, &out_dir, oracle, file).await {
            Ok(path) => {
                info!("{} saved to {}", file.name, path.display());
                outcomes.push(FileOutcome {
                    file: file.name.clone(),
                    stage: Stage::Saved,
                    error: None,
                    output: path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned()),
                });
            }
            Err(failure) => {
                warn!(
                    "{} failed after {:?}: {}",
                    file.name, failure.reached, failure.source
                );
                outcomes.push(FileOutcome {
                    file: file.name.clone(),
                    stage: Stage::Failed,
                    error: Some(format!("{}: {}", file.name, failure.source)),
                    output: None,
                });
            }
        }
    }

    let saved = outcomes.iter().filter(|o| o.stage == Stage::Saved).count();
    let failed = outcomes.len() - saved;

    let archive_path = if saved > 0 {
        let bytes = archive::zip_dir_to_bytes(&out_dir)?;
        let entries = archive::archive_entry_count(&bytes)?;
        let path = out_dir.with_extension("zip");
        fs::write(&path, &bytes)?;
        info!(
            "batch {batch_id}: archived {entries} document(s) to {}",
            path.display()
        );
        Some(path)
    } else {
        None
    };

    Ok(BatchResult {
        batch_id,
        variant,
        created_at: Utc::now(),
        outcomes,
        saved,
        failed,
        archive_path,
    })
}

/// Runs one file through the whole pipeline. The returned error carries
/// the last stage the file completed.
async fn process_file(
    vcfg: &VariantConfig,
    templates_dir: &Path,
    out_dir: &Path,
    oracle: &dyn Oracle,
    file: &UploadedFile,
) -> Result<PathBuf, FileFailure> {
    // Uploaded → TextExtracted
    let format = ResumeFormat::from_mime(&file.mime).ok_or_else(|| {
        FileFailure::at(Stage::Uploaded)(PipelineError::UnsupportedFormat(file.mime.clone()))
    })?;
    let text = extract::extract_text(oracle, format, &file.bytes).await;
    debug!(
        "{}: {:?}, {} chars of text",
        file.name,
        Stage::TextExtracted,
        text.len()
    );

    // TextExtracted → FieldsExtracted (isolated per-field calls; an empty
    // text simply yields empty fields)
    let extracted = fields::extract_fields(oracle, &text, vcfg.fields).await;
    debug!("{}: {:?}", file.name, Stage::FieldsExtracted);

    let education = parser::parse_education(extracted.get(FieldKind::Education));
    let skills = parser::parse_skills(extracted.get(FieldKind::TechnicalSkills));
    let experience = parser::parse_work_experience(extracted.get(FieldKind::WorkExperience));

    // FieldsExtracted → TemplateFilled
    let template_path = templates_dir.join(vcfg.template_file);
    if !template_path.exists() {
        return Err(FileFailure::at(Stage::FieldsExtracted)(
            PipelineError::MissingTemplate(template_path),
        ));
    }
    let mut doc = DocxFile::open(&template_path)
        .map_err(PipelineError::from)
        .map_err(FileFailure::at(Stage::FieldsExtracted))?;

    for ph in vcfg.placeholders {
        fill::replace_placeholder(&mut doc, ph.token, extracted.get(ph.field));
    }

    for target in vcfg.tables {
        let rows: Vec<Vec<String>> = match target.kind {
            TableKind::Education => education
                .iter()
                .map(|e| {
                    vec![
                        e.degree.clone(),
                        e.institution.clone(),
                        e.years.clone(),
                    ]
                })
                .collect(),
            TableKind::Skills => skills.iter().map(|s| vec![s.clone()]).collect(),
            TableKind::Experience => experience
                .iter()
                .map(|e| {
                    vec![
                        e.organization.clone(),
                        e.role.clone(),
                        e.duration.clone(),
                    ]
                })
                .collect(),
        };
        fill::fill_table_rows(&mut doc, target.index, &rows, true)
            .map_err(PipelineError::from)
            .map_err(FileFailure::at(Stage::TemplateFilled))?;
    }

    // TemplateFilled → PostProcessed
    cleanup::normalize_bullets(&mut doc);
    cleanup::scrub_symbols(&mut doc);
    cleanup::delete_empty_rows(&mut doc, vcfg.empty_row_rule);
    if vcfg.photo_step {
        photo::run_photo_step(&mut doc, format, &file.bytes);
    }

    // PostProcessed → Saved: the single write of the whole pipeline.
    let out_path = out_dir.join(format!("{}_resume.docx", file_stem(&file.name)));
    doc.save(&out_path)
        .map_err(PipelineError::from)
        .map_err(FileFailure::at(Stage::PostProcessed))?;

    Ok(out_path)
}

/// Original filename without its final extension, with path separators
/// stripped so upload names cannot escape the output folder.
fn file_stem(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    Path::new(base)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "resume".to_string())
}
