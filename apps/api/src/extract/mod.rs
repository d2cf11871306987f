//! Text extraction — normalizes PDF/DOCX/image uploads into plain text.
//!
//! Extraction never fails past this boundary: any error degrades to an
//! empty string, which downstream stages treat as "no content" and turn
//! into empty fields. Only an unsupported MIME type is a hard per-file
//! error, and that is decided by the caller via [`ResumeFormat::from_mime`].

pub mod prompts;

use tracing::warn;

use crate::docx::DocxFile;
use crate::extract::prompts::IMAGE_EXTRACTION_PROMPT;
use crate::oracle::Oracle;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Supported upload formats, derived from the declared MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    Pdf,
    Docx,
    Jpeg,
    Png,
}

impl ResumeFormat {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/pdf" => Some(ResumeFormat::Pdf),
            DOCX_MIME => Some(ResumeFormat::Docx),
            "image/jpeg" => Some(ResumeFormat::Jpeg),
            "image/png" => Some(ResumeFormat::Png),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ResumeFormat::Pdf => "application/pdf",
            ResumeFormat::Docx => DOCX_MIME,
            ResumeFormat::Jpeg => "image/jpeg",
            ResumeFormat::Png => "image/png",
        }
    }

}

/// Produces the plain-text representation of an uploaded resume.
///
/// - PDF: text per page, concatenated (no OCR fallback for scanned PDFs).
/// - DOCX: paragraph and table text in document order.
/// - Image: delegated to the oracle, extraction and summary shaping fused
///   into one call.
pub async fn extract_text(oracle: &dyn Oracle, format: ResumeFormat, bytes: &[u8]) -> String {
    match format {
        ResumeFormat::Pdf => pdf_extract::extract_text_from_mem(bytes).unwrap_or_else(|e| {
            warn!("PDF text extraction failed: {e}");
            String::new()
        }),
        ResumeFormat::Docx => match DocxFile::from_bytes(bytes) {
            Ok(doc) => doc.document_text(),
            Err(e) => {
                warn!("DOCX text extraction failed: {e}");
                String::new()
            }
        },
        ResumeFormat::Jpeg | ResumeFormat::Png => oracle
            .complete_with_image(IMAGE_EXTRACTION_PROMPT, format.mime(), bytes)
            .await
            .unwrap_or_else(|e| {
                warn!("image extraction via oracle failed: {e}");
                String::new()
            }),
    }
}
