//! In-memory DOCX engine.
//!
//! A DOCX file is a ZIP container of XML parts. One [`DocxFile`] handle is
//! opened per (input file, template variant) pair and threaded through every
//! fill and cleanup stage, then saved exactly once — there is no
//! reopen/resave chain between stages and therefore no flush wait.

pub mod cleanup;
pub mod document;
pub mod fill;
pub mod xml;

pub use cleanup::EmptyRowRule;
pub use document::DocxFile;

use thiserror::Error;

/// Errors raised by the DOCX container and XML layer.
#[derive(Debug, Error)]
pub enum DocxError {
    #[error("not a DOCX container: {0}")]
    Container(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed document part: {0}")]
    Malformed(String),

    #[error("document has no table at index {0}")]
    NoSuchTable(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
