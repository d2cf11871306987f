//! Shared test fixtures: a canned oracle and in-memory DOCX builders.
//! Compiled only for tests.

use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::oracle::{Oracle, OracleError};

// ────────────────────────────────────────────────────────────────────────────
// Canned oracle
// ────────────────────────────────────────────────────────────────────────────

/// An oracle that answers by prompt substring matching. Unmatched prompts
/// answer with an empty string; needles registered as failing return an
/// error instead.
#[derive(Default)]
pub struct StaticOracle {
    responses: Vec<(&'static str, String)>,
    failing: Vec<&'static str>,
    fail_all: bool,
    image_response: Option<String>,
    fail_images: bool,
    calls: AtomicU32,
}

impl StaticOracle {
    pub fn on(mut self, needle: &'static str, response: &str) -> Self {
        self.responses.push((needle, response.to_string()));
        self
    }

    pub fn failing_on(mut self, needle: &'static str) -> Self {
        self.failing.push(needle);
        self
    }

    pub fn failing_all(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub fn with_image_response(mut self, response: &str) -> Self {
        self.image_response = Some(response.to_string());
        self
    }

    pub fn failing_images(mut self) -> Self {
        self.fail_images = true;
        self
    }

    /// Number of completion calls made (text and image).
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Oracle for StaticOracle {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all || self.failing.iter().any(|n| prompt.contains(n)) {
            return Err(OracleError::EmptyContent);
        }
        Ok(self
            .responses
            .iter()
            .find(|(needle, _)| prompt.contains(needle))
            .map(|(_, response)| response.clone())
            .unwrap_or_default())
    }

    async fn complete_with_image(
        &self,
        _prompt: &str,
        _mime: &str,
        _image: &[u8],
    ) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all || self.fail_images {
            return Err(OracleError::EmptyContent);
        }
        Ok(self.image_response.clone().unwrap_or_default())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// DOCX builders
// ────────────────────────────────────────────────────────────────────────────

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// A single paragraph with one run.
pub fn para_xml(text: &str) -> String {
    if text.is_empty() {
        "<w:p/>".to_string()
    } else {
        format!(
            r#"<w:p><w:r><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#
        )
    }
}

/// A table; each inner slice is one row of cell texts.
pub fn table_xml(rows: &[&[&str]]) -> String {
    let mut out = String::from("<w:tbl>");
    for row in rows {
        out.push_str("<w:tr>");
        for cell in *row {
            out.push_str("<w:tc>");
            out.push_str(&para_xml(cell));
            out.push_str("</w:tc>");
        }
        out.push_str("</w:tr>");
    }
    out.push_str("</w:tbl>");
    out
}

/// Wraps body blocks into a full `word/document.xml`.
pub fn wrap_document(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    )
}

/// Packs a `word/document.xml` into a minimal DOCX container.
pub fn docx_from_document_xml(document_xml: &str) -> Vec<u8> {
    build_docx(&[
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes().to_vec()),
        ("_rels/.rels", ROOT_RELS.as_bytes().to_vec()),
        ("word/document.xml", document_xml.as_bytes().to_vec()),
    ])
}

fn build_docx(parts: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, data) in parts {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// The internal template fixture: name/summary/certification placeholders,
/// an education table (header + three blank rows), a skills table
/// (header + one blank row), and an experience table (header + one blank
/// row).
pub fn internal_template_bytes() -> Vec<u8> {
    let body = format!(
        "{}{}{}{}{}{}{}{}",
        para_xml("{{NAME}}"),
        para_xml("Professional Summary"),
        para_xml("{{SUMMARY}}"),
        para_xml("Certifications"),
        para_xml("{{CERTIFICATIONS}}"),
        table_xml(&[
            &["Degree", "Institution", "Years"],
            &["", "", ""],
            &["", "", ""],
            &["", "", ""],
        ]),
        table_xml(&[&["Technical Skills"], &[""]]),
        table_xml(&[
            &["Organization", "Role", "Duration"],
            &["", "", ""],
        ]),
    );
    docx_from_document_xml(&wrap_document(&body))
}

/// The client-with-photo template fixture: name/summary placeholders, a
/// skills table, an education table, an experience table, and one
/// embedded placeholder picture.
pub fn client_photo_template_bytes() -> Vec<u8> {
    let body = format!(
        "{}{}{}{}{}{}",
        para_xml("{{NAME}}"),
        r#"<w:p><w:r><w:drawing><wp:inline><a:graphic><a:graphicData><pic:pic><pic:blipFill><a:blip r:embed="rId4"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#,
        para_xml("{{SUMMARY}}"),
        table_xml(&[&["Technical Skills"], &[""]]),
        table_xml(&[
            &["Degree", "Institution", "Years"],
            &["", "", ""],
        ]),
        table_xml(&[
            &["Organization", "Role", "Duration"],
            &["", "", ""],
        ]),
    );
    let document_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/></Relationships>"#;

    build_docx(&[
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes().to_vec()),
        ("_rels/.rels", ROOT_RELS.as_bytes().to_vec()),
        ("word/document.xml", wrap_document(&body).into_bytes()),
        (
            "word/_rels/document.xml.rels",
            document_rels.as_bytes().to_vec(),
        ),
        ("word/media/image1.png", solid_png(40, 50)),
    ])
}

/// A small DOCX resume used as pipeline input.
pub fn resume_docx_bytes() -> Vec<u8> {
    let body = format!(
        "{}{}{}{}",
        para_xml("Jane Doe"),
        para_xml("BSc, X Univ, 2016-2020"),
        para_xml("MSc, Y Univ, 2020-2022"),
        para_xml("Skills: Python, SQL"),
    );
    docx_from_document_xml(&wrap_document(&body))
}

/// A solid-color PNG of the given size.
pub fn solid_png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(w, h, image::Rgb([120, 140, 160]));
    let mut cursor = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut cursor, image::ImageFormat::Png)
        .unwrap();
    cursor.into_inner()
}

/// A DOCX whose body references one embedded picture — the placeholder
/// the photo step substitutes.
pub fn docx_with_placeholder_image() -> Vec<u8> {
    let body = format!(
        "{}{}",
        para_xml("Candidate"),
        r#"<w:p><w:r><w:drawing><wp:inline><a:graphic><a:graphicData><pic:pic><pic:blipFill><a:blip r:embed="rId4"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#,
    );
    let document_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/></Relationships>"#;

    build_docx(&[
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes().to_vec()),
        ("_rels/.rels", ROOT_RELS.as_bytes().to_vec()),
        (
            "word/document.xml",
            wrap_document(&body).into_bytes(),
        ),
        (
            "word/_rels/document.xml.rels",
            document_rels.as_bytes().to_vec(),
        ),
        ("word/media/image1.png", solid_png(40, 50)),
    ])
}
