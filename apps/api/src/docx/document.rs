//! OPC container handling and WordprocessingML accessors.
//!
//! All parts of the ZIP are held as raw bytes in their original order;
//! only `word/document.xml` is parsed into an element tree. Saving
//! serializes the tree back and rewrites the container in one pass.

use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::docx::xml::{self, Element, Node};
use crate::docx::DocxError;

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const RELS_PART: &str = "word/_rels/document.xml.rels";

/// An open DOCX document: container parts plus the parsed body tree.
pub struct DocxFile {
    /// Every part except `word/document.xml`, in original archive order.
    parts: Vec<(String, Vec<u8>)>,
    /// Parsed root of `word/document.xml` (`<w:document>`).
    root: Element,
}

impl DocxFile {
    pub fn open(path: &Path) -> Result<Self, DocxError> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocxError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(archive.len());
        let mut document_xml: Option<String> = None;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_string();
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            if name == DOCUMENT_PART {
                document_xml = Some(String::from_utf8_lossy(&data).into_owned());
            } else {
                parts.push((name, data));
            }
        }

        let document_xml = document_xml
            .ok_or_else(|| DocxError::Malformed(format!("missing {DOCUMENT_PART}")))?;
        let root = xml::parse(&document_xml)?;
        if root.first("w:body").is_none() {
            return Err(DocxError::Malformed("document has no w:body".to_string()));
        }

        Ok(DocxFile { parts, root })
    }

    pub fn save(&self, path: &Path) -> Result<(), DocxError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        writer.start_file(DOCUMENT_PART, options)?;
        writer.write_all(xml::serialize(&self.root)?.as_bytes())?;

        for (name, data) in &self.parts {
            writer.start_file(name.as_str(), options)?;
            writer.write_all(data)?;
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }

    pub fn part_mut(&mut self, name: &str) -> Option<&mut Vec<u8>> {
        self.parts
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data)
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(n, _)| n.as_str())
    }

    /// The `<w:body>` element. Validated present at open time.
    pub fn body(&self) -> &Element {
        // Presence checked in from_bytes; an empty sentinel keeps this total.
        static EMPTY: Element = Element {
            name: String::new(),
            attrs: Vec::new(),
            children: Vec::new(),
        };
        self.root.first("w:body").unwrap_or(&EMPTY)
    }

    pub fn body_mut(&mut self) -> &mut Element {
        // Presence checked in from_bytes.
        let idx = self
            .root
            .position_of("w:body")
            .unwrap_or(usize::MAX);
        match self.root.children.get_mut(idx) {
            Some(Node::Element(el)) => el,
            _ => unreachable!("w:body validated at open"),
        }
    }

    /// Plain text of the whole document: paragraphs and table cells in
    /// document order. Cells are tab-separated within a row, rows and
    /// paragraphs newline-separated.
    pub fn document_text(&self) -> String {
        let mut out = String::new();
        for block in self.body().child_elements() {
            match block.name.as_str() {
                "w:p" => {
                    let text = paragraph_text(block);
                    if !text.trim().is_empty() {
                        out.push_str(&text);
                        out.push('\n');
                    }
                }
                "w:tbl" => {
                    for row in block.descendants("w:tr") {
                        let cells: Vec<String> = row
                            .descendants("w:tc")
                            .iter()
                            .map(|tc| cell_text(tc))
                            .collect();
                        let line = cells.join("\t");
                        if !line.trim().is_empty() {
                            out.push_str(&line);
                            out.push('\n');
                        }
                    }
                }
                _ => {}
            }
        }
        out
    }

    /// Top-level tables of the body, in document order.
    pub fn tables(&self) -> Vec<&Element> {
        self.body()
            .child_elements()
            .filter(|e| e.name == "w:tbl")
            .collect()
    }

    pub fn tables_mut(&mut self) -> Vec<&mut Element> {
        self.body_mut()
            .child_elements_mut()
            .filter(|e| e.name == "w:tbl")
            .collect()
    }

    pub fn table_mut(&mut self, index: usize) -> Result<&mut Element, DocxError> {
        self.tables_mut()
            .into_iter()
            .nth(index)
            .ok_or(DocxError::NoSuchTable(index))
    }
}

/// Concatenated run text of a paragraph, with `<w:br/>` rendered as `\n`.
pub fn paragraph_text(p: &Element) -> String {
    let mut out = String::new();
    gather_paragraph_text(p, &mut out);
    out
}

fn gather_paragraph_text(el: &Element, out: &mut String) {
    for node in &el.children {
        if let Node::Element(child) = node {
            match child.name.as_str() {
                "w:t" => out.push_str(&child.inner_text()),
                "w:br" => out.push('\n'),
                "w:tab" => out.push('\t'),
                _ => gather_paragraph_text(child, out),
            }
        }
    }
}

/// Text of a table cell: its paragraphs joined by newlines.
pub fn cell_text(tc: &Element) -> String {
    tc.child_elements()
        .filter(|e| e.name == "w:p")
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rewrites a paragraph to carry exactly the given text.
///
/// The first run keeps its `w:rPr` formatting and receives the text; all
/// other runs are removed. Newlines in the value become `<w:br/>` elements
/// (a literal newline inside `w:t` does not render as a break in Word).
pub fn set_paragraph_text(p: &mut Element, text: &str) {
    // Drop every run but the first.
    let mut seen_first = false;
    p.children.retain(|n| match n {
        Node::Element(e) if e.name == "w:r" => {
            if seen_first {
                false
            } else {
                seen_first = true;
                true
            }
        }
        _ => true,
    });

    if p.first("w:r").is_none() {
        p.children.push(Node::Element(Element::new("w:r")));
    }
    let Some(run) = p.first_mut("w:r") else { return };

    // Keep run properties, replace content.
    run.children.retain(|n| match n {
        Node::Element(e) => e.name == "w:rPr",
        Node::Text(_) => false,
    });

    let mut lines = text.split('\n').peekable();
    while let Some(line) = lines.next() {
        run.children.push(Node::Element(
            Element::new("w:t")
                .with_attr("xml:space", "preserve")
                .with_text(line),
        ));
        if lines.peek().is_some() {
            run.children.push(Node::Element(Element::new("w:br")));
        }
    }
}

/// Rewrites a table cell to carry exactly the given text.
///
/// The first paragraph is rewritten in place (keeping its properties);
/// extra paragraphs are removed. A `w:tc` must keep at least one `w:p`.
pub fn set_cell_text(tc: &mut Element, text: &str) {
    let mut seen_first = false;
    tc.children.retain(|n| match n {
        Node::Element(e) if e.name == "w:p" => {
            if seen_first {
                false
            } else {
                seen_first = true;
                true
            }
        }
        _ => true,
    });

    if tc.first("w:p").is_none() {
        tc.children.push(Node::Element(Element::new("w:p")));
    }
    if let Some(p) = tc.first_mut("w:p") {
        set_paragraph_text(p, text);
    }
}

/// Visits every paragraph in the body, including paragraphs inside table
/// cells, allowing mutation.
pub fn visit_paragraphs_mut(body: &mut Element, f: &mut impl FnMut(&mut Element)) {
    body.visit_mut("w:p", f);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{docx_from_document_xml, para_xml, table_xml, wrap_document};

    #[test]
    fn test_open_requires_document_part() {
        // A zip without word/document.xml is not a DOCX.
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("hello.txt", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"hi").unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        assert!(DocxFile::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_document_text_covers_paragraphs_and_tables() {
        let xml = wrap_document(&format!(
            "{}{}",
            para_xml("Jane Doe"),
            table_xml(&[&["Degree", "Institution"], &["BSc", "X Univ"]])
        ));
        let doc = DocxFile::from_bytes(&docx_from_document_xml(&xml)).unwrap();
        let text = doc.document_text();
        assert!(text.contains("Jane Doe"));
        assert!(text.contains("BSc\tX Univ"));
    }

    #[test]
    fn test_save_round_trips_container() {
        let xml = wrap_document(&para_xml("Round trip"));
        let doc = DocxFile::from_bytes(&docx_from_document_xml(&xml)).unwrap();
        let bytes = doc.to_bytes().unwrap();
        let again = DocxFile::from_bytes(&bytes).unwrap();
        assert!(again.document_text().contains("Round trip"));
        // Non-document parts survive untouched.
        assert!(again.part("[Content_Types].xml").is_some());
    }

    #[test]
    fn test_set_paragraph_text_replaces_all_runs() {
        let xml = wrap_document(
            "<w:p><w:r><w:t>old</w:t></w:r><w:r><w:t> runs</w:t></w:r></w:p>",
        );
        let mut doc = DocxFile::from_bytes(&docx_from_document_xml(&xml)).unwrap();
        let body = doc.body_mut();
        let p = body.first_mut("w:p").unwrap();
        set_paragraph_text(p, "new text");
        assert_eq!(paragraph_text(body.first("w:p").unwrap()), "new text");
    }

    #[test]
    fn test_set_paragraph_text_renders_newlines_as_breaks() {
        let xml = wrap_document(para_xml("x").as_str());
        let mut doc = DocxFile::from_bytes(&docx_from_document_xml(&xml)).unwrap();
        let p = doc.body_mut().first_mut("w:p").unwrap();
        set_paragraph_text(p, "line one\nline two");
        let p = doc.body().first("w:p").unwrap();
        assert_eq!(p.descendants("w:br").len(), 1);
        assert_eq!(paragraph_text(p), "line one\nline two");
    }

    #[test]
    fn test_tables_are_top_level_only() {
        let xml = wrap_document(&format!(
            "{}{}",
            table_xml(&[&["a"]]),
            table_xml(&[&["b"]])
        ));
        let doc = DocxFile::from_bytes(&docx_from_document_xml(&xml)).unwrap();
        assert_eq!(doc.tables().len(), 2);
    }
}
