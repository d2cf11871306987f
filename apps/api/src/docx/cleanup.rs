//! Post-processing cleanup transforms.
//!
//! Every transform here is independently idempotent: running it against an
//! already-clean document changes nothing.

use crate::docx::document::{cell_text, paragraph_text, set_paragraph_text, visit_paragraphs_mut};
use crate::docx::xml::{Element, Node};
use crate::docx::DocxFile;

/// Row-emptiness rule for table cleanup.
///
/// The reference pipeline deletes rows with any empty cell; the stricter
/// all-cells-empty rule is kept for templates where partially filled rows
/// must survive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyRowRule {
    AllCellsEmpty,
    AnyCellEmpty,
}

/// Paragraph-leading markers that mark a hand-written bullet line.
const BULLET_MARKERS: [&str; 4] = ["- ", "\u{2013} ", "\u{2022} ", "* "];

/// Symbols normalized to a plain dash.
const DASH_SYMBOLS: [char; 5] = ['\u{2013}', '\u{2014}', '\u{2212}', '\u{2022}', '\u{25CF}'];

/// Residual artifacts stripped outright.
const STRIP_SYMBOLS: [char; 3] = ['*', '#', '\u{FFFD}'];

/// Converts hyphen-marker paragraphs into native bulleted paragraphs.
///
/// A paragraph whose text starts with a bullet marker loses the marker and
/// gets the `ListBullet` paragraph style. Already-normalized paragraphs no
/// longer start with a marker, so a second pass is a no-op. Returns the
/// number of paragraphs converted.
pub fn normalize_bullets(doc: &mut DocxFile) -> usize {
    let mut converted = 0;
    visit_paragraphs_mut(doc.body_mut(), &mut |p| {
        let text = paragraph_text(p);
        let trimmed = text.trim_start();
        let Some(marker) = BULLET_MARKERS.iter().find(|m| trimmed.starts_with(**m)) else {
            return;
        };
        let rest = trimmed[marker.len()..].trim_start().to_string();
        if rest.is_empty() {
            return;
        }
        set_paragraph_text(p, &rest);
        apply_bullet_style(p);
        converted += 1;
    });
    converted
}

/// Sets `w:pStyle w:val="ListBullet"` on the paragraph, creating `w:pPr`
/// when absent. `w:pPr` must be the first child, `w:pStyle` its first.
fn apply_bullet_style(p: &mut Element) {
    if p.first("w:pPr").is_none() {
        p.children.insert(0, Node::Element(Element::new("w:pPr")));
    }
    // first_mut returns the element inserted above when it was missing.
    if let Some(ppr) = p.first_mut("w:pPr") {
        if ppr.first("w:pStyle").is_none() {
            ppr.children
                .insert(0, Node::Element(Element::new("w:pStyle")));
        }
        if let Some(style) = ppr.first_mut("w:pStyle") {
            style.set_attr("w:val", "ListBullet");
        }
    }
}

/// Strips residual template artifacts from every text run and normalizes
/// dash-like symbols to `-`. Returns the number of runs changed.
pub fn scrub_symbols(doc: &mut DocxFile) -> usize {
    let mut changed = 0;
    doc.body_mut().visit_mut("w:t", &mut |t| {
        let original = t.inner_text();
        let cleaned: String = original
            .chars()
            .filter_map(|c| {
                if STRIP_SYMBOLS.contains(&c) {
                    None
                } else if c.is_control() && c != '\t' {
                    None
                } else if DASH_SYMBOLS.contains(&c) {
                    Some('-')
                } else {
                    Some(c)
                }
            })
            .collect();
        if cleaned != original {
            t.children = vec![Node::Text(cleaned)];
            changed += 1;
        }
    });
    changed
}

/// Deletes table rows matching the emptiness rule.
///
/// A cell is empty when its text is whitespace only. Rows that do not
/// match keep their content and order unchanged. Returns the number of
/// rows deleted.
pub fn delete_empty_rows(doc: &mut DocxFile, rule: EmptyRowRule) -> usize {
    let mut deleted = 0;
    for table in doc.tables_mut() {
        let before = table.children.len();
        table.children.retain(|n| match n {
            Node::Element(row) if row.name == "w:tr" => !row_matches_rule(row, rule),
            _ => true,
        });
        deleted += before - table.children.len();
    }
    deleted
}

fn row_matches_rule(row: &Element, rule: EmptyRowRule) -> bool {
    let cells: Vec<&Element> = row
        .child_elements()
        .filter(|e| e.name == "w:tc")
        .collect();
    if cells.is_empty() {
        // A row without cells is empty under either rule.
        return true;
    }
    let empty = |tc: &&Element| cell_text(tc).trim().is_empty();
    match rule {
        EmptyRowRule::AllCellsEmpty => cells.iter().all(empty),
        EmptyRowRule::AnyCellEmpty => cells.iter().any(empty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::fill::table_cell_texts;
    use crate::test_support::{docx_from_document_xml, para_xml, table_xml, wrap_document};

    fn doc_with(body: &str) -> DocxFile {
        DocxFile::from_bytes(&docx_from_document_xml(&wrap_document(body))).unwrap()
    }

    #[test]
    fn test_normalize_bullets_strips_marker_and_sets_style() {
        let mut doc = doc_with(&para_xml("- Led migration to Rust"));
        assert_eq!(normalize_bullets(&mut doc), 1);
        let p = doc.body().first("w:p").unwrap();
        assert_eq!(paragraph_text(p), "Led migration to Rust");
        let style = p
            .first("w:pPr")
            .and_then(|ppr| ppr.first("w:pStyle"))
            .and_then(|s| s.attr("w:val"));
        assert_eq!(style, Some("ListBullet"));
    }

    #[test]
    fn test_normalize_bullets_is_a_no_op_when_repeated() {
        let mut doc = doc_with(&para_xml("- Shipped a feature"));
        normalize_bullets(&mut doc);
        let first_pass = doc.document_text();
        assert_eq!(normalize_bullets(&mut doc), 0);
        assert_eq!(doc.document_text(), first_pass);
    }

    #[test]
    fn test_normalize_bullets_ignores_plain_paragraphs() {
        let mut doc = doc_with(&para_xml("A plain sentence - with a dash inside."));
        assert_eq!(normalize_bullets(&mut doc), 0);
    }

    #[test]
    fn test_normalize_bullets_ignores_bare_marker() {
        let mut doc = doc_with(&para_xml("- "));
        assert_eq!(normalize_bullets(&mut doc), 0);
    }

    #[test]
    fn test_scrub_symbols_strips_artifacts_and_normalizes_dashes() {
        let mut doc = doc_with(&para_xml("2016\u{2013}2020 *draft*\u{FFFD}"));
        assert!(scrub_symbols(&mut doc) > 0);
        assert_eq!(doc.document_text().trim(), "2016-2020 draft");
    }

    #[test]
    fn test_scrub_symbols_is_idempotent() {
        let mut doc = doc_with(&para_xml("already \u{2014} clean"));
        scrub_symbols(&mut doc);
        let first = doc.document_text();
        assert_eq!(scrub_symbols(&mut doc), 0);
        assert_eq!(doc.document_text(), first);
    }

    #[test]
    fn test_delete_rows_any_empty_cell() {
        let mut doc = doc_with(&table_xml(&[
            &["Degree", "Institution"],
            &["BSc", "X Univ"],
            &["MSc", ""],
            &["", ""],
        ]));
        let deleted = delete_empty_rows(&mut doc, EmptyRowRule::AnyCellEmpty);
        assert_eq!(deleted, 2);
        let cells = table_cell_texts(&doc, 0).unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[1], vec!["BSc", "X Univ"]);
    }

    #[test]
    fn test_delete_rows_all_cells_empty_keeps_partial_rows() {
        let mut doc = doc_with(&table_xml(&[
            &["Degree", "Institution"],
            &["MSc", ""],
            &["", ""],
        ]));
        let deleted = delete_empty_rows(&mut doc, EmptyRowRule::AllCellsEmpty);
        assert_eq!(deleted, 1);
        let cells = table_cell_texts(&doc, 0).unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[1], vec!["MSc", ""]);
    }

    #[test]
    fn test_delete_rows_leaves_other_rows_untouched() {
        let mut doc = doc_with(&table_xml(&[
            &["a", "b"],
            &["", ""],
            &["c", "d"],
        ]));
        delete_empty_rows(&mut doc, EmptyRowRule::AnyCellEmpty);
        let cells = table_cell_texts(&doc, 0).unwrap();
        assert_eq!(cells, vec![vec!["a", "b"], vec!["c", "d"]]);
    }
}
