//! Template filling: placeholder substitution and table population.
//!
//! Placeholders are matched against the concatenated run text of each
//! paragraph, so a token split across runs by the editor still matches.
//! Tables are populated positionally — the caller knows which column
//! carries which sub-field for each table of a template.

use tracing::warn;

use crate::docx::document::{
    cell_text, paragraph_text, set_cell_text, set_paragraph_text, visit_paragraphs_mut,
};
use crate::docx::xml::{Element, Node};
use crate::docx::{DocxError, DocxFile};

/// Replaces every occurrence of `token` in the document with `value`.
///
/// Paragraph-level: a paragraph whose joined text contains the token is
/// rewritten with the substituted text in its first run. Returns the
/// number of paragraphs touched. Substituting the same token twice with
/// the same value is a no-op the second time (the token is gone).
pub fn replace_placeholder(doc: &mut DocxFile, token: &str, value: &str) -> usize {
    let mut touched = 0;
    visit_paragraphs_mut(doc.body_mut(), &mut |p| {
        let text = paragraph_text(p);
        if text.contains(token) {
            set_paragraph_text(p, &text.replace(token, value));
            touched += 1;
        }
    });
    touched
}

/// Populates the table at `index` with one row per record.
///
/// `rows` carries the column values for each record in fixed positional
/// order. Data rows start after the header row when `has_header` is set.
/// The table grows by cloning its last row when records outnumber rows;
/// pre-existing surplus rows are left in place for the post-processor's
/// empty-row deletion.
pub fn fill_table_rows(
    doc: &mut DocxFile,
    index: usize,
    rows: &[Vec<String>],
    has_header: bool,
) -> Result<(), DocxError> {
    if rows.is_empty() {
        return Ok(());
    }
    let table = doc.table_mut(index)?;
    let start = usize::from(has_header);

    for (i, values) in rows.iter().enumerate() {
        let target = start + i;
        if table_row_count(table) <= target {
            append_cloned_row(table);
        }
        let Some(row) = table_row_mut(table, target) else {
            // A table with no rows at all cannot grow by cloning.
            warn!("table {index} has no row template to clone; dropping remaining records");
            return Ok(());
        };
        set_row_values(row, values);
    }
    Ok(())
}

pub fn table_row_count(table: &Element) -> usize {
    table.child_elements().filter(|e| e.name == "w:tr").count()
}

fn table_row_mut(table: &mut Element, index: usize) -> Option<&mut Element> {
    table
        .child_elements_mut()
        .filter(|e| e.name == "w:tr")
        .nth(index)
}

/// Appends a copy of the last row with all cell text cleared.
fn append_cloned_row(table: &mut Element) {
    let last = table
        .child_elements()
        .filter(|e| e.name == "w:tr")
        .last()
        .cloned();
    if let Some(mut row) = last {
        for cell in row.child_elements_mut().filter(|e| e.name == "w:tc") {
            set_cell_text(cell, "");
        }
        table.children.push(Node::Element(row));
    }
}

fn set_row_values(row: &mut Element, values: &[String]) {
    let cell_count = row.child_elements().filter(|e| e.name == "w:tc").count();
    if values.len() > cell_count {
        warn!(
            "row has {cell_count} cells, record has {} values; extra values dropped",
            values.len()
        );
    }
    for (i, cell) in row
        .child_elements_mut()
        .filter(|e| e.name == "w:tc")
        .enumerate()
    {
        if let Some(value) = values.get(i) {
            set_cell_text(cell, value);
        }
    }
}

/// Cell texts of every row of the table at `index`, for assertions and
/// post-fill inspection.
pub fn table_cell_texts(doc: &DocxFile, index: usize) -> Result<Vec<Vec<String>>, DocxError> {
    let table = doc
        .tables()
        .into_iter()
        .nth(index)
        .ok_or(DocxError::NoSuchTable(index))?;
    Ok(table
        .child_elements()
        .filter(|e| e.name == "w:tr")
        .map(|row| {
            row.child_elements()
                .filter(|e| e.name == "w:tc")
                .map(cell_text)
                .collect()
        })
        .collect())
}
