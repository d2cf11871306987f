//! Passport-photo extraction and substitution for the photo template
//! variant.
//!
//! The source resume is turned into a page image (images directly, PDFs
//! rasterized through pdfium, DOCX via its largest embedded picture), a
//! passport-style region is located near the top of the page, and the crop
//! overwrites the template's placeholder picture part. Everything stays in
//! memory; a failure at any step skips the substitution with a warning and
//! never fails the file.

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat};
use pdfium_render::prelude::*;
use tracing::{debug, warn};

use crate::docx::document::RELS_PART;
use crate::docx::{xml, DocxFile};
use crate::extract::ResumeFormat;

/// Passport aspect ratio (35x45 mm), width over height.
const PASSPORT_ASPECT: f32 = 35.0 / 45.0;
/// Fraction of page width used for the candidate photo window.
const WINDOW_WIDTH_FRACTION: u32 = 6;

/// Minimum luma standard deviation for a window to count as a photo.
const MIN_PHOTO_STDDEV: f32 = 28.0;

/// Runs the full photo step against the output document.
/// Returns true when a substitution happened.
pub fn run_photo_step(doc: &mut DocxFile, format: ResumeFormat, source: &[u8]) -> bool {
    let Some(page) = page_image(format, source) else {
        warn!("photo step skipped: no page image could be produced");
        return false;
    };
    let photo = locate_passport_photo(&page);
    match substitute_placeholder_photo(doc, &photo) {
        Ok(true) => true,
        Ok(false) => {
            warn!("photo step skipped: template has no placeholder picture");
            false
        }
        Err(e) => {
            warn!("photo substitution failed: {e}");
            false
        }
    }
}

/// Produces a page image of the source resume, or None when the source
/// cannot be rasterized.
fn page_image(format: ResumeFormat, source: &[u8]) -> Option<DynamicImage> {
    match format {
        ResumeFormat::Jpeg | ResumeFormat::Png => image::load_from_memory(source)
            .map_err(|e| warn!("could not decode uploaded image: {e}"))
            .ok(),
        ResumeFormat::Pdf => render_pdf_first_page(source),
        ResumeFormat::Docx => largest_embedded_image(source),
    }
}

/// Rasterizes page 1 of a PDF at 1200px width.
/// Degrades to None when no pdfium library is installed.
fn render_pdf_first_page(bytes: &[u8]) -> Option<DynamicImage> {
    let bindings = Pdfium::bind_to_system_library()
        .map_err(|e| warn!("pdfium unavailable, photo step degraded: {e}"))
        .ok()?;
    let pdfium = Pdfium::new(bindings);
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| warn!("pdfium could not open PDF: {e}"))
        .ok()?;
    let page = document.pages().get(0).ok()?;
    let bitmap = page
        .render_with_config(&PdfRenderConfig::new().set_target_width(1200))
        .map_err(|e| warn!("pdfium render failed: {e}"))
        .ok()?;
    Some(bitmap.as_image())
}

/// The largest decodable picture embedded in a DOCX upload.
fn largest_embedded_image(bytes: &[u8]) -> Option<DynamicImage> {
    let doc = DocxFile::from_bytes(bytes)
        .map_err(|e| warn!("could not reopen DOCX for media scan: {e}"))
        .ok()?;
    let media_names: Vec<String> = doc
        .part_names()
        .filter(|n| n.starts_with("word/media/"))
        .map(str::to_string)
        .collect();

    let mut best: Option<DynamicImage> = None;
    for name in media_names {
        let Some(data) = doc.part(&name) else { continue };
        if let Ok(img) = image::load_from_memory(data) {
            let area = img.width() as u64 * img.height() as u64;
            let best_area = best
                .as_ref()
                .map(|b| b.width() as u64 * b.height() as u64)
                .unwrap_or(0);
            if area > best_area {
                best = Some(img);
            }
        }
    }
    best
}

/// Locates a passport-style photo region near the top of the page.
///
/// Scans passport-shaped windows across the top of the page and picks the
/// one with the highest luma variance (printed text blocks score lower
/// than a photograph). Falls back to a fixed top-right crop when nothing
/// crosses the threshold, so the step stays deterministic.
pub fn locate_passport_photo(page: &DynamicImage) -> DynamicImage {
    let (w, h) = page.dimensions();
    let win_w = (w / WINDOW_WIDTH_FRACTION).max(48).min(w);
    let win_h = ((win_w as f32 / PASSPORT_ASPECT) as u32).max(48).min(h);
    // Photos sit in the header block; only the top 2/5 of the page is scanned.
    let scan_h = (h * 2 / 5).max(win_h).min(h);

    let gray = page.to_luma8();
    let stride = (win_w / 2).max(1);

    let mut best: Option<(f32, u32, u32)> = None;
    let mut y = 0;
    while y + win_h <= scan_h {
        let mut x = 0;
        while x + win_w <= w {
            let score = luma_stddev(&gray, x, y, win_w, win_h);
            if best.map(|(s, _, _)| score > s).unwrap_or(true) {
                best = Some((score, x, y));
            }
            x += stride;
        }
        y += stride;
    }

    match best {
        Some((score, x, y)) if score >= MIN_PHOTO_STDDEV => {
            debug!("photo window found at ({x},{y}) stddev {score:.1}");
            page.crop_imm(x, y, win_w, win_h)
        }
        _ => {
            debug!("no photo-like region found; using top-right fallback crop");
            let x = w.saturating_sub(win_w);
            page.crop_imm(x, 0, win_w, win_h)
        }
    }
}

/// Standard deviation of luma over a window, sampled on a 4px grid.
fn luma_stddev(
    gray: &image::GrayImage,
    x0: u32,
    y0: u32,
    w: u32,
    h: u32,
) -> f32 {
    let mut sum = 0f64;
    let mut sum_sq = 0f64;
    let mut n = 0f64;
    let mut y = y0;
    while y < y0 + h {
        let mut x = x0;
        while x < x0 + w {
            let v = gray.get_pixel(x, y).0[0] as f64;
            sum += v;
            sum_sq += v * v;
            n += 1.0;
            x += 4;
        }
        y += 4;
    }
    if n == 0.0 {
        return 0.0;
    }
    let mean = sum / n;
    ((sum_sq / n - mean * mean).max(0.0)).sqrt() as f32
}

/// Overwrites the designated placeholder picture part with the photo.
///
/// The placeholder is the first picture referenced by the document body
/// (`a:blip r:embed`), resolved to its media part through the relationship
/// table. The crop is encoded to match the part's extension so the
/// content-type declaration stays truthful.
pub fn substitute_placeholder_photo(
    doc: &mut DocxFile,
    photo: &DynamicImage,
) -> Result<bool, crate::docx::DocxError> {
    // First blip in document order is the designated placeholder.
    let embed_id = doc
        .body()
        .descendants("a:blip")
        .iter()
        .find_map(|blip| blip.attr("r:embed"))
        .map(str::to_string);

    let Some(rels_bytes) = doc.part(RELS_PART) else {
        return Ok(false);
    };
    let rels = xml::parse(&String::from_utf8_lossy(rels_bytes))?;

    let target = rels
        .descendants("Relationship")
        .iter()
        .filter(|rel| {
            rel.attr("Type")
                .map(|t| t.ends_with("/image"))
                .unwrap_or(false)
        })
        .find(|rel| match &embed_id {
            Some(id) => rel.attr("Id") == Some(id.as_str()),
            None => true,
        })
        .and_then(|rel| rel.attr("Target"))
        .map(str::to_string);

    let Some(target) = target else {
        return Ok(false);
    };

    let part_name = format!("word/{}", target.trim_start_matches("./"));
    let format = if part_name.ends_with(".png") {
        ImageFormat::Png
    } else {
        ImageFormat::Jpeg
    };

    let mut encoded = Cursor::new(Vec::new());
    // Jpeg cannot encode alpha; flatten first.
    let flat = DynamicImage::ImageRgb8(photo.to_rgb8());
    flat.write_to(&mut encoded, format)
        .map_err(|e| crate::docx::DocxError::Malformed(format!("photo encode failed: {e}")))?;

    match doc.part_mut(&part_name) {
        Some(data) => {
            *data = encoded.into_inner();
            debug!("substituted passport photo into {part_name}");
            Ok(true)
        }
        None => Ok(false),
    }
}
