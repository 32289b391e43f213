//! Applies a modification table to a loaded template document.
//!
//! Two stages, matching the two artifacts the generator writes: first
//! [`blank_template`] rewrites the page content streams (dropping
//! pre-printed fill text and making room), then [`create_form`]
//! synthesizes the interactive form fields and strikethrough
//! annotations over the blanked pages.

use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use tracing::debug;

use crate::document;
use crate::error::{FormError, Result};
use crate::geometry::{Point, Rgb, StrikeGeometry, strike_geometry};
use crate::glyphs::apply_substitutions;
use crate::parser::{extract_blocks, last_shown_text, rewrite_blocks, strip_shown_text};
use crate::template::{Language, PageMods, SetText, TemplateMods};

/// Rewrite the document's content streams per the modification table.
///
/// All block indices in the table refer to the page's original block
/// numbering; removals never shift the indices later entries see. A
/// table entry referring past the last block fails with
/// [`FormError::StructuralMismatch`] before anything is written.
pub fn blank_template(doc: &mut Document, mods: &TemplateMods, lang: Language) -> Result<()> {
    for (page, page_id) in document::ordered_pages(doc).into_iter().enumerate() {
        let Some(page_mods) = mods.pages.get(&page) else {
            continue;
        };
        if !page_mods.rewrites_content() {
            continue;
        }
        let content = document::page_content(doc, page_id)?;
        let blocks = extract_blocks(&content);
        if let Some(max) = page_mods.max_block_index() {
            if max >= blocks.len() {
                return Err(FormError::StructuralMismatch {
                    lang: lang.to_string(),
                    page,
                    index: max,
                    count: blocks.len(),
                });
            }
        }
        // Active text per original block, captured before the rewrite
        // so set-text entries can copy from blocks that are themselves
        // modified or removed in the same pass.
        let texts: Vec<String> = blocks
            .iter()
            .map(|b| last_shown_text(&b.body).unwrap_or_default())
            .collect();

        let rewritten = rewrite_blocks(&content, |body, i| {
            rewrite_block(body, i, page_mods, &texts)
        })?;
        debug!(
            %lang,
            page,
            blocks = blocks.len(),
            removed = page_mods.remove_text.len(),
            set = page_mods.set_text.len(),
            replaced = page_mods.replace_text.len(),
            "rewrote page content"
        );
        document::set_page_content(doc, page_id, rewritten)?;
    }
    Ok(())
}

/// Apply the remove, set-text and replace-text entries for one block,
/// in that order. An emptied block is dropped entirely.
fn rewrite_block(
    body: &str,
    index: usize,
    page_mods: &PageMods,
    texts: &[String],
) -> Result<Option<String>> {
    let mut block = body.to_string();
    if page_mods.remove_text.contains(&index) {
        block.clear();
    }
    if let Some(set) = page_mods.set_text.get(&index) {
        let text = match set {
            SetText::Literal(text) => text.clone(),
            SetText::FromBlock(source) => texts[*source].clone(),
        };
        if text.is_empty() {
            block.clear();
        } else {
            // Keep the positioning operators, swap the shown text.
            let kept = strip_shown_text(&block);
            block = format!("{}\n[{text}] TJ", kept.trim());
        }
    }
    if let Some(subs) = page_mods.replace_text.get(&index) {
        block = apply_substitutions(&block, subs)?;
    }
    let trimmed = block.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

/// Synthesize form fields and strikethrough annotations per the
/// modification table, embed the fill font, record everything in the
/// catalog side table and set the document metadata.
pub fn create_form(doc: &mut Document, mods: &TemplateMods, font_bytes: &[u8]) -> Result<()> {
    let font_id = document::embed_truetype(doc, "Helvetica", font_bytes);
    document::create_acroform(doc, font_id)?;

    let mut strike_refs = Vec::new();
    for (page, page_id) in document::ordered_pages(doc).into_iter().enumerate() {
        let Some(page_mods) = mods.pages.get(&page) else {
            continue;
        };
        for (name, placement) in &page_mods.text_fields {
            document::add_text_field(
                doc,
                page_id,
                name,
                placement.rect(),
                placement.alignment.quadding(),
            )?;
        }
        for (name, placement) in &page_mods.strikethroughs {
            let geometry = strike_geometry(
                Point {
                    x: placement.x,
                    y: placement.y,
                },
                placement.length,
                placement.thickness,
            )?;
            let ap_id = appearance_stream(doc, &geometry, placement.thickness, placement.color);
            let annot = dictionary! {
                "Type" => "Annot",
                "Subtype" => "StrikeOut",
                "Rect" => real_array(&geometry.bbox),
                "QuadPoints" => real_array(&geometry.quad_points),
                "P" => Object::Reference(page_id),
                "F" => 4,
                "C" => real_array(&[placement.color.r, placement.color.g, placement.color.b]),
                "AP" => dictionary! { "N" => Object::Reference(ap_id) },
            };
            let annot_id = document::add_annotation(doc, page_id, annot)?;
            strike_refs.push((name.clone(), annot_id));
        }
        debug!(
            page,
            fields = page_mods.text_fields.len(),
            strikethroughs = page_mods.strikethroughs.len(),
            "synthesized form objects"
        );
    }

    document::write_side_table(doc, font_id, &strike_refs)?;
    document::set_info(
        doc,
        &mods.meta.title,
        &mods.meta.author,
        &mods.meta.producer,
        &mods.meta.creator,
    );
    Ok(())
}

/// Register the annotation's appearance: a form XObject stroking the
/// line, translated so the bounding box corner is its origin.
fn appearance_stream(
    doc: &mut Document,
    geometry: &StrikeGeometry,
    thickness: f64,
    color: Rgb,
) -> ObjectId {
    let body = geometry.appearance_body(thickness, color);
    let stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "FormType" => 1,
            "BBox" => real_array(&geometry.bbox),
            "Matrix" => real_array(&geometry.matrix()),
        },
        body.into_bytes(),
    );
    doc.add_object(Object::Stream(stream))
}

fn real_array(values: &[f64]) -> Object {
    Object::Array(values.iter().map(|v| Object::Real(*v as f32)).collect())
}
