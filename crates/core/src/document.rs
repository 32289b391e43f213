//! Document-model plumbing over `lopdf`.
//!
//! Everything the pipeline needs from the object graph lives here:
//! ordered pages, consolidated content streams, annotations, the
//! AcroForm, the embedded fill font and the `TobRefs` side table that
//! records named object references for later value filling.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use crate::error::{FormError, Result};

/// Name of the catalog entry holding the engine's side table.
const SIDE_TABLE: &[u8] = b"TobRefs";

/// Page object ids in page order.
pub fn ordered_pages(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// The page's paintable content as one byte sequence. Pages split
/// over multiple stream fragments are concatenated in order, already
/// decompressed by the document library.
pub fn page_content(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>> {
    Ok(doc.get_page_content(page_id)?)
}

/// Replace the page's content with a single new stream.
///
/// The previous fragment objects are deleted from the object graph, so
/// a page that held its content in several fragments ends up with
/// exactly one.
pub fn set_page_content(doc: &mut Document, page_id: ObjectId, content: Vec<u8>) -> Result<()> {
    for old in doc.get_page_contents(page_id) {
        doc.objects.remove(&old);
    }
    let stream_id = doc.add_object(Object::Stream(Stream::new(dictionary! {}, content)));
    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page.set("Contents", Object::Reference(stream_id));
    Ok(())
}

/// Register an annotation dictionary and attach it to the page.
pub fn add_annotation(doc: &mut Document, page_id: ObjectId, annot: Dictionary) -> Result<ObjectId> {
    let annot_id = doc.add_object(Object::Dictionary(annot));
    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    match page.get_mut(b"Annots") {
        Ok(Object::Array(refs)) => refs.push(Object::Reference(annot_id)),
        _ => page.set("Annots", Object::Array(vec![Object::Reference(annot_id)])),
    }
    Ok(annot_id)
}

/// Detach an annotation from whichever page holds it and delete both
/// the annotation object and its appearance stream.
pub fn remove_annotation(doc: &mut Document, annot_id: ObjectId) -> Result<()> {
    let pages = ordered_pages(doc);
    for page_id in pages {
        let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
        if let Ok(Object::Array(refs)) = page.get_mut(b"Annots") {
            refs.retain(|r| *r != Object::Reference(annot_id));
        }
    }
    let ap_stream = doc
        .get_object(annot_id)
        .ok()
        .and_then(|a| a.as_dict().ok())
        .and_then(|a| a.get(b"AP").ok())
        .and_then(|ap| ap.as_dict().ok())
        .and_then(|ap| ap.get(b"N").ok())
        .and_then(|n| n.as_reference().ok());
    if let Some(n) = ap_stream {
        doc.objects.remove(&n);
    }
    doc.objects.remove(&annot_id);
    Ok(())
}

fn catalog_id(doc: &Document) -> Result<ObjectId> {
    Ok(doc.trailer.get(b"Root")?.as_reference()?)
}

fn catalog_mut(doc: &mut Document) -> Result<&mut Dictionary> {
    let root = catalog_id(doc)?;
    Ok(doc.get_object_mut(root)?.as_dict_mut()?)
}

/// Embed a TrueType font program and return the font object id. The
/// bytes are stored untouched; descriptor metrics are the nominal
/// Helvetica values the fill font ships with.
pub fn embed_truetype(doc: &mut Document, base_name: &str, bytes: &[u8]) -> ObjectId {
    let file_id = doc.add_object(Object::Stream(Stream::new(
        dictionary! { "Length1" => bytes.len() as i64 },
        bytes.to_vec(),
    )));
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => Object::Name(base_name.as_bytes().to_vec()),
        "Flags" => 32,
        "FontBBox" => Object::Array(vec![
            (-166).into(), (-225).into(), 1000.into(), 931.into(),
        ]),
        "ItalicAngle" => 0,
        "Ascent" => 718,
        "Descent" => -207,
        "CapHeight" => 718,
        "StemV" => 88,
        "FontFile2" => Object::Reference(file_id),
    });
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "TrueType",
        "BaseFont" => Object::Name(base_name.as_bytes().to_vec()),
        "FirstChar" => 32,
        "LastChar" => 255,
        "Encoding" => "WinAnsiEncoding",
        "FontDescriptor" => Object::Reference(descriptor_id),
    })
}

/// Create the interactive form dictionary, wiring the fill font into
/// its default resources under the name `Helv`.
pub fn create_acroform(doc: &mut Document, font_id: ObjectId) -> Result<ObjectId> {
    let acroform_id = doc.add_object(dictionary! {
        "Fields" => Object::Array(Vec::new()),
        "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
        "DR" => dictionary! {
            "Font" => dictionary! { "Helv" => Object::Reference(font_id) },
        },
        "NeedAppearances" => true,
    });
    catalog_mut(doc)?.set("AcroForm", Object::Reference(acroform_id));
    Ok(acroform_id)
}

fn acroform_id(doc: &Document) -> Result<ObjectId> {
    let root = catalog_id(doc)?;
    let catalog = doc.get_object(root)?.as_dict()?;
    let acroform = catalog
        .get(b"AcroForm")
        .map_err(|_| FormError::MalformedDocument("document has no interactive form".into()))?;
    Ok(acroform.as_reference()?)
}

/// Register a text-field widget on the page and in the form.
/// `quadding` is the /Q justification value (0 start, 1 center, 2 end).
pub fn add_text_field(
    doc: &mut Document,
    page_id: ObjectId,
    name: &str,
    rect: [f64; 4],
    quadding: i64,
) -> Result<ObjectId> {
    let form_id = acroform_id(doc)?;
    let field = dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Tx",
        "T" => Object::string_literal(name),
        "Rect" => Object::Array(rect.iter().map(|v| Object::Real(*v as f32)).collect()),
        "F" => 4,
        "Q" => quadding,
        "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
        "V" => Object::string_literal(""),
        "BS" => dictionary! { "W" => 0 },
    };
    let field_id = add_annotation(doc, page_id, field)?;
    let form = doc.get_object_mut(form_id)?.as_dict_mut()?;
    match form.get_mut(b"Fields") {
        Ok(Object::Array(fields)) => fields.push(Object::Reference(field_id)),
        _ => form.set("Fields", Object::Array(vec![Object::Reference(field_id)])),
    }
    Ok(field_id)
}

/// All form fields as (name, object id), in form order.
pub fn form_fields(doc: &Document) -> Result<Vec<(String, ObjectId)>> {
    let form_id = acroform_id(doc)?;
    let form = doc.get_object(form_id)?.as_dict()?;
    let mut out = Vec::new();
    if let Ok(fields) = form.get(b"Fields").and_then(Object::as_array) {
        for field_ref in fields {
            let id = field_ref.as_reference()?;
            let field = doc.get_object(id)?.as_dict()?;
            if let Ok(name) = field.get(b"T").and_then(Object::as_str) {
                out.push((String::from_utf8_lossy(name).into_owned(), id));
            }
        }
    }
    Ok(out)
}

/// Make the viewer regenerate field appearances on open.
pub fn set_need_appearances(doc: &mut Document) -> Result<()> {
    let form_id = acroform_id(doc)?;
    let form = doc.get_object_mut(form_id)?.as_dict_mut()?;
    form.set("NeedAppearances", true);
    Ok(())
}

/// Set a field's value, leaving appearance regeneration to the viewer
/// (the form's NeedAppearances flag stays set).
pub fn set_field_value(doc: &mut Document, field_id: ObjectId, value: &str) -> Result<()> {
    let field = doc.get_object_mut(field_id)?.as_dict_mut()?;
    field.set("V", Object::string_literal(value));
    field.remove(b"AP");
    Ok(())
}

/// Store the side table: the fill font plus the named strikethrough
/// references, so value filling can locate them without re-deriving
/// any geometry.
pub fn write_side_table(
    doc: &mut Document,
    font_id: ObjectId,
    strikethroughs: &[(String, ObjectId)],
) -> Result<()> {
    let mut strikes = Dictionary::new();
    for (name, id) in strikethroughs {
        strikes.set(name.as_bytes().to_vec(), Object::Reference(*id));
    }
    let table_id = doc.add_object(dictionary! {
        "Font" => Object::Reference(font_id),
        "Strikethrough" => Object::Dictionary(strikes),
    });
    catalog_mut(doc)?.set(SIDE_TABLE, Object::Reference(table_id));
    Ok(())
}

/// Look up a named strikethrough annotation in the side table.
pub fn strikethrough_ref(doc: &Document, name: &str) -> Result<ObjectId> {
    let root = catalog_id(doc)?;
    let catalog = doc.get_object(root)?.as_dict()?;
    let table_ref = catalog
        .get(SIDE_TABLE)
        .map_err(|_| FormError::MalformedDocument("document has no TobRefs side table".into()))?
        .as_reference()?;
    let table = doc.get_object(table_ref)?.as_dict()?;
    let strikes = table.get(b"Strikethrough")?.as_dict()?;
    let annot = strikes.get(name.as_bytes()).map_err(|_| {
        FormError::MalformedDocument(format!("no strikethrough named {name:?} in side table"))
    })?;
    Ok(annot.as_reference()?)
}

/// Set the document information dictionary.
pub fn set_info(doc: &mut Document, title: &str, author: &str, producer: &str, creator: &str) {
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(title),
        "Author" => Object::string_literal(author),
        "Producer" => Object::string_literal(producer),
        "Creator" => Object::string_literal(creator),
    });
    doc.trailer.set("Info", Object::Reference(info_id));
}
