//! Template pipeline and form filling against an in-memory document.

use std::collections::BTreeMap;

use lopdf::{Document, Object, Stream, dictionary};

use tobform_core::document::{form_fields, ordered_pages, page_content, strikethrough_ref};
use tobform_core::error::FormError;
use tobform_core::fill::{Declarant, FillValues, fill_template};
use tobform_core::geometry::Rgb;
use tobform_core::glyphs::{DOT, SubstKey, Substitutions};
use tobform_core::parser::extract_blocks;
use tobform_core::template::{
    DocMeta, FieldPlacement, Language, PageMods, SetText, StrikePlacement, TemplateMods,
    TextAlignment, blank_template, create_form,
};

/// One page, four text blocks, one path-drawing operator between them.
const CONTENT: &str = "q\nBT\n1 0 0 1 56 700 Tm\n[<0024>] TJ\nET\nBT\n[<0025>] TJ\nET\n100 200 m 300 200 l S\nBT\n[<00110011><0030>] TJ\nET\nBT\n1 0 0 1 56 600 Tm\n[<0026>] TJ\nET\nQ";

fn test_doc(content: &str) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Object::Stream(Stream::new(
        dictionary! {},
        content.as_bytes().to_vec(),
    )));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => Object::Reference(pages_id),
        "MediaBox" => Object::Array(vec![0.into(), 0.into(), 595.into(), 842.into()]),
        "Contents" => Object::Reference(content_id),
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => Object::Array(vec![Object::Reference(page_id)]),
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc
}

fn test_mods() -> TemplateMods {
    let mut page = PageMods::default();
    page.remove_text.insert(1);
    page.replace_text.insert(
        2,
        Substitutions::new(vec![(SubstKey::Code(DOT), String::new())]),
    );
    page.set_text.insert(3, SetText::FromBlock(0));
    page.text_fields.push((
        "full_name".to_string(),
        FieldPlacement {
            x: 300.0,
            y: 534.0,
            width: 225.0,
            height: 17.0,
            alignment: TextAlignment::Start,
        },
    ));
    page.text_fields.push((
        "total_tax_value".to_string(),
        FieldPlacement {
            x: 332.0,
            y: 313.0,
            width: 125.0,
            height: 17.0,
            alignment: TextAlignment::End,
        },
    ));
    page.strikethroughs.push((
        "inst".to_string(),
        StrikePlacement {
            x: 305.0,
            y: 610.0,
            length: 62.0,
            thickness: 0.72,
            color: Rgb::new(0.898, 0.133, 0.216),
        },
    ));
    TemplateMods {
        pages: BTreeMap::from([(0, page)]),
        meta: DocMeta {
            title: "Test declaration".to_string(),
            author: "tobform".to_string(),
            producer: "tobform".to_string(),
            creator: "tobform".to_string(),
        },
    }
}

#[test]
fn blanking_applies_remove_set_and_replace() {
    let mut doc = test_doc(CONTENT);
    blank_template(&mut doc, &test_mods(), Language::En).unwrap();

    let page_id = ordered_pages(&doc)[0];
    let content = page_content(&doc, page_id).unwrap();
    let blocks = extract_blocks(&content);
    assert_eq!(blocks.len(), 3);
    // block 0 untouched
    assert!(blocks[0].text().contains("[<0024>] TJ"));
    // block 2: dots substituted away
    assert_eq!(blocks[1].text(), "[<0030>] TJ");
    // block 3: positioning kept, text copied from block 0
    assert!(blocks[2].text().contains("1 0 0 1 56 600 Tm"));
    assert!(blocks[2].text().contains("[<0024>] TJ"));
    // the path between blocks survives
    let text = String::from_utf8_lossy(&content);
    assert!(text.contains("100 200 m 300 200 l S"));
}

#[test]
fn removing_and_substituting_on_a_two_block_page() {
    let content = "BT\n[<0024>] TJ\nET\nBT\n[<0011>-12<0030>-7] TJ\nET";
    let mut doc = test_doc(content);
    let mut page = PageMods::default();
    page.remove_text.insert(0);
    page.replace_text.insert(
        1,
        Substitutions::new(vec![(SubstKey::Seq(0), String::new())]),
    );
    let mods = TemplateMods {
        pages: BTreeMap::from([(0, page)]),
        meta: test_mods().meta,
    };
    blank_template(&mut doc, &mods, Language::Nl).unwrap();

    let page_id = ordered_pages(&doc)[0];
    let content = page_content(&doc, page_id).unwrap();
    let blocks = extract_blocks(&content);
    assert_eq!(blocks.len(), 1);
    // the dot run collapsed with its offset; the rest is untouched
    assert_eq!(blocks[0].text(), "[<0030>-7] TJ");
}

#[test]
fn out_of_range_index_is_a_structural_mismatch() {
    let mut doc = test_doc(CONTENT);
    let mut mods = test_mods();
    mods.pages.get_mut(&0).unwrap().remove_text.insert(99);
    let err = blank_template(&mut doc, &mods, Language::De).unwrap_err();
    match err {
        FormError::StructuralMismatch {
            lang,
            page,
            index,
            count,
        } => {
            assert_eq!(lang, "DE");
            assert_eq!(page, 0);
            assert_eq!(index, 99);
            assert_eq!(count, 4);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn create_form_registers_fields_and_strikethroughs() {
    let mut doc = test_doc(CONTENT);
    let mods = test_mods();
    blank_template(&mut doc, &mods, Language::En).unwrap();
    create_form(&mut doc, &mods, b"\x00\x01\x00\x00fake-font").unwrap();

    let names: Vec<String> = form_fields(&doc)
        .unwrap()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, ["full_name", "total_tax_value"]);

    let strike_id = strikethrough_ref(&doc, "inst").unwrap();
    let annot = doc.get_object(strike_id).unwrap().as_dict().unwrap();
    assert_eq!(annot.get(b"Subtype").unwrap().as_name().unwrap(), b"StrikeOut");
    let quads = annot.get(b"QuadPoints").unwrap().as_array().unwrap();
    assert_eq!(quads.len(), 8);

    assert!(strikethrough_ref(&doc, "prof").is_err());
}

fn blank_form_bytes() -> Vec<u8> {
    let mut doc = test_doc(CONTENT);
    let mods = test_mods();
    blank_template(&mut doc, &mods, Language::En).unwrap();
    create_form(&mut doc, &mods, b"\x00\x01\x00\x00fake-font").unwrap();
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

#[test]
fn filling_sets_values_and_removes_the_strikethrough() {
    let blank = blank_form_bytes();
    let values = FillValues {
        fields: BTreeMap::from([
            ("full_name".to_string(), "John Doe".to_string()),
            ("total_tax_value".to_string(), "€ 17,90".to_string()),
        ]),
        declarant: Some(Declarant::Inst),
    };
    let filled = fill_template(&blank, &values).unwrap();

    let doc = Document::load_mem(&filled).unwrap();
    let fields: BTreeMap<String, lopdf::ObjectId> =
        form_fields(&doc).unwrap().into_iter().collect();
    let name_field = doc
        .get_object(fields["full_name"])
        .unwrap()
        .as_dict()
        .unwrap();
    assert_eq!(
        name_field.get(b"V").unwrap().as_str().unwrap(),
        b"John Doe"
    );

    // the strikethrough annotation is gone from the page and the graph
    let strike_id = strikethrough_ref(&doc, "inst").unwrap();
    assert!(doc.get_object(strike_id).is_err());
    let page_id = ordered_pages(&doc)[0];
    let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
    let annots = page.get(b"Annots").unwrap().as_array().unwrap();
    assert!(!annots.contains(&Object::Reference(strike_id)));
    assert_eq!(annots.len(), 2);
}

#[test]
fn unknown_field_name_fails_before_saving() {
    let blank = blank_form_bytes();
    let values = FillValues {
        fields: BTreeMap::from([("no_such_field".to_string(), "x".to_string())]),
        declarant: None,
    };
    let err = fill_template(&blank, &values).unwrap_err();
    match err {
        FormError::FieldNotFound(name) => assert_eq!(name, "no_such_field"),
        other => panic!("unexpected error: {other}"),
    }
}
