//! Content-stream text block extraction and rewriting.

use tobform_core::parser::{extract_blocks, last_shown_text, rewrite_blocks};

const STREAM: &[u8] = b"q\n0.1 w\nBT\n/F1 8 Tf\n1 0 0 1 56 700 Tm\n[<0024>-12<0025>] TJ\nET\n10 20 m 30 40 l S\nBT\n[<00110011><0030>] TJ\nET\nQ";

#[test]
fn extracts_blocks_in_order() {
    let blocks = extract_blocks(STREAM);
    assert_eq!(blocks.len(), 2);
    assert!(blocks[0].text().starts_with("/F1 8 Tf"));
    assert_eq!(blocks[1].text(), "[<00110011><0030>] TJ");
}

#[test]
fn identity_rewrite_preserves_every_block() {
    let rewritten = rewrite_blocks(STREAM, |body, _| Ok(Some(body.to_string()))).unwrap();
    let before = extract_blocks(STREAM);
    let after = extract_blocks(&rewritten);
    assert_eq!(before.len(), after.len());
    for (b, a) in before.iter().zip(&after) {
        assert_eq!(b.text(), a.text());
    }
}

#[test]
fn rewriting_is_idempotent() {
    let once = rewrite_blocks(STREAM, |body, _| Ok(Some(body.to_string()))).unwrap();
    let twice = rewrite_blocks(&once, |body, _| Ok(Some(body.to_string()))).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn non_text_operators_pass_through() {
    let rewritten = rewrite_blocks(STREAM, |body, _| Ok(Some(body.to_string()))).unwrap();
    let text = String::from_utf8(rewritten).unwrap();
    assert!(text.contains("10 20 m 30 40 l S"));
    assert!(text.starts_with("q\n0.1 w"));
    assert!(text.ends_with("Q"));
}

#[test]
fn dropping_a_block_removes_its_delimiters() {
    let rewritten = rewrite_blocks(STREAM, |body, i| {
        Ok((i != 0).then(|| body.to_string()))
    })
    .unwrap();
    assert_eq!(extract_blocks(&rewritten).len(), 1);
    let text = String::from_utf8(rewritten).unwrap();
    assert!(!text.contains("/F1 8 Tf"));
    assert!(text.contains("10 20 m 30 40 l S"));
}

#[test]
fn indices_are_original_positions() {
    let mut seen = Vec::new();
    rewrite_blocks(STREAM, |body, i| {
        seen.push(i);
        // removing the first block must not shift the second's index
        Ok((i != 0).then(|| body.to_string()))
    })
    .unwrap();
    assert_eq!(seen, vec![0, 1]);
}

#[test]
fn last_shown_text_is_the_active_text() {
    let blocks = extract_blocks(STREAM);
    assert_eq!(
        last_shown_text(&blocks[0].body).as_deref(),
        Some("<0024>-12<0025>")
    );
}

#[test]
fn operators_inside_strings_are_data() {
    let data = b"BT (ET is not an operator here) Tj ET";
    let blocks = extract_blocks(data);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].text(), "(ET is not an operator here) Tj");
}

#[test]
fn unterminated_block_is_ignored() {
    let data = b"BT [<0024>] TJ ET q BT [<0025>] TJ";
    let blocks = extract_blocks(data);
    assert_eq!(blocks.len(), 1);
    let rewritten = rewrite_blocks(data, |body, _| Ok(Some(body.to_string()))).unwrap();
    let text = String::from_utf8(rewritten).unwrap();
    // the unterminated tail passes through untouched
    assert!(text.ends_with("BT [<0025>] TJ"));
}
