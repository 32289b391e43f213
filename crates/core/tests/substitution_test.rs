//! Character substitution across whole text blocks.

use tobform_core::error::FormError;
use tobform_core::glyphs::{
    COMMA, DOT, SLASH, SPACE, SubstKey, Substitutions, apply_substitutions, move_note,
    move_text_around,
};

#[test]
fn counter_runs_across_all_runs_of_a_block() {
    // Seq(3) is the second character of the second run.
    let subs = Substitutions::new(vec![(SubstKey::Seq(3), "0030".to_string())]);
    let body = "[<00240025>-12<00260027>] TJ";
    let out = apply_substitutions(body, &subs).unwrap();
    assert_eq!(out, "[<00240025>-12<00260030>] TJ");
}

#[test]
fn counter_does_not_reset_between_show_ops() {
    let subs = Substitutions::new(vec![(SubstKey::Seq(2), "0030".to_string())]);
    let body = "[<00240025>] TJ\n[<0026>] TJ";
    let out = apply_substitutions(body, &subs).unwrap();
    assert_eq!(out, "[<00240025>] TJ\n[<0030>] TJ");
}

#[test]
fn splice_inserts_space_and_compensating_offsets() {
    let subs = Substitutions::new(vec![move_text_around(
        SubstKey::Code(COMMA),
        -15200,
        -9200,
        COMMA,
    )]);
    let body = "[<0024000F0025>] TJ";
    let out = apply_substitutions(body, &subs).unwrap();
    assert_eq!(out, "[<0024><0003>-14900<000F>-9200<0025>] TJ");
}

#[test]
fn move_note_targets_the_first_character() {
    // A superscript block opens with a parenthesis glyph.
    let subs = Substitutions::new(vec![move_note(-3900)]);
    let body = "[<000B0014000C>] TJ";
    let out = apply_substitutions(body, &subs).unwrap();
    assert_eq!(out, "[<0003>-3600<000B0014000C>] TJ");
}

#[test]
fn whole_run_removal_takes_its_offset_along() {
    let subs = Substitutions::new(vec![
        (SubstKey::Code(DOT), String::new()),
        (SubstKey::Code(SPACE), String::new()),
    ]);
    let body = "[<0024>-12<00110011>-44<00030011>] TJ";
    let out = apply_substitutions(body, &subs).unwrap();
    assert_eq!(out, "[<0024>-12] TJ");
}

#[test]
fn decimal_offsets_survive_substitution() {
    let subs = Substitutions::new(vec![(SubstKey::Code(SLASH), "0030".to_string())]);
    let body = "[<0012>-3.5<0024>] TJ";
    let out = apply_substitutions(body, &subs).unwrap();
    assert_eq!(out, "[<0030>-3.5<0024>] TJ");
}

#[test]
fn later_entries_override_earlier_ones() {
    let subs = Substitutions::new(vec![
        (SubstKey::Code(DOT), "0024".to_string()),
        (SubstKey::Code(DOT), "0025".to_string()),
    ]);
    let out = apply_substitutions("[<0011>] TJ", &subs).unwrap();
    assert_eq!(out, "[<0025>] TJ");
}

#[test]
fn unmatched_entries_report_their_keys() {
    let subs = Substitutions::new(vec![
        (SubstKey::Seq(40), "0024".to_string()),
        (SubstKey::Code(DOT), String::new()),
    ]);
    let err = apply_substitutions("[<00110024>] TJ", &subs).unwrap_err();
    match err {
        FormError::SubstitutionGap { keys } => assert_eq!(keys, "#40"),
        other => panic!("unexpected error: {other}"),
    }
}
