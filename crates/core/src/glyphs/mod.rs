//! Fixed-width glyph codes for the embedded template fonts.
//!
//! The government templates typeset every character individually with
//! the embedded F1/F3 fonts, encoding each character as a 4-hex-digit
//! code inside angle brackets, optionally followed by a horizontal
//! offset token. E.g. `<0011>-12` is a dot followed by a 12-unit
//! cursor movement. This module is the codec for those codes plus the
//! splice builders used by authored substitution tables.

pub mod subst;

pub use subst::{SubstKey, Substitutions, apply_substitutions};

use std::fmt;

/// A single fixed-width character code of the embedded fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlyphCode(pub u16);

impl GlyphCode {
    /// Parse a code from exactly four hex digits.
    pub fn parse(hex: &str) -> Option<GlyphCode> {
        if hex.len() != 4 {
            return None;
        }
        u16::from_str_radix(hex, 16).ok().map(GlyphCode)
    }
}

impl fmt::Display for GlyphCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

/// Space character of the F1/F3 encoding.
pub const SPACE: GlyphCode = GlyphCode(0x0003);
/// Open parenthesis (used by footnote superscripts).
pub const OPEN_PAREN: GlyphCode = GlyphCode(0x000B);
/// Comma.
pub const COMMA: GlyphCode = GlyphCode(0x000F);
/// Dot.
pub const DOT: GlyphCode = GlyphCode(0x0011);
/// Forward slash.
pub const SLASH: GlyphCode = GlyphCode(0x0012);
/// Ellipsis (single triple-dot glyph).
pub const ELLIPSIS: GlyphCode = GlyphCode(0x00AB);

/// Calibrated advance width of the space character, in text-space
/// offset units.
pub const SPACE_ADVANCE: i32 = 300;

/// Code for an ASCII alphabetic character. `A` maps to `0024`; the
/// rest of both cases follow at the same constant distance.
pub fn code_for(c: char) -> GlyphCode {
    const OFFSET: i32 = 0x0024 - 'A' as i32;
    GlyphCode((c as i32 + OFFSET) as u16)
}

/// Substitutions removing pre-printed dotted fill lines.
pub fn remove_dots() -> Vec<(SubstKey, String)> {
    vec![
        (SubstKey::Code(DOT), String::new()),
        (SubstKey::Code(ELLIPSIS), String::new()),
    ]
}

/// Move the text *before* the keyed character by `offset` units.
///
/// The value splices in a space glyph followed by a movement of
/// `SPACE_ADVANCE + offset` (reverting the space insertion), then
/// continues with `sub` in place of the matched character.
pub fn move_text(key: SubstKey, offset: i32, sub: GlyphCode) -> (SubstKey, String) {
    (
        key,
        format!("><{SPACE}>{}<{sub}", SPACE_ADVANCE + offset),
    )
}

/// Move the text *after* the keyed character by `offset` units.
pub fn move_text_after(key: SubstKey, offset: i32, sub: GlyphCode) -> (SubstKey, String) {
    (key, format!("><{sub}>{offset}<"))
}

/// Move the text around the keyed character: `before` units in front
/// of it, `after` units behind it.
pub fn move_text_around(
    key: SubstKey,
    before: i32,
    after: i32,
    sub: GlyphCode,
) -> (SubstKey, String) {
    (
        key,
        format!("><{SPACE}>{}<{sub}>{after}<", SPACE_ADVANCE + before),
    )
}

/// Move a footnote superscript by `offset`. The first character of a
/// superscript block is its opening parenthesis; it is replaced with
/// itself after the movement.
pub fn move_note(offset: i32) -> (SubstKey, String) {
    move_text(SubstKey::Seq(0), offset, OPEN_PAREN)
}

/// Substitutions capitalizing every distinct letter of the given
/// words. The distance between the encoded lowercase and uppercase
/// letters equals the UTF-16 distance (0x0020), so mapping through
/// `code_for` on both cases is exact.
pub fn capitalize(words: &[&str]) -> Vec<(SubstKey, String)> {
    let mut seen = std::collections::BTreeSet::new();
    let mut subs = Vec::new();
    for word in words {
        for c in word.to_lowercase().chars() {
            if seen.insert(c) {
                subs.push((
                    SubstKey::Code(code_for(c)),
                    code_for(c.to_ascii_uppercase()).to_string(),
                ));
            }
        }
    }
    subs
}
