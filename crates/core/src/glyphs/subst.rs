//! Character substitution inside glyph runs.
//!
//! A substitution table is keyed either by the sequential position of
//! a character within its whole text block or by the character's
//! literal code. Values are spliced into the run verbatim, which lets
//! a single replacement close the current run, insert a space glyph
//! with a compensating horizontal offset, and reopen a run. This is
//! the mechanism used to clear pre-printed fill characters and reserve
//! visual room for form fields without disturbing the surrounding
//! kerning.

use itertools::Itertools;

use crate::error::{FormError, Result};
use crate::glyphs::GlyphCode;

/// Key of one substitution entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubstKey {
    /// 0-based sequential character position within the block. The
    /// counter runs across all glyph runs of the block and never
    /// resets per run.
    Seq(usize),
    /// Literal 4-hex-digit character code.
    Code(GlyphCode),
}

/// An ordered character substitution table.
///
/// Lookup order per visited character: sequential key first, then
/// code key, then identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Substitutions {
    entries: Vec<(SubstKey, String)>,
}

impl Substitutions {
    pub fn new(entries: Vec<(SubstKey, String)>) -> Self {
        let mut subs = Self::default();
        for (key, value) in entries {
            subs.insert(key, value);
        }
        subs
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert an entry, overwriting an earlier entry with the same key.
    pub fn insert(&mut self, key: SubstKey, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Append further entries; a duplicate key overwrites the earlier
    /// entry, so later table fragments refine earlier ones.
    pub fn extend(mut self, entries: Vec<(SubstKey, String)>) -> Self {
        for (key, value) in entries {
            self.insert(key, value);
        }
        self
    }

    /// Consume the table into its entry list, for merging into
    /// another table.
    pub fn into_entries(self) -> Vec<(SubstKey, String)> {
        self.entries
    }

    fn lookup(&self, seq: usize, code: GlyphCode) -> Option<(usize, &str)> {
        let by_seq = self
            .entries
            .iter()
            .position(|(k, _)| *k == SubstKey::Seq(seq));
        let hit = by_seq.or_else(|| {
            self.entries
                .iter()
                .position(|(k, _)| *k == SubstKey::Code(code))
        });
        hit.map(|i| (i, self.entries[i].1.as_str()))
    }
}

impl FromIterator<(SubstKey, String)> for Substitutions {
    fn from_iter<T: IntoIterator<Item = (SubstKey, String)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Apply a substitution table to a text block body.
///
/// Scans the body for glyph runs (bracketed sequences of 4-hex-digit
/// codes, each optionally followed by a signed numeric offset token),
/// replaces each code through the table while advancing one shared
/// sequential counter, and collapses any bracketed run left empty.
/// The trailing offset token of a collapsed run is dropped as well,
/// since a dangling offset would shift the rest of the line.
///
/// Fails with [`FormError::SubstitutionGap`] when a table entry never
/// matched; a silently unused entry means the upstream template
/// drifted from the authored table.
pub fn apply_substitutions(body: &str, subs: &Substitutions) -> Result<String> {
    let bytes = body.as_bytes();
    let mut out = String::with_capacity(body.len());
    let mut matched = vec![false; subs.entries.len()];
    let mut counter = 0usize;
    let mut i = 0usize;
    let mut copied = 0usize;

    while i < bytes.len() {
        if bytes[i] == b'<' && bytes.get(i + 1) != Some(&b'<') {
            if let Some((run, offset, next)) = scan_run(bytes, i) {
                // Flush the region between runs untouched, as a slice
                // so non-ASCII string data survives the round-trip.
                out.push_str(&body[copied..i]);
                let mut replaced = String::with_capacity(run.len());
                for chunk in run.as_bytes().chunks(4) {
                    // chunks are guaranteed 4 bytes by scan_run
                    let hex = std::str::from_utf8(chunk).unwrap_or_default();
                    let code = GlyphCode::parse(hex).unwrap_or(GlyphCode(0));
                    match subs.lookup(counter, code) {
                        Some((entry, value)) => {
                            matched[entry] = true;
                            replaced.push_str(value);
                        }
                        None => replaced.push_str(hex),
                    }
                    counter += 1;
                }
                let chunk = format!("<{replaced}>{offset}");
                out.push_str(&collapse_empty_runs(&chunk));
                i = next;
                copied = next;
                continue;
            }
        }
        i += 1;
    }
    out.push_str(&body[copied..]);

    let missed = subs
        .entries
        .iter()
        .zip(&matched)
        .filter(|(_, hit)| !**hit)
        .map(|((key, _), _)| match key {
            SubstKey::Seq(n) => format!("#{n}"),
            SubstKey::Code(c) => format!("<{c}>"),
        })
        .join(", ");
    if missed.is_empty() {
        Ok(out)
    } else {
        Err(FormError::SubstitutionGap { keys: missed })
    }
}

/// Scan a glyph run starting at the `<` at `start`. Returns the run's
/// hex digits, the trailing offset token (possibly empty) and the
/// position after both. Returns None unless the bracketed content is
/// entirely uppercase hex with a length that is a positive multiple
/// of four.
fn scan_run(bytes: &[u8], start: usize) -> Option<(String, String, usize)> {
    let mut i = start + 1;
    let run_start = i;
    while i < bytes.len() && bytes[i] != b'>' {
        let b = bytes[i];
        if !(b.is_ascii_digit() || (b'A'..=b'F').contains(&b)) {
            return None;
        }
        i += 1;
    }
    if i >= bytes.len() {
        return None;
    }
    let run = &bytes[run_start..i];
    if run.is_empty() || run.len() % 4 != 0 {
        return None;
    }
    i += 1; // consume '>'
    let offset_start = i;
    if bytes.get(i) == Some(&b'-') {
        i += 1;
    }
    let digits_start = i;
    while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
        i += 1;
    }
    if i == digits_start {
        // An offset token needs at least one digit; a bare '-' is not
        // part of the run.
        i = offset_start;
    }
    Some((
        String::from_utf8_lossy(run).into_owned(),
        String::from_utf8_lossy(&bytes[offset_start..i]).into_owned(),
        i,
    ))
}

/// Remove every empty bracketed run, together with the offset token
/// that trails it.
fn collapse_empty_runs(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0usize;
    let mut copied = 0usize;
    while i < bytes.len() {
        if bytes[i] == b'<' && bytes.get(i + 1) == Some(&b'>') {
            out.push_str(&s[copied..i]);
            i += 2;
            let mut j = i;
            if bytes.get(j) == Some(&b'-') {
                j += 1;
            }
            let digits_start = j;
            while j < bytes.len() && (bytes[j].is_ascii_digit() || bytes[j] == b'.') {
                j += 1;
            }
            if j > digits_start {
                i = j;
            }
            copied = i;
        } else {
            i += 1;
        }
    }
    out.push_str(&s[copied..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyphs::{DOT, remove_dots};

    #[test]
    fn code_key_replaces_every_occurrence() {
        let subs = Substitutions::new(vec![(SubstKey::Code(DOT), String::new())]);
        let out = apply_substitutions("[<00110011>-12<0024>] TJ", &subs).unwrap();
        assert_eq!(out, "[<0024>] TJ");
    }

    #[test]
    fn seq_key_wins_over_code_key() {
        let subs = Substitutions::new(vec![
            (SubstKey::Seq(0), "0030".to_string()),
            (SubstKey::Code(DOT), String::new()),
        ]);
        let out = apply_substitutions("[<0011><0011>] TJ", &subs).unwrap();
        assert_eq!(out, "[<0030>] TJ");
    }

    #[test]
    fn collapsed_run_drops_trailing_offset() {
        let subs = Substitutions::new(vec![(SubstKey::Code(DOT), String::new())]);
        let out = apply_substitutions("[<0011>-12<0024>3] TJ", &subs).unwrap();
        assert_eq!(out, "[<0024>3] TJ");
    }

    #[test]
    fn non_ascii_literal_text_survives_unchanged() {
        let subs = Substitutions::new(vec![(SubstKey::Code(DOT), String::new())]);
        let out = apply_substitutions("(déjà vu) Tj\n[<0011><0024>] TJ", &subs).unwrap();
        assert_eq!(out, "(déjà vu) Tj\n[<0024>] TJ");
    }

    #[test]
    fn unmatched_entry_is_fatal() {
        let subs: Substitutions = remove_dots().into_iter().collect();
        let err = apply_substitutions("[<0024>] TJ", &subs).unwrap_err();
        assert!(matches!(
            err,
            crate::error::FormError::SubstitutionGap { .. }
        ));
    }
}
