//! Template modification specs and the pipeline applying them.
//!
//! A [`TemplateMods`] value describes everything that turns one
//! language's government-issued declaration template into a blank
//! fillable form: which text blocks to drop, which to overwrite or
//! rewrite character by character, and which form fields and
//! strikethrough annotations to synthesize. The authored tables for
//! the four TD-OB1 languages live in [`mods`]; [`pipeline`] applies a
//! table to a loaded document.

pub mod mods;
pub mod pipeline;

pub use mods::{Language, template_mods};
pub use pipeline::{blank_template, create_form};

use std::collections::{BTreeMap, BTreeSet};

use crate::geometry::Rgb;
use crate::glyphs::Substitutions;

/// Horizontal justification of a text field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlignment {
    #[default]
    Start,
    Center,
    End,
}

impl TextAlignment {
    /// The form-dictionary /Q quadding value.
    pub fn quadding(self) -> i64 {
        match self {
            TextAlignment::Start => 0,
            TextAlignment::Center => 1,
            TextAlignment::End => 2,
        }
    }
}

/// Position and size of a synthesized text field, in page space.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub alignment: TextAlignment,
}

impl FieldPlacement {
    /// Widget rectangle `[llx, lly, urx, ury]`.
    pub fn rect(&self) -> [f64; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }
}

/// Position and shape of a synthesized strikethrough line.
#[derive(Debug, Clone, PartialEq)]
pub struct StrikePlacement {
    pub x: f64,
    pub y: f64,
    pub length: f64,
    pub thickness: f64,
    pub color: Rgb,
}

/// Replacement text for a block's show operations.
#[derive(Debug, Clone, PartialEq)]
pub enum SetText {
    /// A literal glyph-run array body.
    Literal(String),
    /// The active text of another block of the same page, identified
    /// by its index in the original (pre-rewrite) block numbering.
    FromBlock(usize),
}

/// Modifications applied to one page of a template.
#[derive(Debug, Clone, Default)]
pub struct PageMods {
    /// Indices of text blocks to remove entirely.
    pub remove_text: BTreeSet<usize>,
    /// Blocks whose show operations are replaced wholesale, keeping
    /// the positioning operators.
    pub set_text: BTreeMap<usize, SetText>,
    /// Blocks rewritten through a character substitution table.
    pub replace_text: BTreeMap<usize, Substitutions>,
    /// Text fields to synthesize, by field name.
    pub text_fields: Vec<(String, FieldPlacement)>,
    /// Strikethrough annotations to synthesize, by catalog name.
    pub strikethroughs: Vec<(String, StrikePlacement)>,
}

impl PageMods {
    /// Whether any content-stream rewriting is requested. Pages with
    /// only field or strikethrough synthesis keep their content
    /// stream untouched.
    pub fn rewrites_content(&self) -> bool {
        !self.remove_text.is_empty() || !self.set_text.is_empty() || !self.replace_text.is_empty()
    }

    /// The highest block index any rewrite entry refers to.
    pub fn max_block_index(&self) -> Option<usize> {
        let remove = self.remove_text.iter().next_back().copied();
        let set = self.set_text.keys().next_back().copied();
        let set_src = self
            .set_text
            .values()
            .filter_map(|t| match t {
                SetText::FromBlock(i) => Some(*i),
                SetText::Literal(_) => None,
            })
            .max();
        let replace = self.replace_text.keys().next_back().copied();
        [remove, set, set_src, replace].into_iter().flatten().max()
    }
}

/// Document information entries of a generated form.
#[derive(Debug, Clone)]
pub struct DocMeta {
    pub title: String,
    pub author: String,
    pub producer: String,
    pub creator: String,
}

/// The complete modification spec for one template language.
#[derive(Debug, Clone)]
pub struct TemplateMods {
    /// Per-page modifications, keyed by 0-based page index.
    pub pages: BTreeMap<usize, PageMods>,
    pub meta: DocMeta,
}
