//! tobform - generation and filling of Belgian TOB declaration forms.
//!
//! Takes the government-issued TD-OB1 templates, rewrites their page
//! content streams into blank fillable forms (removing pre-printed
//! fill text and reserving room), synthesizes the interactive form
//! fields and strikethrough annotations, and fills the resulting
//! forms with computed declaration values.

pub mod document;
pub mod error;
pub mod fill;
pub mod geometry;
pub mod glyphs;
pub mod money;
pub mod parser;
pub mod template;

pub use error::{FormError, Result};
pub use fill::{DeclarationValues, Declarant, FillValues, fill_template};
pub use template::{Language, TemplateMods, blank_template, create_form, template_mods};
