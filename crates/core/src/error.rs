use thiserror::Error;

/// Errors produced while deriving or filling a declaration form.
#[derive(Debug, Error)]
pub enum FormError {
    /// A modification table referenced a text block index that does
    /// not exist in the template. The template layout drifted from the
    /// authored table; nothing is written.
    #[error(
        "template {lang} page {page}: modification references text block {index}, page has {count}"
    )]
    StructuralMismatch {
        lang: String,
        page: usize,
        index: usize,
        count: usize,
    },

    /// A substitution table entry never matched any character of its
    /// block.
    #[error("substitution entries never matched: {keys}")]
    SubstitutionGap { keys: String },

    /// A named form field was not present in the document.
    #[error("form field not found: {0}")]
    FieldNotFound(String),

    /// Strikethrough geometry with a non-positive length or thickness.
    #[error("degenerate strikethrough geometry: length {length}, thickness {thickness}")]
    GeometryDegenerate { length: f64, thickness: f64 },

    /// The document object graph is missing something the engine
    /// requires.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error(transparent)]
    Pdf(#[from] lopdf::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FormError>;
