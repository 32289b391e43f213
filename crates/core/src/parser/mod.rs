//! Content-stream parsing: text-block location and rewriting.

pub mod lexer;

pub use lexer::{TextBlock, extract_blocks, last_shown_text, rewrite_blocks, strip_shown_text};
