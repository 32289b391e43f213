//! Content-stream scanner for text-block extraction and rewriting.
//!
//! Walks the operator stream byte by byte with an explicit state per
//! construct (literal string, hex string, comment, name, keyword)
//! instead of pattern matching, so BT/ET operators inside string data
//! are never mistaken for block delimiters.

use crate::error::Result;

/// A BT..ET text block located in a content stream.
///
/// `start`/`end` are byte offsets of the whole block including its
/// delimiters. The index of a block is its 0-based position of
/// occurrence and is only stable for one rewrite pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    /// Raw bytes between the BT and ET operators, lossily decoded.
    pub body: String,
    /// Offset of the `B` of the opening BT operator.
    pub start: usize,
    /// Offset one past the `T` of the closing ET operator.
    pub end: usize,
}

impl TextBlock {
    /// The block body with surrounding whitespace stripped.
    pub fn text(&self) -> &str {
        self.body.trim()
    }
}

/// Low-level scanner over content-stream bytes.
///
/// Yields keyword token spans while transparently skipping every
/// construct a keyword could hide in: literal strings (with escapes
/// and nesting), hex strings, dictionaries, names and comments.
struct Scanner<'a> {
    data: &'a [u8],
    pos: usize,
}

/// Span of a regular-character token (operator or number).
#[derive(Debug, Clone, Copy)]
struct Token {
    start: usize,
    end: usize,
}

impl<'a> Scanner<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.data.get(self.pos + offset).copied()
    }

    fn is_whitespace(b: u8) -> bool {
        matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'\x00' | b'\x0c')
    }

    fn is_delimiter(b: u8) -> bool {
        matches!(
            b,
            b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
        )
    }

    /// Skip a literal string `(...)`, honoring escapes and nesting.
    fn skip_string(&mut self) {
        self.pos += 1; // consume '('
        let mut depth = 1usize;
        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'\\' => {
                    if self.peek().is_some() {
                        self.pos += 1;
                    }
                }
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    /// Skip a hex string `<...>` (the `<` has not been consumed yet).
    fn skip_hex_string(&mut self) {
        self.pos += 1; // consume '<'
        while let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'>' {
                return;
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'\r' || b == b'\n' {
                return;
            }
            self.pos += 1;
        }
    }

    /// Skip a name token `/Name`.
    fn skip_name(&mut self) {
        self.pos += 1; // consume '/'
        while let Some(b) = self.peek() {
            if Self::is_whitespace(b) || Self::is_delimiter(b) {
                return;
            }
            self.pos += 1;
        }
    }

    /// Advance to the next regular-character token and return its span.
    fn next_token(&mut self) -> Option<Token> {
        while let Some(b) = self.peek() {
            if Self::is_whitespace(b) {
                self.pos += 1;
            } else if b == b'%' {
                self.skip_comment();
            } else if b == b'(' {
                self.skip_string();
            } else if b == b'<' {
                if self.peek_at(1) == Some(b'<') {
                    self.pos += 2; // dict start
                } else {
                    self.skip_hex_string();
                }
            } else if b == b'>' {
                // only occurs as dict end '>>' outside a hex string
                self.pos += 1;
                if self.peek() == Some(b'>') {
                    self.pos += 1;
                }
            } else if b == b'/' {
                self.skip_name();
            } else if Self::is_delimiter(b) {
                self.pos += 1;
            } else {
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if Self::is_whitespace(c) || Self::is_delimiter(c) {
                        break;
                    }
                    self.pos += 1;
                }
                return Some(Token {
                    start,
                    end: self.pos,
                });
            }
        }
        None
    }

    fn token_bytes(&self, tok: Token) -> &'a [u8] {
        &self.data[tok.start..tok.end]
    }

    /// Find the next BT..ET pair. Returns offsets of (block start,
    /// body start, body end, block end). An unterminated BT yields
    /// None and the tail is left untouched.
    fn next_block(&mut self) -> Option<(usize, usize, usize, usize)> {
        loop {
            let tok = self.next_token()?;
            if self.token_bytes(tok) != b"BT" {
                continue;
            }
            let block_start = tok.start;
            let body_start = tok.end;
            loop {
                let inner = self.next_token()?;
                if self.token_bytes(inner) == b"ET" {
                    return Some((block_start, body_start, inner.start, inner.end));
                }
            }
        }
    }
}

/// Extract all BT..ET text blocks from a content stream, in order.
pub fn extract_blocks(data: &[u8]) -> Vec<TextBlock> {
    let mut scanner = Scanner::new(data);
    let mut blocks = Vec::new();
    while let Some((start, body_start, body_end, end)) = scanner.next_block() {
        blocks.push(TextBlock {
            body: String::from_utf8_lossy(&data[body_start..body_end]).into_owned(),
            start,
            end,
        });
    }
    blocks
}

/// Rewrite a content stream by transforming each text block.
///
/// `transform` receives the trimmed block body and the block's index.
/// Returning `Ok(Some(text))` replaces the block with `BT\n{text}\nET`;
/// returning `Ok(None)` removes the block including its delimiters.
/// Bytes outside text blocks pass through verbatim, so non-text
/// drawing operators are preserved. A single linear pass is made.
pub fn rewrite_blocks<F>(data: &[u8], mut transform: F) -> Result<Vec<u8>>
where
    F: FnMut(&str, usize) -> Result<Option<String>>,
{
    let mut scanner = Scanner::new(data);
    let mut out = Vec::with_capacity(data.len());
    let mut copied = 0usize;
    let mut index = 0usize;
    while let Some((start, body_start, body_end, end)) = scanner.next_block() {
        out.extend_from_slice(&data[copied..start]);
        let body = String::from_utf8_lossy(&data[body_start..body_end]);
        if let Some(replacement) = transform(body.trim(), index)? {
            out.extend_from_slice(b"BT\n");
            out.extend_from_slice(replacement.as_bytes());
            out.extend_from_slice(b"\nET");
        }
        copied = end;
        index += 1;
    }
    out.extend_from_slice(&data[copied..]);
    Ok(out)
}

/// Return the glyph-run array of the last `[...] TJ` show operation in
/// a block body: the block's "active text". The array brackets and the
/// operator are not included.
pub fn last_shown_text(body: &str) -> Option<String> {
    let bytes = body.as_bytes();
    shown_text_spans(bytes).last().map(|&(start, _, array_end)| {
        String::from_utf8_lossy(&bytes[start + 1..array_end]).into_owned()
    })
}

/// Remove every `[...] TJ` show operation from a block body.
pub fn strip_shown_text(body: &str) -> String {
    let bytes = body.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut copied = 0usize;
    for (start, end, _) in shown_text_spans(bytes) {
        out.extend_from_slice(&bytes[copied..start]);
        copied = end;
    }
    out.extend_from_slice(&bytes[copied..]);
    String::from_utf8_lossy(&out).into_owned()
}

/// Spans of `[...] TJ` show operations as (span start, span end,
/// offset of the closing bracket). Span start is the opening `[`,
/// span end is one past the `TJ` operator.
fn shown_text_spans(bytes: &[u8]) -> Vec<(usize, usize, usize)> {
    let mut spans = Vec::new();
    let mut scanner = Scanner::new(bytes);
    loop {
        // Look for an array start.
        let array_start;
        loop {
            match scanner.peek() {
                Some(b'[') => {
                    array_start = scanner.pos;
                    scanner.pos += 1;
                    break;
                }
                Some(b'(') => scanner.skip_string(),
                Some(b'<') => {
                    if scanner.peek_at(1) == Some(b'<') {
                        scanner.pos += 2;
                    } else {
                        scanner.skip_hex_string();
                    }
                }
                Some(b'%') => scanner.skip_comment(),
                Some(b'/') => scanner.skip_name(),
                Some(_) => scanner.pos += 1,
                None => return spans,
            }
        }
        // Scan to the matching close bracket.
        let mut array_end = None;
        while let Some(b) = scanner.peek() {
            match b {
                b']' => {
                    array_end = Some(scanner.pos);
                    scanner.pos += 1;
                    break;
                }
                b'(' => scanner.skip_string(),
                b'<' => scanner.skip_hex_string(),
                _ => scanner.pos += 1,
            }
        }
        let Some(array_end) = array_end else {
            return spans;
        };
        // The array is a show operation only when TJ follows.
        let after = scanner.pos;
        match scanner.next_token() {
            Some(tok) if scanner.token_bytes(tok) == b"TJ" => {
                spans.push((array_start, tok.end, array_end));
            }
            _ => scanner.pos = after,
        }
    }
}
