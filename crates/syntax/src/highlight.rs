//! The highlight pass: a pure function from a visible line slice to a
//! decorated byte sequence.
//!
//! Decorations are SGR color sequences with zero visible width, so the
//! decorated byte length and the on-screen column count diverge. Callers
//! must advance screen columns by the visible length, never the decorated
//! one.

use crossterm::style::{Color, SetForegroundColor};
use crossterm::Command;

use crate::SyntaxTable;

/// Colors applied to recognized token classes, plus the foreground to
/// restore after each span.
#[derive(Debug, Clone, Copy)]
pub struct HighlightPalette {
    pub keyword: Color,
    pub type_name: Color,
    pub number: Color,
    pub string: Color,
    pub text: Color,
}

/// Result of the highlight pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decorated {
    /// The input text with color markers spliced in.
    pub text: String,
    /// Byte length of `text`, markers included.
    pub decorated_len: usize,
    /// On-screen column count, always equal to the input length.
    pub visible_len: usize,
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn paint(out: &mut String, span: &str, color: Color, restore: Color) {
    // Writing SGR sequences into a String cannot fail
    let _ = SetForegroundColor(color).write_ansi(out);
    out.push_str(span);
    let _ = SetForegroundColor(restore).write_ansi(out);
}

/// Decorate one visible slice of a line. Every input byte appears exactly
/// once in the output, so the visible width is unchanged.
pub fn highlight_line(line: &str, table: &SyntaxTable, palette: &HighlightPalette) -> Decorated {
    let bytes = line.as_bytes();
    let mut out = String::with_capacity(line.len() + 64);
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if b == b'"' || b == b'\'' {
            // Quoted span, unterminated runs to the end of the slice
            let mut j = i + 1;
            while j < bytes.len() && bytes[j] != b {
                j += 1;
            }
            if j < bytes.len() {
                j += 1;
            }
            paint(&mut out, &line[i..j], palette.string, palette.text);
            i = j;
        } else if b.is_ascii_digit() {
            let mut j = i + 1;
            while j < bytes.len() && (is_word_byte(bytes[j]) || bytes[j] == b'.') {
                j += 1;
            }
            paint(&mut out, &line[i..j], palette.number, palette.text);
            i = j;
        } else if is_word_byte(b) {
            let mut j = i + 1;
            while j < bytes.len() && is_word_byte(bytes[j]) {
                j += 1;
            }
            let word = &line[i..j];
            if table.is_keyword(word) {
                paint(&mut out, word, palette.keyword, palette.text);
            } else if table.is_type(word) {
                paint(&mut out, word, palette.type_name, palette.text);
            } else {
                out.push_str(word);
            }
            i = j;
        } else {
            // Line slices come from the buffer's single-byte model
            out.push(b as char);
            i += 1;
        }
    }

    Decorated {
        decorated_len: out.len(),
        visible_len: line.len(),
        text: out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BUILTIN_DEFS;

    fn palette() -> HighlightPalette {
        HighlightPalette {
            keyword: Color::Yellow,
            type_name: Color::Cyan,
            number: Color::Magenta,
            string: Color::Green,
            text: Color::White,
        }
    }

    fn c_table() -> SyntaxTable {
        SyntaxTable::parse(BUILTIN_DEFS, "c").unwrap()
    }

    #[test]
    fn test_type_keyword_grows_encoded_length_only() {
        let decorated = highlight_line("int x", &c_table(), &palette());
        assert_eq!(decorated.visible_len, 5);
        assert!(decorated.decorated_len > 5);
        assert_eq!(decorated.decorated_len, decorated.text.len());
    }

    #[test]
    fn test_plain_text_is_identity() {
        let decorated = highlight_line("plain words here", &c_table(), &palette());
        assert_eq!(decorated.text, "plain words here");
        assert_eq!(decorated.decorated_len, decorated.visible_len);
    }

    #[test]
    fn test_visible_bytes_survive_in_order() {
        let input = "if (x == 42) return \"done\";";
        let decorated = highlight_line(input, &c_table(), &palette());
        // Stripping the markers yields the input back
        let stripped: String = strip_sgr(&decorated.text);
        assert_eq!(stripped, input);
        assert_eq!(decorated.visible_len, input.len());
    }

    #[test]
    fn test_keyword_at_token_boundary_only() {
        // "iffy" contains "if" but is not a keyword token
        let decorated = highlight_line("iffy", &c_table(), &palette());
        assert_eq!(decorated.text, "iffy");
    }

    #[test]
    fn test_unterminated_string_spans_to_end() {
        let decorated = highlight_line("x = \"open", &c_table(), &palette());
        assert_eq!(strip_sgr(&decorated.text), "x = \"open");
        assert!(decorated.decorated_len > decorated.visible_len);
    }

    fn strip_sgr(text: &str) -> String {
        let mut out = String::new();
        let mut chars = text.chars();
        while let Some(ch) = chars.next() {
            if ch == '\x1b' {
                for c in chars.by_ref() {
                    if c == 'm' {
                        break;
                    }
                }
            } else {
                out.push(ch);
            }
        }
        out
    }
}
