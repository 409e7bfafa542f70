//! Keyword-table syntax highlighting for quill.
//!
//! A syntax definition maps a file extension to two ordered word lists
//! (keywords and type names). The highlight pass decorates a visible line
//! slice with color-control markers without changing its visible width.

mod highlight;

pub use highlight::{highlight_line, Decorated, HighlightPalette};

/// Built-in syntax definitions, one record per line: the extension key,
/// a `?`-terminated keyword segment, then a `?`-terminated type segment.
pub const BUILTIN_DEFS: &str = include_str!("../defs/syntax.def");

/// Keyword and type lists for one file extension. Read-only once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTable {
    extension: String,
    keywords: Vec<String>,
    types: Vec<String>,
}

impl SyntaxTable {
    /// Linear scan of `defs` for the record whose key matches `extension`.
    /// Returns `None` when no record matches or the record is malformed.
    pub fn parse(defs: &str, extension: &str) -> Option<SyntaxTable> {
        if extension.is_empty() {
            return None;
        }
        for record in defs.lines() {
            let Some(rest) = record.strip_prefix(extension) else {
                continue;
            };
            if !rest.starts_with(char::is_whitespace) {
                continue;
            }

            let mut segments = rest.splitn(3, '?');
            let keywords = segment_words(segments.next()?);
            let types = segment_words(segments.next()?);
            return Some(SyntaxTable {
                extension: extension.to_string(),
                keywords,
                types,
            });
        }
        None
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.iter().any(|k| k == word)
    }

    pub fn is_type(&self, word: &str) -> bool {
        self.types.iter().any(|t| t == word)
    }
}

fn segment_words(segment: &str) -> Vec<String> {
    segment.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_builtin_c_record() {
        let table = SyntaxTable::parse(BUILTIN_DEFS, "c").unwrap();
        assert!(table.is_keyword("return"));
        assert!(table.is_type("int"));
        assert!(!table.is_keyword("int"));
        assert!(!table.is_type("return"));
    }

    #[test]
    fn test_parse_unknown_extension() {
        assert!(SyntaxTable::parse(BUILTIN_DEFS, "xyz").is_none());
        assert!(SyntaxTable::parse(BUILTIN_DEFS, "").is_none());
    }

    #[test]
    fn test_extension_key_must_end_at_boundary() {
        // "r" must not match the "rs" record
        assert!(SyntaxTable::parse(BUILTIN_DEFS, "r").is_none());
    }

    #[test]
    fn test_parse_custom_record() {
        let defs = "zz alpha beta ?Gamma ?\n";
        let table = SyntaxTable::parse(defs, "zz").unwrap();
        assert!(table.is_keyword("alpha"));
        assert!(table.is_type("Gamma"));
        assert!(!table.is_keyword("gamma"));
    }
}
