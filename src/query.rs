//! Level-prefix shorthand for search queries.
//!
//! A query starting with `:` names a hierarchy level before the text:
//!
//! ```
//! use imbibi::query::{parse, ParsedQuery};
//! use imbibi::Level;
//!
//! assert_eq!(
//!     parse(":village kigali"),
//!     ParsedQuery::Filtered { level: Level::Village, text: "kigali" }
//! );
//! assert_eq!(parse(":ce"), ParsedQuery::Suggest(vec![Level::Cell]));
//! assert_eq!(parse("kigali"), ParsedQuery::Text("kigali"));
//! ```

use crate::types::Level;

/// Marks the start of a level keyword.
pub const LEVEL_DELIMITER: char = ':';

/// How a raw query string should be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedQuery<'a> {
    /// Plain text, no level keyword
    Text(&'a str),
    /// A recognised keyword followed by the remaining text (possibly empty)
    Filtered {
        /// Level named by the keyword
        level: Level,
        /// Text after the keyword, trimmed
        text: &'a str,
    },
    /// The keyword is partial or unknown; these levels complete it
    Suggest(Vec<Level>),
}

/// Splits a query into its level keyword and text.
///
/// Keywords are the full level names, matched case-insensitively. Anything
/// else after the delimiter produces prefix suggestions, which are empty when
/// nothing matches.
pub fn parse(input: &str) -> ParsedQuery<'_> {
    let Some(rest) = input.trim_start().strip_prefix(LEVEL_DELIMITER) else {
        return ParsedQuery::Text(input);
    };

    let (keyword, text) = match rest.find(char::is_whitespace) {
        Some(split) => (&rest[..split], rest[split..].trim()),
        None => (rest, ""),
    };

    match Level::from_keyword(keyword) {
        Some(level) => ParsedQuery::Filtered { level, text },
        None => ParsedQuery::Suggest(Level::matching_prefix(keyword)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_without_text() {
        assert_eq!(
            parse(":cell"),
            ParsedQuery::Filtered {
                level: Level::Cell,
                text: ""
            }
        );
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        assert_eq!(
            parse("  :District  Gasabo "),
            ParsedQuery::Filtered {
                level: Level::District,
                text: "Gasabo"
            }
        );
    }

    #[test]
    fn test_bare_delimiter_suggests_everything() {
        assert_eq!(parse(":"), ParsedQuery::Suggest(Level::ALL.to_vec()));
    }

    #[test]
    fn test_unknown_keyword_suggests_nothing() {
        assert_eq!(parse(":zone kigali"), ParsedQuery::Suggest(Vec::new()));
    }

    #[test]
    fn test_prefix_suggestions() {
        assert_eq!(parse(":s"), ParsedQuery::Suggest(vec![Level::Sector]));
        assert_eq!(parse(":DI"), ParsedQuery::Suggest(vec![Level::District]));
    }

    #[test]
    fn test_delimiter_inside_text_is_plain() {
        assert_eq!(parse("gasabo:cell"), ParsedQuery::Text("gasabo:cell"));
    }
}
