//! Text folding for name matching.

/// Folds text into the form used for keys and substring matching.
///
/// Diacritics are stripped by transliterating to ASCII, the result is
/// lower-cased, and runs of whitespace collapse to a single space.
///
/// ```
/// use imbibi::text::normalize;
///
/// assert_eq!(normalize("  Nyarugenge   Ségment "), "nyarugenge segment");
/// assert_eq!(normalize("ŁÓDŹ"), "lodz");
/// ```
pub fn normalize(text: &str) -> String {
    let folded = deunicode::deunicode(text).to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
