//! Text transforms applied to fetched titles and generated sections.

use regex::Regex;

/// Label some introduction templates prepend to their output.
const INTRO_LABEL: &str = "Introduction Paragraph:";

/// Characters removed when the label is present: the label plus its
/// separator character.
const INTRO_STRIP_LEN: usize = INTRO_LABEL.len() + 1;

/// Strip trailing ` - site/path` / ` : site/path` style suffixes from a
/// listing title and trim surrounding whitespace.
///
/// Listing titles come back as `"Why do dogs bark? - Quora"` or
/// `"Some question : forum/answers"`; the suffix carries no question text.
/// The transform is idempotent.
pub fn clean_listing_title(title: &str) -> String {
    let re = Regex::new(r"\s[-:]\s(\w+\b)*(/\w+)*").expect("static pattern compiles");
    re.replace_all(title, " ").trim().to_string()
}

/// Remove a literal leading `"Introduction Paragraph:"` label.
///
/// The strip happens at a fixed character offset (label plus one separator
/// char); input without the label is returned unmodified.
pub fn strip_intro_label(text: &str) -> &str {
    if text.starts_with(INTRO_LABEL) {
        text.get(INTRO_STRIP_LEN..).unwrap_or("")
    } else {
        text
    }
}
