//! Markup tokens and attribute patterns of the wiki's table layouts.

use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;

/// Item listing row: the cell holding an item's icon and name
pub const CATALOG_MARKER: &str = "<span style=\"white-space:nowrap\">";

/// Top-level table-of-contents entry on the recipes overview
pub const TOC_MARKER: &str = "<li class=\"toclevel-1 tocsection-";

/// Link to a workstation's recipe sub-page
pub const DETAIL_MARKER: &str = "<a href=\"/Recipes/";

/// Centered single-column cell that opens a recipe record
pub const RECORD_MARKER: &str = "style=\"text-align:center;width:1%\">";

/// Attribute present on every line that carries an item cell
pub const CELL_MARKER: &str = "title";

static TITLE_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"title="([^"]+)""#).unwrap());
static SRC_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"src="([^"]+)""#).unwrap());
static HREF_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<a href="([^"]+)""#).unwrap());
static ROWSPAN_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"rowspan="\s*([0-9]+)\s*""#).unwrap());
static MULTIPLIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([0-9]+)\)").unwrap());
static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());
static SPAN_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Za-z '\-]+)</span>").unwrap());

fn capture<'a>(re: &Regex, line: &'a str) -> Option<&'a str> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|value| !value.is_empty())
}

/// Undo the apostrophe escapes the wiki applies to names and file names
pub fn normalize(raw: &str) -> String {
    decode_html_entities(raw.trim()).replace("%27", "'")
}

/// Display name from the first `title="…"` attribute
pub fn title(line: &str) -> Option<String> {
    capture(&TITLE_ATTR, line).map(normalize)
}

/// Image reference from the first `src="…"` attribute
pub fn image_source(line: &str) -> Option<String> {
    capture(&SRC_ATTR, line).map(normalize)
}

/// Target of the first anchor on the line
pub fn link_target(line: &str) -> Option<&str> {
    capture(&HREF_ATTR, line)
}

/// Number of rows spanned by the cell, from `rowspan="N"`
pub fn rowspan(line: &str) -> Option<usize> {
    capture(&ROWSPAN_ATTR, line).and_then(|digits| digits.parse().ok())
}

/// First run of digits on the line
pub fn first_integer(line: &str) -> Option<u32> {
    INTEGER.find(line).and_then(|m| m.as_str().parse().ok())
}

/// Quantity of a cell: the parenthesized multiplier, or 1 when absent
///
/// Returns `None` when a multiplier is present but is not a positive `u32`.
pub fn quantity(line: &str) -> Option<u32> {
    match capture(&MULTIPLIER, line) {
        None => Some(1),
        Some(digits) => digits.parse().ok().filter(|count| *count > 0),
    }
}

/// Every label closed by a `</span>` on the line, trimmed
pub fn span_labels(line: &str) -> Vec<String> {
    SPAN_LABEL
        .captures_iter(line)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|label| !label.is_empty())
        .collect()
}
