use super::patterns::{self, DETAIL_MARKER, TOC_MARKER};
use super::{pattern_not_found, Page};
use crate::cursor::LineCursor;
use crate::error::ParseError;
use crate::model::{Catalog, Workstation};
use log::debug;

/// One workstation section of the recipes overview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub workstations: Vec<Workstation>,
    /// Path of the sub-page listing this section's recipes
    pub path: String,
}

/// Parse the recipes overview into workstation groups paired with their sub-pages
///
/// The table of contents (listing phase) and the section links further down
/// (detail phase) are scanned as two ordered sequences and zipped. They must
/// enumerate the same sections in the same order, so any difference in length
/// is a `StructuralMismatch`.
pub fn parse_directory(page: &Page, catalog: &Catalog) -> Result<Vec<DirectoryEntry>, ParseError> {
    let mut cursor = LineCursor::new(&page.content);
    let groups = list_groups(page, &mut cursor, catalog)?;
    let links = list_links(page, &mut cursor)?;

    if groups.len() != links.len() {
        return Err(ParseError::StructuralMismatch {
            page: page.id.clone(),
            left: "table of contents",
            left_count: groups.len(),
            right: "recipe sub-page links",
            right_count: links.len(),
        });
    }

    debug!("Found {} workstation sections on {}", groups.len(), page.id);
    Ok(groups
        .into_iter()
        .zip(links)
        .map(|(workstations, path)| DirectoryEntry { workstations, path })
        .collect())
}

/// Listing phase: one workstation group per table-of-contents entry
///
/// Leaves the cursor on the first line after the listing.
fn list_groups(
    page: &Page,
    cursor: &mut LineCursor<'_>,
    catalog: &Catalog,
) -> Result<Vec<Vec<Workstation>>, ParseError> {
    while cursor.peek().is_some_and(|line| !line.contains(TOC_MARKER)) {
        cursor.advance();
    }

    let mut groups = Vec::new();
    while let Some(line) = cursor.advance() {
        if !line.contains(TOC_MARKER) {
            cursor.pushback();
            break;
        }
        let labels = patterns::span_labels(line);
        if labels.is_empty() {
            return Err(pattern_not_found(page, cursor, Some(line), "a workstation label"));
        }
        groups.push(labels.into_iter().map(|label| resolve(catalog, label)).collect());
    }

    Ok(groups)
}

/// Detail phase: every recipe sub-page link, in page order
fn list_links(page: &Page, cursor: &mut LineCursor<'_>) -> Result<Vec<String>, ParseError> {
    let mut links = Vec::new();

    while let Some(line) = cursor.advance() {
        let Some(start) = line.find(DETAIL_MARKER) else {
            continue;
        };
        let target = patterns::link_target(&line[start..])
            .ok_or_else(|| pattern_not_found(page, cursor, Some(line), "a recipe sub-page link"))?;
        links.push(target.to_string());
    }

    Ok(links)
}

fn resolve(catalog: &Catalog, label: String) -> Workstation {
    match catalog.resolve(&label) {
        Some(id) => Workstation::Item(id),
        None => {
            debug!("Workstation '{}' is not an item, keeping the label", label);
            Workstation::Other(label)
        }
    }
}
