use super::patterns::{self, CATALOG_MARKER};
use super::{pattern_not_found, Extraction, Page, PageParser};
use crate::cursor::LineCursor;
use crate::error::ParseError;
use crate::model::Item;
use log::debug;

/// Extracts items from the wiki's paginated item id listing
///
/// Each item row starts with a marker line carrying the name and icon, and the
/// numeric id sits on the line right after it.
pub struct CatalogParser;

impl PageParser for CatalogParser {
    type Record = Item;

    fn parse(&self, page: &Page) -> Extraction<Item> {
        let mut cursor = LineCursor::new(&page.content);
        let mut items = Vec::new();

        while let Some(line) = cursor.advance() {
            if !line.contains(CATALOG_MARKER) {
                continue;
            }
            match parse_record(page, &mut cursor, line) {
                Ok(item) => items.push(item),
                Err(err) => return Extraction::partial(items, err),
            }
        }

        debug!("Parsed {} items from {}", items.len(), page.id);
        Extraction::complete(items)
    }
}

fn parse_record(page: &Page, cursor: &mut LineCursor<'_>, line: &str) -> Result<Item, ParseError> {
    let name = patterns::title(line)
        .ok_or_else(|| pattern_not_found(page, cursor, Some(line), "a title=\"…\" item name"))?;
    let image = patterns::image_source(line)
        .ok_or_else(|| pattern_not_found(page, cursor, Some(line), "a src=\"…\" item image"))?;

    let id_line = cursor.advance();
    let id = id_line
        .and_then(patterns::first_integer)
        .ok_or_else(|| pattern_not_found(page, cursor, id_line, "an integer item id"))?;

    Ok(Item { id, name, image })
}

/// Parse every listing page in order, failing on the first malformed page
pub fn parse_catalog(pages: &[Page]) -> Result<Vec<Item>, ParseError> {
    let mut items = Vec::new();
    for page in pages {
        items.extend(CatalogParser.parse(page).into_result()?);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_read_from_following_line() {
        let page = Page::new(
            "/Item_IDs_Part1",
            concat!(
                "<tr>\n",
                "<td><span style=\"white-space:nowrap\"><a href=\"/Gel\" title=\"Gel\"><img src=\"/images/Gel.png\" /></a></span>\n",
                "</td><td>23\n",
                "</td></tr>\n",
            ),
        );
        let extraction = CatalogParser.parse(&page);
        assert!(extraction.is_complete());
        assert_eq!(
            extraction.records,
            vec![Item {
                id: 23,
                name: "Gel".to_string(),
                image: "/images/Gel.png".to_string()
            }]
        );
    }

    #[test]
    fn test_marker_at_end_of_page_is_an_error() {
        let page = Page::new(
            "/Item_IDs_Part2",
            "<span style=\"white-space:nowrap\"><a title=\"Gel\"><img src=\"g.png\" /></a></span>",
        );
        let extraction = CatalogParser.parse(&page);
        assert!(extraction.records.is_empty());
        assert!(matches!(
            extraction.error,
            Some(ParseError::PatternNotFound { line_number: 2, .. })
        ));
    }
}
