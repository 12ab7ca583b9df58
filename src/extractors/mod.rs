use crate::cursor::LineCursor;
use crate::error::ParseError;

mod catalog;
mod directory;
mod patterns;
mod recipe_table;

pub use catalog::{parse_catalog, CatalogParser};
pub use directory::{parse_directory, DirectoryEntry};
pub use recipe_table::{split_rows, RecipeTableParser, UnresolvedPolicy};

/// Raw markup of one fetched page
#[derive(Debug, Clone)]
pub struct Page {
    /// Path or URL the page was fetched from, used in error reports
    pub id: String,
    pub content: String,
}

impl Page {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// Records extracted from one page, plus the error that stopped extraction early
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction<T> {
    pub records: Vec<T>,
    pub error: Option<ParseError>,
}

impl<T> Extraction<T> {
    pub fn complete(records: Vec<T>) -> Self {
        Self { records, error: None }
    }

    pub fn partial(records: Vec<T>, error: ParseError) -> Self {
        Self {
            records,
            error: Some(error),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Discard partial records if extraction failed
    pub fn into_result(self) -> Result<Vec<T>, ParseError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.records),
        }
    }
}

/// A parser that turns one page into a list of records
pub trait PageParser {
    type Record;

    fn parse(&self, page: &Page) -> Extraction<Self::Record>;
}

/// Build a `PatternNotFound` for the line the cursor just consumed (`None` at end of page)
pub(crate) fn pattern_not_found(
    page: &Page,
    cursor: &LineCursor<'_>,
    line: Option<&str>,
    expected: &'static str,
) -> ParseError {
    let line_number = match line {
        Some(_) => cursor.line_number(),
        None => cursor.line_number() + 1,
    };
    ParseError::PatternNotFound {
        page: page.id.clone(),
        line_number,
        line: line.unwrap_or_default().trim().to_string(),
        expected,
    }
}
