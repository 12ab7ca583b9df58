use thiserror::Error;

/// Errors raised by the markup parsers when a page cannot be interpreted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A required marker or attribute was expected on a line and is absent
    #[error("{page}:{line_number}: expected {expected}, found `{line}`")]
    PatternNotFound {
        page: String,
        line_number: usize,
        line: String,
        expected: &'static str,
    },

    /// Two sections that should enumerate the same sequence disagree in length
    #[error("{page}: {left} lists {left_count} entries but {right} lists {right_count}")]
    StructuralMismatch {
        page: String,
        left: &'static str,
        left_count: usize,
        right: &'static str,
        right_count: usize,
    },

    /// A name is not present in the item catalog
    #[error("{page}:{line_number}: unknown item `{name}`")]
    UnresolvedReference {
        page: String,
        line_number: usize,
        name: String,
    },
}

impl ParseError {
    /// Identifier of the page the error was raised on
    pub fn page(&self) -> &str {
        match self {
            ParseError::PatternNotFound { page, .. }
            | ParseError::StructuralMismatch { page, .. }
            | ParseError::UnresolvedReference { page, .. } => page,
        }
    }

    /// Structural errors mean two inputs are out of sync; they abort a whole pass
    pub fn is_structural(&self) -> bool {
        matches!(self, ParseError::StructuralMismatch { .. })
    }
}

/// Errors that can occur while harvesting a dataset
#[derive(Error, Debug)]
pub enum CraftError {
    /// Failed to fetch a page or asset
    #[error("Failed to fetch URL: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// A page path could not be joined onto the base URL
    #[error("Invalid URL `{0}`")]
    InvalidUrl(String),

    /// Failed to parse a page
    #[error("Failed to parse page: {0}")]
    Parse(#[from] ParseError),

    /// Filesystem error (image cache, export)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize the dataset
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    Builder(String),

    /// A background fetch task panicked or was cancelled
    #[error("Fetch task failed: {0}")]
    TaskFailed(String),
}

impl CraftError {
    /// Whether the error must abort the whole run regardless of strictness
    pub fn is_structural(&self) -> bool {
        matches!(self, CraftError::Parse(err) if err.is_structural())
    }
}
