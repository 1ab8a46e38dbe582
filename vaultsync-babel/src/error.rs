//! Error types for transform operations

use thiserror::Error;

/// Errors that abort a transform.
///
/// Structural skips, coercion failures and unresolved cross-references are
/// not errors; they are handled in place and logged. What remains here are
/// contract violations in the input or output trees.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A block kind that cannot carry children was given some
    #[error("block kind '{kind}' cannot carry children")]
    ChildrenNotAllowed { kind: String },

    /// A table row appeared outside of a table
    #[error("table_row block found outside of a table")]
    MisplacedTableRow,

    /// A table carried a child that is not a table row
    #[error("table child of kind '{kind}' is not a table_row")]
    TableChildNotRow { kind: String },

    /// Nesting went deeper than the configured limit
    #[error("nesting depth exceeds the limit of {limit}")]
    DepthExceeded { limit: usize },

    /// A property set bound for a page parent carries several titles
    #[error("property set contains {count} title properties, expected at most one")]
    MultipleTitles { count: usize },

    /// Wire JSON did not have the expected shape
    #[error("invalid wire value: {0}")]
    InvalidWire(String),

    /// Front matter could not be written back as YAML
    #[error("failed to serialize front matter: {0}")]
    Frontmatter(#[from] serde_yaml::Error),
}

pub type Result<T, E = TransformError> = std::result::Result<T, E>;
