//! Lexical validation of the project / dataset / table names that get
//! interpolated into the query text.
//!
//! These values come from deployment configuration, not from clients, but
//! they still end up inside a backtick-quoted table reference, so anything
//! outside the grammars below is rejected before a query is built.

use std::fmt;

/// A project id that failed validation, or a dataset / table that did.
///
/// The offending value is carried for server-side logging only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    #[error("invalid BigQuery project id: {0:?}")]
    InvalidProjectId(String),

    #[error("invalid BigQuery dataset: {0:?}")]
    InvalidDataset(String),

    #[error("invalid BigQuery table: {0:?}")]
    InvalidTable(String),
}

/// `^[a-z][a-z0-9-]{4,29}$`: lowercase letter first, 5–30 characters total.
pub fn is_valid_project_id(s: &str) -> bool {
    let bytes = s.as_bytes();
    let Some((first, rest)) = bytes.split_first() else {
        return false;
    };
    first.is_ascii_lowercase()
        && (4..=29).contains(&rest.len())
        && rest
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
}

/// `^[A-Za-z0-9_]+$`.
pub fn is_valid_identifier(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// A fully qualified table reference whose three parts have passed validation.
///
/// The only way to obtain one is [`TableRef::new`], so holding a `TableRef`
/// is proof that it is safe to interpolate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    project: String,
    dataset: String,
    table: String,
}

impl TableRef {
    pub fn new(project: &str, dataset: &str, table: &str) -> Result<Self, IdentifierError> {
        if !is_valid_project_id(project) {
            return Err(IdentifierError::InvalidProjectId(project.to_string()));
        }
        if !is_valid_identifier(dataset) {
            return Err(IdentifierError::InvalidDataset(dataset.to_string()));
        }
        if !is_valid_identifier(table) {
            return Err(IdentifierError::InvalidTable(table.to_string()));
        }
        Ok(Self {
            project: project.to_string(),
            dataset: dataset.to_string(),
            table: table.to_string(),
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

/// `project.dataset.table`, unquoted.
impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project, self.dataset, self.table)
    }
}
