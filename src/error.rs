//! Error taxonomy for pgnest.
//!
//! Three failure classes, kept deliberately closed:
//! - [`Error::Compile`] — malformed or unsupported notation, detected before
//!   any I/O and never retried.
//! - [`Error::Execution`] — a driver/database-reported failure, surfaced
//!   verbatim with the PostgreSQL diagnostic payload attached. No retry
//!   policy lives here; that belongs to a calling layer.
//! - [`Error::ExpandAborted`] — a sub-query inside an expand failed; the
//!   whole logical request fails and partial restitching state is dropped.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("compile error: {0}")]
    Compile(String),

    #[error("query execution failed: {source}")]
    Execution {
        #[source]
        source: tokio_postgres::Error,
        diagnostics: Option<PgDiagnostics>,
    },

    #[error("expand aborted at `{path}`: {source}")]
    ExpandAborted {
        path: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap a driver error, capturing the server's diagnostic fields when
    /// the failure is a database error response.
    pub fn execution(source: tokio_postgres::Error) -> Self {
        let diagnostics = PgDiagnostics::from_pg_error(&source);
        Error::Execution {
            source,
            diagnostics,
        }
    }

    pub(crate) fn expand_aborted(path: &[String], source: Error) -> Self {
        Error::ExpandAborted {
            path: path.join("."),
            source: Box::new(source),
        }
    }
}

/// The PostgreSQL error response payload, carried verbatim.
#[derive(Debug, Clone)]
pub struct PgDiagnostics {
    /// Severity (ERROR, FATAL, ...).
    pub severity: String,
    /// SQLSTATE code, e.g. "42601" for syntax_error.
    pub code: String,
    /// Primary message.
    pub message: String,
    pub detail: Option<String>,
    pub hint: Option<String>,
    /// 1-based byte position in the query text, when reported.
    pub position: Option<u32>,
    pub schema: Option<String>,
    pub table: Option<String>,
    pub column: Option<String>,
    pub constraint: Option<String>,
}

impl PgDiagnostics {
    pub fn from_pg_error(err: &tokio_postgres::Error) -> Option<Self> {
        let db_err = err.as_db_error()?;
        let position = db_err.position().and_then(|p| match p {
            tokio_postgres::error::ErrorPosition::Original(pos) => Some(*pos),
            tokio_postgres::error::ErrorPosition::Internal { .. } => None,
        });
        Some(PgDiagnostics {
            severity: db_err.severity().to_string(),
            code: db_err.code().code().to_string(),
            message: db_err.message().to_string(),
            detail: db_err.detail().map(|s| s.to_string()),
            hint: db_err.hint().map(|s| s.to_string()),
            position,
            schema: db_err.schema().map(|s| s.to_string()),
            table: db_err.table().map(|s| s.to_string()),
            column: db_err.column().map(|s| s.to_string()),
            constraint: db_err.constraint().map(|s| s.to_string()),
        })
    }
}
