//! Classification of sqlx errors into application errors.

use gtms_core::error::{AppError, ErrorKind};

/// SQLSTATE for an undefined table.
const UNDEFINED_TABLE: &str = "42P01";
/// SQLSTATE for an undefined column.
const UNDEFINED_COLUMN: &str = "42703";

/// Whether a sqlx error reports a missing table or column.
pub fn is_schema_missing(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => matches!(
            db.code().as_deref(),
            Some(UNDEFINED_TABLE) | Some(UNDEFINED_COLUMN)
        ),
        _ => false,
    }
}

/// Wrap a sqlx error, classifying schema gaps as
/// [`ErrorKind::SchemaMissing`] and everything else as
/// [`ErrorKind::Database`].
pub fn db_error(context: &str, err: sqlx::Error) -> AppError {
    let kind = if is_schema_missing(&err) {
        ErrorKind::SchemaMissing
    } else {
        ErrorKind::Database
    };
    AppError::with_source(kind, context.to_string(), err)
}
