use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Every failure the table store can report.
///
/// All errors are raised where they are detected and never retried; the
/// caller decides whether to log and continue or abort.
#[derive(Debug, Error, Diagnostic)]
pub enum DatabaseError {
    #[error("IO Error: {0}")]
    #[diagnostic(code(scribe::io))]
    IoError(#[from] std::io::Error),

    #[error("CSV Error: {0}")]
    #[diagnostic(code(scribe::csv))]
    CsvError(#[from] csv::Error),

    #[error("Table not found: {0}")]
    #[diagnostic(
        code(scribe::table_not_found),
        help("register the table on the catalog before using it")
    )]
    TableNotFound(String),

    #[error("Duplicate key ({}) in table {table}", key.join(", "))]
    #[diagnostic(code(scribe::duplicate_key))]
    DuplicateKey { table: String, key: Vec<String> },

    #[error("Invalid argument: {0}")]
    #[diagnostic(code(scribe::invalid_argument))]
    InvalidArgument(String),

    #[error("Cannot calculate average for non-numeric value '{value}' in field {field}")]
    #[diagnostic(code(scribe::non_numeric_aggregation))]
    NonNumericAggregation { field: String, value: String },

    #[error("Unknown aggregation method '{0}'")]
    #[diagnostic(
        code(scribe::unknown_operation),
        help("expected one of: min, max, count, avg")
    )]
    UnknownOperation(String),

    #[error("Failed to load {}, line {line}: {reason}", path.display())]
    #[diagnostic(
        code(scribe::load),
        help("fix or remove the backing file; rows are never partially loaded")
    )]
    Load {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("Malformed record for table {table}: expected {expected} fields, got {found}")]
    #[diagnostic(code(scribe::malformed_record))]
    MalformedRecord {
        table: String,
        expected: usize,
        found: usize,
    },

    #[error("Field {field} holds '{value}', which is not a valid number")]
    #[diagnostic(code(scribe::invalid_number))]
    InvalidNumber { field: String, value: String },
}
