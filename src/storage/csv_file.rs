//! Reading and rewriting a table's backing CSV file.
//!
//! The file is a header row naming the schema's fields in order, followed by
//! one row per record. It is always rewritten whole: rows go to a sibling
//! temporary file which is then renamed over the real one, so a crash leaves
//! either the old or the new contents on disk.

use std::{
    ffi::OsString,
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{DatabaseError, Record, TableSchema};

/// A record read from disk along with the 1-based line it came from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LoadedRecord {
    pub line: u64,
    pub record: Record,
}

/// Path of the temporary file used while rewriting `path`.
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("table"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Reads every record in `path`.
///
/// A missing or zero-length file yields no records. Anything else has to
/// start with a header equal to `schema.fields`, and every row must have
/// exactly that many columns.
pub(crate) fn read_records(
    path: &Path,
    schema: &TableSchema,
) -> Result<Vec<LoadedRecord>, DatabaseError> {
    if !path.exists() {
        debug!(path = %path.display(), "no backing file, starting empty");
        return Ok(Vec::new());
    }

    if fs::metadata(path)?.len() == 0 {
        return Ok(Vec::new());
    }

    let load_error = |line: u64, reason: String| DatabaseError::Load {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(File::open(path)?);

    let header = reader
        .headers()
        .map_err(|e| load_error(1, e.to_string()))?
        .clone();
    if !header.iter().eq(schema.fields.iter().copied()) {
        return Err(load_error(
            1,
            format!(
                "header [{}] does not match fields [{}]",
                header.iter().collect::<Vec<_>>().join(", "),
                schema.fields.join(", ")
            ),
        ));
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| {
            let line = e.position().map_or(0, |pos| pos.line());
            load_error(line, e.to_string())
        })?;
        let line = row.position().map_or(0, |pos| pos.line());

        if row.len() != schema.fields.len() {
            return Err(load_error(
                line,
                format!(
                    "expected {} columns, found {}",
                    schema.fields.len(),
                    row.len()
                ),
            ));
        }

        let record = schema.fields.iter().copied().zip(row.iter()).collect();
        records.push(LoadedRecord { line, record });
    }

    debug!(path = %path.display(), rows = records.len(), "loaded backing file");
    Ok(records)
}

/// Rewrites `path` with `records`, header first, fields in schema order.
///
/// With `sync_writes` the temporary file is flushed to disk before the rename.
pub(crate) fn write_records(
    path: &Path,
    schema: &TableSchema,
    records: &[Record],
    sync_writes: bool,
) -> Result<(), DatabaseError> {
    let tmp_path = temp_path(path);

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)?;

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);

    writer.write_record(schema.fields)?;
    for record in records {
        writer.write_record(
            schema
                .fields
                .iter()
                .map(|field| record.get(field).unwrap_or_default()),
        )?;
    }

    let file = writer.into_inner().map_err(|e| e.into_error())?;
    if sync_writes {
        file.sync_all()?;
    }
    drop(file);

    if let Err(err) = fs::rename(&tmp_path, path) {
        fs::remove_file(&tmp_path).ok();
        return Err(err.into());
    }

    debug!(path = %path.display(), rows = records.len(), "rewrote backing file");
    Ok(())
}
