use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{DatabaseError, StoreConfig, storage::csv_file};

pub mod record;
pub mod schema;

pub use record::Record;
pub use schema::{SelectPredicate, Selection, TableSchema};

/// A record store for one fixed schema, mirrored to a CSV file.
///
/// Records live in memory in insertion order. Every successful insert
/// rewrites the whole backing file, and opening a table reads that file
/// back. There is no update or delete.
#[derive(Debug)]
pub struct Table {
    schema: TableSchema,

    /// Location of the backing CSV file.
    path: PathBuf,

    /// Whether saves `fsync` before replacing the backing file.
    sync_writes: bool,

    records: Vec<Record>,

    /// Keys of every record in `records`; always empty for schemas without a
    /// uniqueness constraint.
    unique_keys: HashSet<Vec<String>>,
}

impl Table {
    /// Opens a table backed by `path`, loading any records already stored there.
    ///
    /// A missing file is not an error; the table simply starts empty.
    pub fn open<P: AsRef<Path>>(
        schema: TableSchema,
        path: P,
        sync_writes: bool,
    ) -> Result<Self, DatabaseError> {
        let mut table = Self {
            schema,
            path: path.as_ref().to_path_buf(),
            sync_writes,
            records: Vec::new(),
            unique_keys: HashSet::new(),
        };
        table.load()?;
        Ok(table)
    }

    /// Opens a table under the configured data directory, using the schema's
    /// default file name. The directory is created if needed.
    pub fn open_in(schema: TableSchema, config: &StoreConfig) -> Result<Self, DatabaseError> {
        fs::create_dir_all(&config.data_directory)?;
        Self::open(schema, config.table_path(&schema), config.sync_writes)
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records, in insertion order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a record with this uniqueness key is stored.
    pub fn contains_key(&self, key: &[String]) -> bool {
        self.unique_keys.contains(key)
    }

    /// Parses `raw` and appends it, then rewrites the backing file.
    ///
    /// Nothing changes, in memory or on disk, when the insert fails.
    pub fn insert(&mut self, raw: &str) -> Result<(), DatabaseError> {
        let record = self.schema.parse_record(raw)?;
        let key = self.schema.key_of(&record);

        if let Some(key) = &key {
            if self.unique_keys.contains(key) {
                warn!(table = self.schema.name, key = ?key, "rejected duplicate key");
                return Err(DatabaseError::DuplicateKey {
                    table: self.schema.name.to_string(),
                    key: key.clone(),
                });
            }
        }

        self.records.push(record);
        if let Err(err) = self.save() {
            self.records.pop();
            return Err(err);
        }

        if let Some(key) = key {
            self.unique_keys.insert(key);
        }

        debug!(table = self.schema.name, rows = self.records.len(), "inserted record");
        Ok(())
    }

    /// Returns the records matching `selection`, in insertion order.
    pub fn select(&self, selection: &Selection) -> Result<Vec<&Record>, DatabaseError> {
        self.schema.check_selection(selection)?;

        let mut matched = Vec::new();
        for record in &self.records {
            if self.schema.matches(record, selection)? {
                matched.push(record);
            }
        }

        Ok(matched)
    }

    /// Replaces the in-memory records with the contents of the backing file
    /// and rebuilds the key set.
    ///
    /// A duplicate key inside the file is reported as a load error; the table
    /// keeps its previous contents in that case.
    pub fn load(&mut self) -> Result<(), DatabaseError> {
        let loaded = csv_file::read_records(&self.path, &self.schema)?;

        let mut records = Vec::with_capacity(loaded.len());
        let mut unique_keys = HashSet::new();
        for csv_file::LoadedRecord { line, record } in loaded {
            if let Some(key) = self.schema.key_of(&record) {
                if !unique_keys.insert(key.clone()) {
                    return Err(DatabaseError::Load {
                        path: self.path.clone(),
                        line,
                        reason: format!("duplicate key ({})", key.join(", ")),
                    });
                }
            }
            records.push(record);
        }

        self.records = records;
        self.unique_keys = unique_keys;
        Ok(())
    }

    /// Rewrites the backing file from the in-memory records.
    pub fn save(&self) -> Result<(), DatabaseError> {
        csv_file::write_records(&self.path, &self.schema, &self.records, self.sync_writes)
    }
}
