//! Where tables keep their files, and how carefully they write them.

use std::path::{Path, PathBuf};

use crate::TableSchema;

/// Environment variable overriding [`StoreConfig::data_directory`].
pub const DATA_DIR_ENV: &str = "SCRIBE_DATA_DIR";

/// Environment variable overriding [`StoreConfig::sync_writes`].
pub const SYNC_WRITES_ENV: &str = "SCRIBE_SYNC_WRITES";

/// Storage settings shared by every table opened through
/// [`crate::Table::open_in`] or [`crate::Catalog::with_default_tables`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding one CSV file per table.
    pub data_directory: PathBuf,

    /// `fsync` each rewritten file before it replaces the old one.
    pub sync_writes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_directory: PathBuf::from("./data"),
            sync_writes: true,
        }
    }
}

impl StoreConfig {
    pub fn new<P: AsRef<Path>>(data_directory: P) -> Self {
        Self {
            data_directory: data_directory.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    /// Defaults overridden by `SCRIBE_DATA_DIR` and `SCRIBE_SYNC_WRITES`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|dir| !dir.trim().is_empty()) {
            config.data_directory = PathBuf::from(dir);
        }

        if let Some(flag) = lookup(SYNC_WRITES_ENV) {
            config.sync_writes = !matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            );
        }

        config
    }

    /// Backing file for `schema` inside the data directory.
    pub fn table_path(&self, schema: &TableSchema) -> PathBuf {
        self.data_directory.join(schema.file_name)
    }
}
