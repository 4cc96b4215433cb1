use std::collections::{BTreeMap, BTreeSet};

use miette::Result;
use tracing::debug;

use crate::{
    DatabaseError, StoreConfig, Value,
    db::{aggregate::AggregateOp, join::nested_loop_join},
    db::table::{Record, Selection, Table, TableSchema},
    shell::{Command, parse_command},
};

/// Response from executing a shell command.
///
/// Holds the column headers and the result rows, already rendered as text.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponse {
    pub columns: Vec<String>,

    /// The rows returned by the command.
    pub rows: Vec<Vec<String>>,
}

impl QueryResponse {
    fn status(message: impl Into<String>) -> Self {
        Self {
            columns: vec!["status".to_string()],
            rows: vec![vec![message.into()]],
        }
    }
}

/// The registry of named tables.
///
/// `Catalog` is the entry point for everything the store does:
/// - Routing inserts and selects to the right [`Table`]
/// - Nested-loop joins across tables
/// - Aggregations over a single column
///
/// Construct one at startup and pass it to whatever needs it. The catalog
/// owns its tables; they have no lifecycle of their own and every mutation
/// is already on disk by the time a call returns, so there is nothing to
/// close.
#[derive(Debug, Default)]
pub struct Catalog {
    /// Maps table names to their stores.
    pub tables: BTreeMap<String, Table>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog with `employees`, `departments` and `goods`
    /// registered, each backed by its default file in the data directory.
    pub fn with_default_tables(config: &StoreConfig) -> Result<Self, DatabaseError> {
        let mut catalog = Self::new();
        catalog.register_table("employees", Table::open_in(TableSchema::EMPLOYEE, config)?);
        catalog.register_table(
            "departments",
            Table::open_in(TableSchema::DEPARTMENT, config)?,
        );
        catalog.register_table("goods", Table::open_in(TableSchema::GOODS, config)?);
        Ok(catalog)
    }

    /// Registers `table` under `name`, replacing whatever was there.
    pub fn register_table(&mut self, name: impl Into<String>, table: Table) {
        let name = name.into();
        debug!(table = %name, path = %table.path().display(), "registering table");
        self.tables.insert(name, table);
    }

    /// Gets an immutable reference to a table.
    pub fn get_table(&self, name: &str) -> Result<&Table, DatabaseError> {
        self.tables
            .get(name)
            .ok_or_else(|| DatabaseError::TableNotFound(name.to_string()))
    }

    /// Gets a mutable reference to a table.
    pub fn get_table_mut(&mut self, name: &str) -> Result<&mut Table, DatabaseError> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| DatabaseError::TableNotFound(name.to_string()))
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Inserts a whitespace-separated record into `table_name`.
    pub fn insert(&mut self, table_name: &str, raw: &str) -> Result<(), DatabaseError> {
        self.get_table_mut(table_name)?.insert(raw)
    }

    /// Selects from `table_name`.
    ///
    /// Returns `Ok(None)` when no such table is registered.
    pub fn select(
        &self,
        table_name: &str,
        selection: &Selection,
    ) -> Result<Option<Vec<&Record>>, DatabaseError> {
        self.tables
            .get(table_name)
            .map(|table| table.select(selection))
            .transpose()
    }

    /// Joins `tables` left to right, one `(left, right)` field pair per
    /// adjacent pair of tables.
    ///
    /// Matching pairs are merged with [`Record::merged_with`]. Fewer than two
    /// tables is an [`DatabaseError::InvalidArgument`].
    pub fn join(
        &self,
        tables: &[&Table],
        join_attrs: &[(&str, &str)],
    ) -> Result<Vec<Record>, DatabaseError> {
        let inputs: Vec<&[Record]> = tables.iter().map(|table| table.records()).collect();
        nested_loop_join(&inputs, join_attrs)
    }

    /// Same as [`Catalog::join`], looking tables up by name.
    pub fn join_tables(
        &self,
        table_names: &[&str],
        join_attrs: &[(&str, &str)],
    ) -> Result<Vec<Record>, DatabaseError> {
        let tables = table_names
            .iter()
            .map(|name| self.get_table(name))
            .collect::<Result<Vec<_>, _>>()?;
        self.join(&tables, join_attrs)
    }

    /// Aggregates `field` over every record of `table_name`.
    ///
    /// `operation` is one of `min`, `max`, `count` or `avg`.
    pub fn aggregate(
        &self,
        table_name: &str,
        operation: &str,
        field: &str,
    ) -> Result<Value, DatabaseError> {
        let table = self.get_table(table_name)?;
        AggregateOp::from_name(operation)?.apply(table.records(), field)
    }

    /// Parses and runs one shell command.
    pub fn execute_command(&mut self, input: &str) -> Result<QueryResponse> {
        let response = match parse_command(input)? {
            Command::Insert { table, values } => {
                self.insert(&table, &values)?;
                QueryResponse::status(format!("INSERT 1 into {table}"))
            }
            Command::Select { table, selection } => {
                let schema = *self.get_table(&table)?.schema();
                let records = self
                    .select(&table, &selection)?
                    .ok_or_else(|| DatabaseError::TableNotFound(table.clone()))?;

                let columns: Vec<String> = schema.fields.iter().map(|f| f.to_string()).collect();
                let rows = records
                    .into_iter()
                    .map(|record| render_row(record, &columns))
                    .collect();
                QueryResponse { columns, rows }
            }
            Command::Join { tables, on } => {
                let names: Vec<&str> = tables.iter().map(String::as_str).collect();
                let pairs: Vec<(&str, &str)> = on
                    .iter()
                    .map(|(left, right)| (left.as_str(), right.as_str()))
                    .collect();
                let joined = self.join_tables(&names, &pairs)?;

                let columns: Vec<String> = names
                    .iter()
                    .map(|name| self.get_table(name).map(|t| t.schema().fields))
                    .collect::<Result<Vec<_>, _>>()?
                    .into_iter()
                    .flatten()
                    .map(|field| field.to_string())
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect();
                let rows = joined
                    .iter()
                    .map(|record| render_row(record, &columns))
                    .collect();
                QueryResponse { columns, rows }
            }
            Command::Aggregate {
                table,
                operation,
                field,
            } => {
                let value = self.aggregate(&table, &operation, &field)?;
                QueryResponse {
                    columns: vec![format!("{}({field})", operation.to_lowercase())],
                    rows: vec![vec![value.to_string()]],
                }
            }
            Command::Tables => QueryResponse {
                columns: vec!["table".to_string(), "rows".to_string(), "file".to_string()],
                rows: self
                    .tables
                    .iter()
                    .map(|(name, table)| {
                        vec![
                            name.clone(),
                            table.len().to_string(),
                            table.path().display().to_string(),
                        ]
                    })
                    .collect(),
            },
        };

        Ok(response)
    }
}

fn render_row(record: &Record, columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .map(|column| record.get(column).unwrap_or_default().to_string())
        .collect()
}
