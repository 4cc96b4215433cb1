use std::fmt;

use crate::DatabaseError;

use super::record::Record;

/// How a table filters its records in [`super::Table::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectPredicate {
    /// Inclusive range over a field parsed as an integer.
    IntegerRange(&'static str),

    /// Inclusive range over a field parsed as a float.
    NumericRange(&'static str),

    /// Exact text match on a field.
    Equals(&'static str),
}

impl fmt::Display for SelectPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectPredicate::IntegerRange(field) => write!(f, "integer range over {field}"),
            SelectPredicate::NumericRange(field) => write!(f, "numeric range over {field}"),
            SelectPredicate::Equals(field) => write!(f, "exact match on {field}"),
        }
    }
}

/// Arguments for a select.
///
/// Which shape is valid depends on the table's [`SelectPredicate`]: ranges go
/// with `IntegerRange`/`NumericRange`, `Equals` goes with `Equals`.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Bounds are inclusive on both ends.
    Range { low: f64, high: f64 },

    Equals(String),
}

impl Selection {
    pub fn range<N: Into<f64>>(low: N, high: N) -> Self {
        Selection::Range {
            low: low.into(),
            high: high.into(),
        }
    }

    pub fn equals(value: impl Into<String>) -> Self {
        Selection::Equals(value.into())
    }
}

/// Describes one fixed table layout.
///
/// The three layouts the store knows about ([`TableSchema::EMPLOYEE`],
/// [`TableSchema::DEPARTMENT`], [`TableSchema::GOODS`]) differ only in this
/// data; [`super::Table`] itself has no per-layout code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    /// Name used in errors and logs.
    pub name: &'static str,

    /// Field names, in the order they are inserted and written to disk.
    pub fields: &'static [&'static str],

    /// Fields whose combined values must be unique. Empty means no constraint.
    pub unique_key: &'static [&'static str],

    pub predicate: SelectPredicate,

    /// Backing file name used when the table is opened inside a data directory.
    pub file_name: &'static str,
}

impl TableSchema {
    pub const EMPLOYEE: TableSchema = TableSchema {
        name: "employee",
        fields: &["id", "name", "age", "salary", "department_id"],
        unique_key: &["id", "department_id"],
        predicate: SelectPredicate::IntegerRange("id"),
        file_name: "employee_table.csv",
    };

    pub const DEPARTMENT: TableSchema = TableSchema {
        name: "department",
        fields: &["id", "department_name"],
        unique_key: &["id"],
        predicate: SelectPredicate::Equals("department_name"),
        file_name: "department_table.csv",
    };

    pub const GOODS: TableSchema = TableSchema {
        name: "goods",
        fields: &["id", "name", "price", "department_id"],
        unique_key: &[],
        predicate: SelectPredicate::NumericRange("price"),
        file_name: "goods_table.csv",
    };

    /// Finds the position of a field by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| *field == name)
    }

    pub fn has_unique_key(&self) -> bool {
        !self.unique_key.is_empty()
    }

    /// Parses a whitespace-separated insert string into a record.
    ///
    /// Tokens are matched to fields by position and the count has to match
    /// the schema exactly.
    pub fn parse_record(&self, raw: &str) -> Result<Record, DatabaseError> {
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        if tokens.len() != self.fields.len() {
            return Err(DatabaseError::MalformedRecord {
                table: self.name.to_string(),
                expected: self.fields.len(),
                found: tokens.len(),
            });
        }

        Ok(self.fields.iter().copied().zip(tokens).collect())
    }

    /// Returns the uniqueness key of `record`, or `None` for schemas without one.
    pub fn key_of(&self, record: &Record) -> Option<Vec<String>> {
        if !self.has_unique_key() {
            return None;
        }

        Some(
            self.unique_key
                .iter()
                .map(|field| record.get(field).unwrap_or_default().to_string())
                .collect(),
        )
    }

    /// Checks that `selection` has the shape this schema's predicate expects.
    pub fn check_selection(&self, selection: &Selection) -> Result<(), DatabaseError> {
        match (self.predicate, selection) {
            (
                SelectPredicate::IntegerRange(_) | SelectPredicate::NumericRange(_),
                Selection::Range { .. },
            )
            | (SelectPredicate::Equals(_), Selection::Equals(_)) => Ok(()),
            (predicate, selection) => Err(DatabaseError::InvalidArgument(format!(
                "table {} selects by {predicate}, got {selection:?}",
                self.name
            ))),
        }
    }

    /// Evaluates the schema's predicate against one record.
    ///
    /// Range predicates fail with [`DatabaseError::InvalidNumber`] when the
    /// field does not parse.
    pub fn matches(&self, record: &Record, selection: &Selection) -> Result<bool, DatabaseError> {
        match (self.predicate, selection) {
            (SelectPredicate::IntegerRange(field), Selection::Range { low, high }) => {
                let raw = record.get(field).unwrap_or_default();
                let value: i64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| invalid_number(field, raw))?;
                Ok((*low..=*high).contains(&(value as f64)))
            }
            (SelectPredicate::NumericRange(field), Selection::Range { low, high }) => {
                let raw = record.get(field).unwrap_or_default();
                let value: f64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| invalid_number(field, raw))?;
                Ok((*low..=*high).contains(&value))
            }
            (SelectPredicate::Equals(field), Selection::Equals(expected)) => {
                Ok(record.get(field) == Some(expected.as_str()))
            }
            _ => self.check_selection(selection).map(|_| false),
        }
    }
}

fn invalid_number(field: &str, raw: &str) -> DatabaseError {
    DatabaseError::InvalidNumber {
        field: field.to_string(),
        value: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_index() {
        let schema = TableSchema::EMPLOYEE;
        assert_eq!(schema.field_index("id"), Some(0));
        assert_eq!(schema.field_index("department_id"), Some(4));
        assert_eq!(schema.field_index("price"), None);
    }

    #[test]
    fn test_parse_record() {
        let record = TableSchema::EMPLOYEE
            .parse_record("1 Alice 30 70000 101")
            .unwrap();

        assert_eq!(record.get("id"), Some("1"));
        assert_eq!(record.get("name"), Some("Alice"));
        assert_eq!(record.get("age"), Some("30"));
        assert_eq!(record.get("salary"), Some("70000"));
        assert_eq!(record.get("department_id"), Some("101"));
    }

    #[test]
    fn test_parse_record_collapses_whitespace() {
        let record = TableSchema::DEPARTMENT
            .parse_record("  101 \t  HR  ")
            .unwrap();
        assert_eq!(record.get("id"), Some("101"));
        assert_eq!(record.get("department_name"), Some("HR"));
    }

    #[test]
    fn test_parse_record_wrong_arity() {
        let too_few = TableSchema::EMPLOYEE.parse_record("1 Alice 30");
        assert!(matches!(
            too_few,
            Err(DatabaseError::MalformedRecord {
                expected: 5,
                found: 3,
                ..
            })
        ));

        let too_many = TableSchema::DEPARTMENT.parse_record("101 HR extra");
        assert!(matches!(
            too_many,
            Err(DatabaseError::MalformedRecord {
                expected: 2,
                found: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_key_of() {
        let employee = TableSchema::EMPLOYEE
            .parse_record("1 Alice 30 70000 101")
            .unwrap();
        assert_eq!(
            TableSchema::EMPLOYEE.key_of(&employee),
            Some(vec!["1".to_string(), "101".to_string()])
        );

        let department = TableSchema::DEPARTMENT.parse_record("101 HR").unwrap();
        assert_eq!(
            TableSchema::DEPARTMENT.key_of(&department),
            Some(vec!["101".to_string()])
        );

        let goods = TableSchema::GOODS.parse_record("1 Laptop 1200 101").unwrap();
        assert_eq!(TableSchema::GOODS.key_of(&goods), None);
    }

    #[test]
    fn test_integer_range_is_inclusive() {
        let schema = TableSchema::EMPLOYEE;
        let record = schema.parse_record("2 Bob 28 60000 102").unwrap();

        assert!(schema.matches(&record, &Selection::range(1, 2)).unwrap());
        assert!(schema.matches(&record, &Selection::range(2, 2)).unwrap());
        assert!(!schema.matches(&record, &Selection::range(3, 9)).unwrap());
    }

    #[test]
    fn test_integer_range_rejects_non_integer_id() {
        let schema = TableSchema::EMPLOYEE;
        let record = schema.parse_record("1.5 Bob 28 60000 102").unwrap();

        let result = schema.matches(&record, &Selection::range(1, 2));
        assert!(matches!(
            result,
            Err(DatabaseError::InvalidNumber { ref field, ref value })
                if field == "id" && value == "1.5"
        ));
    }

    #[test]
    fn test_numeric_range() {
        let schema = TableSchema::GOODS;
        let keyboard = schema.parse_record("3 Keyboard 80 102").unwrap();
        let cable = schema.parse_record("4 Cable 9.99 102").unwrap();

        assert!(schema.matches(&keyboard, &Selection::range(60, 100)).unwrap());
        assert!(!schema.matches(&keyboard, &Selection::range(81, 100)).unwrap());
        assert!(
            schema
                .matches(&cable, &Selection::range(9.5, 10.0))
                .unwrap()
        );
    }

    #[test]
    fn test_equals() {
        let schema = TableSchema::DEPARTMENT;
        let record = schema.parse_record("101 HR").unwrap();

        assert!(schema.matches(&record, &Selection::equals("HR")).unwrap());
        assert!(!schema.matches(&record, &Selection::equals("hr")).unwrap());
    }

    #[test]
    fn test_selection_shape_mismatch() {
        assert!(matches!(
            TableSchema::DEPARTMENT.check_selection(&Selection::range(1, 2)),
            Err(DatabaseError::InvalidArgument(_))
        ));
        assert!(matches!(
            TableSchema::GOODS.check_selection(&Selection::equals("Laptop")),
            Err(DatabaseError::InvalidArgument(_))
        ));
        assert!(
            TableSchema::EMPLOYEE
                .check_selection(&Selection::range(1, 2))
                .is_ok()
        );
    }
}
