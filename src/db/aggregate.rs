use std::str::FromStr;

use strum::{Display, EnumString};

use crate::{DatabaseError, Record, Value};

/// Aggregations supported by [`crate::Catalog::aggregate`].
///
/// Names are matched case-insensitively; `average` is accepted for `avg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum AggregateOp {
    Min,
    Max,
    Count,
    #[strum(to_string = "avg", serialize = "average")]
    Avg,
}

impl AggregateOp {
    /// Looks up an operation by name.
    pub fn from_name(name: &str) -> Result<Self, DatabaseError> {
        name.trim()
            .parse()
            .map_err(|_| DatabaseError::UnknownOperation(name.to_string()))
    }

    /// Runs the aggregation over `field` of `records`.
    ///
    /// Records without the field are skipped. `min` and `max` compare
    /// numerically when every collected value is a number and as text
    /// otherwise. `avg` requires every value to be numeric. Over no values,
    /// `count` is 0 and the others are [`Value::Null`].
    pub fn apply(self, records: &[Record], field: &str) -> Result<Value, DatabaseError> {
        let values: Vec<&str> = records.iter().filter_map(|r| r.get(field)).collect();

        match self {
            AggregateOp::Count => Ok(Value::Int64(values.len() as i64)),
            AggregateOp::Avg => average(&values, field),
            AggregateOp::Min => Ok(extreme(&values, false)),
            AggregateOp::Max => Ok(extreme(&values, true)),
        }
    }
}

fn average(values: &[&str], field: &str) -> Result<Value, DatabaseError> {
    if values.is_empty() {
        return Ok(Value::Null);
    }

    let mut sum = 0.0;
    for value in values {
        sum += value
            .trim()
            .parse::<f64>()
            .map_err(|_| DatabaseError::NonNumericAggregation {
                field: field.to_string(),
                value: value.to_string(),
            })?;
    }

    Ok(Value::Float64(sum / values.len() as f64))
}

fn extreme(values: &[&str], max: bool) -> Value {
    if values.is_empty() {
        return Value::Null;
    }

    if let Some(integers) = parse_all::<i64>(values) {
        let picked = if max {
            integers.into_iter().max()
        } else {
            integers.into_iter().min()
        };
        return picked.map_or(Value::Null, Value::Int64);
    }

    if let Some(floats) = parse_all::<f64>(values) {
        let picked = if max {
            floats.into_iter().max_by(|a, b| a.total_cmp(b))
        } else {
            floats.into_iter().min_by(|a, b| a.total_cmp(b))
        };
        return picked.map_or(Value::Null, Value::Float64);
    }

    let picked = if max {
        values.iter().max()
    } else {
        values.iter().min()
    };
    picked.map_or(Value::Null, |text| Value::Text(text.to_string()))
}

fn parse_all<T: FromStr>(values: &[&str]) -> Option<Vec<T>> {
    values.iter().map(|value| value.trim().parse().ok()).collect()
}
