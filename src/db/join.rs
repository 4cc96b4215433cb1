use crate::{DatabaseError, Record};

/// Inner-joins record lists left to right with nested loops.
///
/// The first list seeds the result. Each following list `i` is joined on
/// `join_attrs[i - 1]`: a `(left, right)` pair keeps every combination where
/// the accumulated record's `left` field equals the new record's `right`
/// field as text. Records missing either field never match. Merged records
/// take the right-hand value on field collisions.
///
/// Output follows the accumulated order first, then the order of the list
/// being joined. Cost is the product of the input sizes.
pub(crate) fn nested_loop_join(
    inputs: &[&[Record]],
    join_attrs: &[(&str, &str)],
) -> Result<Vec<Record>, DatabaseError> {
    let Some((first, rest)) = inputs.split_first() else {
        return Err(too_few_tables());
    };
    if rest.is_empty() {
        return Err(too_few_tables());
    }

    if join_attrs.len() < rest.len() {
        return Err(DatabaseError::InvalidArgument(format!(
            "JOIN of {} tables needs {} join attribute pairs, got {}",
            inputs.len(),
            rest.len(),
            join_attrs.len()
        )));
    }

    let mut joined = first.to_vec();
    for (right_records, (left_field, right_field)) in rest.iter().zip(join_attrs) {
        let mut next = Vec::new();
        for left in &joined {
            let Some(left_value) = left.get(left_field) else {
                continue;
            };

            for right in right_records.iter() {
                if right.get(right_field) == Some(left_value) {
                    next.push(left.merged_with(right));
                }
            }
        }
        joined = next;
    }

    Ok(joined)
}

fn too_few_tables() -> DatabaseError {
    DatabaseError::InvalidArgument("JOIN requires at least two tables".to_string())
}
