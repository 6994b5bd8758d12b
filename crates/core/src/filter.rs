use std::collections::HashSet;

use crate::domain::{CellValue, Table};
use crate::error::SchemaError;

/// Keeps the records whose `column` equals `value`, in their original order.
/// `CellValue::Missing` selects only missing cells.
pub fn filter_by_value(table: &Table, column: &str, value: &CellValue) -> Result<Table, SchemaError> {
    let idx = table.column_index(column)?;
    let records = table
        .records()
        .iter()
        .filter(|record| record.get(idx) == value)
        .cloned()
        .collect();
    Ok(table.with_records(records))
}

/// Distinct values of `column` in the order they first appear
pub fn unique_values(table: &Table, column: &str) -> Result<Vec<CellValue>, SchemaError> {
    let idx = table.column_index(column)?;
    let mut seen = HashSet::new();
    Ok(table
        .records()
        .iter()
        .map(|record| record.get(idx))
        .filter(|value| seen.insert(*value))
        .cloned()
        .collect())
}
