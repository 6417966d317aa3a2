//! Column-addressable row snapshots.
//!
//! Some callers consume relationship queries as plain column maps instead of
//! typed entities. `RawRow` keeps every column of the result row, in select
//! order, addressable by name.

use rusqlite::types::Value;
use rusqlite::{Row, Statement};

/// One result row keyed by column name.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    columns: Vec<(String, Value)>,
}

impl RawRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let stmt: &Statement<'_> = row.as_ref();
        let mut columns = Vec::with_capacity(stmt.column_count());
        for (index, name) in stmt.column_names().into_iter().enumerate() {
            columns.push((name.to_string(), row.get::<_, Value>(index)?));
        }
        Ok(Self { columns })
    }

    /// Raw value for `column`, or `None` if the row has no such column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Text value for `column`. `None` for missing columns and non-text values.
    pub fn text(&self, column: &str) -> Option<&str> {
        match self.get(column)? {
            Value::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Integer value for `column`. `None` for missing columns and non-integers.
    pub fn integer(&self, column: &str) -> Option<i64> {
        match self.get(column)? {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

pub(crate) fn parse_raw_row(row: &Row<'_>) -> crate::repo::RepoResult<RawRow> {
    Ok(RawRow::from_row(row)?)
}
