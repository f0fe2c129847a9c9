//! Schema and data validation for dumps submitted to the store.
//!
//! Columns are checked one at a time in schema order; the first failing rule
//! wins. Per column: presence, uniqueness, position, trailing fields (last
//! column only), then data type. Data rules run only once the whole dump is
//! schema-valid.

use saros_error::{Result, SarosError};
use saros_types::{Column, ColumnType, DocRecord, doc_id};

use crate::dump::DocDump;

/// Decode a dump into a record, enforcing the db schema and data rules.
///
/// # Errors
/// Schema errors (`MissingColumn`, `DuplicateColumn`,
/// `ColumnPositionMismatch`, `SchemaSizeMismatch`, `BadDataType`) or data
/// errors (`BadName`, `BadRevision`, `BadId`, `BadPrev`, `BadLast`).
pub fn decode_record(dump: &DocDump) -> Result<DocRecord> {
    let fields = dump.fields();

    let id = associated_value(Column::Id, fields)?;
    let name = associated_value(Column::Name, fields)?;
    let rev = integer_value(Column::Rev, fields)?;
    let prev = integer_value(Column::Prev, fields)?;
    let last = integer_value(Column::Last, fields)?;
    let content = associated_value(Column::Content, fields)?;

    if name.trim().is_empty() {
        return Err(SarosError::BadName {
            id: id.to_owned(),
            fields: fields.to_vec(),
        });
    }
    if rev < 1 {
        return Err(SarosError::BadRevision {
            id: id.to_owned(),
            rev,
            fields: fields.to_vec(),
        });
    }
    if id != doc_id(name, rev) {
        return Err(SarosError::BadId {
            id: id.to_owned(),
            name: name.to_owned(),
            rev,
            fields: fields.to_vec(),
        });
    }
    if prev != 0 && prev != rev - 1 {
        return Err(SarosError::BadPrev {
            id: id.to_owned(),
            rev,
            prev,
            fields: fields.to_vec(),
        });
    }
    if last < rev {
        return Err(SarosError::BadLast {
            id: id.to_owned(),
            rev,
            last,
            fields: fields.to_vec(),
        });
    }

    Ok(DocRecord::new(name, rev, prev, last, content))
}

/// The unique value for `col`, if it sits at its schema position.
fn associated_value(col: Column, fields: &[(String, String)]) -> Result<&str> {
    let positions: Vec<usize> = fields
        .iter()
        .enumerate()
        .filter(|(_, (name, _))| name == col.name())
        .map(|(idx, _)| idx)
        .collect();

    let position = match positions.as_slice() {
        [] => {
            return Err(SarosError::MissingColumn {
                column: col.name(),
                fields: fields.to_vec(),
            });
        }
        [position] => *position,
        many => {
            return Err(SarosError::DuplicateColumn {
                column: col.name(),
                count: many.len(),
                fields: fields.to_vec(),
            });
        }
    };

    if position != col.index() {
        return Err(SarosError::ColumnPositionMismatch {
            column: col.name(),
            expected: col.index(),
            found: position,
            fields: fields.to_vec(),
        });
    }
    if col.is_last_column() && fields.len() != Column::COUNT {
        return Err(SarosError::SchemaSizeMismatch {
            column: col.name(),
            expected: Column::COUNT,
            found: fields.len(),
            fields: fields.to_vec(),
        });
    }

    let value = fields[position].1.as_str();
    if col.column_type() == ColumnType::Integer && parse_integer(value).is_none() {
        return Err(SarosError::BadDataType {
            column: col.name(),
            value: value.to_owned(),
            fields: fields.to_vec(),
        });
    }
    Ok(value)
}

fn integer_value(col: Column, fields: &[(String, String)]) -> Result<i64> {
    let value = associated_value(col, fields)?;
    parse_integer(value).ok_or_else(|| {
        SarosError::internal(format!(
            "column '{}' passed type check but {value:?} is not an integer",
            col.name()
        ))
    })
}

/// Decimal ASCII integer with an optional leading `-`.
fn parse_integer(value: &str) -> Option<i64> {
    if value.starts_with('+') {
        return None;
    }
    value.parse().ok()
}
