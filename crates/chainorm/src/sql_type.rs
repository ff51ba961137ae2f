//! Column type inference for the MySQL dialect.

use crate::error::{OrmError, OrmResult};
use crate::value::ValueKind;

const PRIMARY_KEY_SUFFIX: &str = " NOT NULL AUTO_INCREMENT PRIMARY KEY";

/// Sized variants are only emitted below this bound.
const MAX_SIZED_COLUMN: usize = 65532;

/// Column type for an auto-increment primary key.
///
/// Only integer kinds can back an auto-increment key; anything else is a
/// record definition error.
pub fn primary_key_sql_type(column: &str, kind: ValueKind) -> OrmResult<String> {
    let base = match kind {
        ValueKind::Int => "int",
        ValueKind::BigInt => "bigint",
        other => {
            return Err(OrmError::unsupported_type(
                column,
                format!("primary key must be an integer, got {other:?}"),
            ));
        }
    };
    Ok(format!("{base}{PRIMARY_KEY_SUFFIX}"))
}

/// Column type for an ordinary field.
///
/// `size` selects `varchar(n)` / `varbinary(n)` when `0 < size < 65532`;
/// otherwise the unbounded `longtext` / `longblob` are used.
pub fn column_sql_type(kind: ValueKind, size: usize) -> String {
    let sized = size > 0 && size < MAX_SIZED_COLUMN;
    match kind {
        ValueKind::Timestamp => "timestamp".to_string(),
        ValueKind::Bool => "boolean".to_string(),
        ValueKind::Int => "int".to_string(),
        ValueKind::BigInt => "bigint".to_string(),
        ValueKind::Double => "double".to_string(),
        ValueKind::Bytes if sized => format!("varbinary({size})"),
        ValueKind::Bytes => "longblob".to_string(),
        ValueKind::Text if sized => format!("varchar({size})"),
        ValueKind::Text => "longtext".to_string(),
    }
}
