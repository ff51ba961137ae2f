//! Record descriptors: how a struct maps to a table.

use crate::error::{OrmError, OrmResult};
use crate::naming;
use crate::sql_type::{column_sql_type, primary_key_sql_type};
use crate::value::{SqlValue, Value, ValueKind};
use chrono::{NaiveDateTime, Utc};

/// Declared name of the primary key field.
pub const PRIMARY_KEY: &str = "id";

const CREATED_AT: &str = "created_at";
const UPDATED_AT: &str = "updated_at";

/// Static metadata of one persisted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
    /// Declared (Rust) field name.
    pub name: &'static str,
    pub kind: ValueKind,
}

/// A struct that can be stored as a table row.
///
/// This trait should typically be derived using `#[derive(Model)]`
/// from the `chainorm-derive` crate. Implementing it by hand is the explicit
/// registration path:
///
/// ```ignore
/// use chainorm::{FieldMeta, Model, OrmResult, SqlValue, Value, ValueKind};
///
/// #[derive(Default)]
/// struct Tag {
///     id: i64,
///     label: String,
/// }
///
/// impl Model for Tag {
///     const TYPE_NAME: &'static str = "Tag";
///     const FIELDS: &'static [FieldMeta] = &[
///         FieldMeta { name: "id", kind: ValueKind::BigInt },
///         FieldMeta { name: "label", kind: ValueKind::Text },
///     ];
///
///     fn get(&self, field: &str) -> Option<Value> {
///         match field {
///             "id" => Some(self.id.to_value()),
///             "label" => Some(self.label.to_value()),
///             _ => None,
///         }
///     }
///
///     fn set(&mut self, field: &str, value: Value) -> OrmResult<bool> {
///         match field {
///             "id" => self.id = chainorm::decode_field("id", value)?,
///             "label" => self.label = chainorm::decode_field("label", value)?,
///             _ => return Ok(false),
///         }
///         Ok(true)
///     }
/// }
/// ```
pub trait Model: Default + Send + Sync {
    /// Bare type name used to infer the table name.
    const TYPE_NAME: &'static str;

    /// Explicit table name, overriding inference.
    const TABLE: Option<&'static str> = None;

    /// Persisted fields in declaration order.
    const FIELDS: &'static [FieldMeta];

    /// Current value of a field by declared name.
    fn get(&self, field: &str) -> Option<Value>;

    /// Assign a field by declared name. Returns `Ok(false)` when there is no
    /// such field.
    fn set(&mut self, field: &str, value: Value) -> OrmResult<bool>;
}

/// Decode a value for a named field, used by generated `Model::set` bodies.
pub fn decode_field<T: SqlValue>(field: &str, value: Value) -> OrmResult<T> {
    T::from_value(value).map_err(|message| OrmError::decode(field, message))
}

/// The operation a field enumeration is performed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    /// No timestamp stamping (schema generation).
    Neutral,
}

/// One field of a record, resolved for a single operation.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub db_name: String,
    pub value: Value,
    pub sql_type: String,
    pub is_primary_key: bool,
    pub auto_create_time: bool,
    pub auto_update_time: bool,
}

/// Read-only view over a record (or just its type) for statement building.
///
/// The clock is read once per descriptor so every enumeration for the same
/// statement agrees on the stamped timestamps.
pub struct Descriptor<'a, M: Model> {
    record: Option<&'a M>,
    now: NaiveDateTime,
}

impl<'a, M: Model> Descriptor<'a, M> {
    pub fn new(record: &'a M) -> Self {
        Self {
            record: Some(record),
            now: Utc::now().naive_utc(),
        }
    }

    /// A descriptor for the type alone, with no record bound.
    pub fn detached() -> Self {
        Self {
            record: None,
            now: Utc::now().naive_utc(),
        }
    }

    pub(crate) fn from_option(record: Option<&'a M>) -> Self {
        match record {
            Some(r) => Self::new(r),
            None => Self::detached(),
        }
    }

    #[cfg(test)]
    pub(crate) fn at(record: &'a M, now: NaiveDateTime) -> Self {
        Self {
            record: Some(record),
            now,
        }
    }

    pub fn table_name(&self) -> String {
        match M::TABLE {
            Some(table) => table.to_string(),
            None => naming::table_name_for(M::TYPE_NAME),
        }
    }

    pub fn primary_key(&self) -> &'static str {
        PRIMARY_KEY
    }

    pub fn primary_key_column(&self) -> String {
        naming::declared_to_column(PRIMARY_KEY)
    }

    /// The record's id, `0` when missing or not an integer, `-1` when no
    /// record is bound.
    pub fn primary_key_value(&self) -> i64 {
        let Some(record) = self.record else {
            return -1;
        };
        record
            .get(PRIMARY_KEY)
            .and_then(|v| v.as_i64())
            .unwrap_or(0)
    }

    /// Zero and negative ids both count as "not persisted yet".
    pub fn primary_key_is_zero(&self) -> bool {
        self.primary_key_value() <= 0
    }

    /// All persisted fields in declaration order, with timestamps stamped for `op`.
    pub fn fields(&self, op: Operation) -> OrmResult<Vec<FieldDescriptor>> {
        let pk_column = self.primary_key_column();
        M::FIELDS
            .iter()
            .map(|meta| {
                let db_name = naming::declared_to_column(meta.name);
                let is_primary_key = db_name == pk_column;
                let auto_create_time = db_name == CREATED_AT;
                let auto_update_time = db_name == UPDATED_AT;

                let current = self
                    .record
                    .and_then(|r| r.get(meta.name))
                    .unwrap_or(Value::Null);
                let value = self
                    .stamp(op, meta, auto_create_time, auto_update_time, &current)
                    .unwrap_or(current);

                let sql_type = if is_primary_key {
                    primary_key_sql_type(&db_name, meta.kind)?
                } else {
                    column_sql_type(meta.kind, 0)
                };

                Ok(FieldDescriptor {
                    name: meta.name,
                    db_name,
                    value,
                    sql_type,
                    is_primary_key,
                    auto_create_time,
                    auto_update_time,
                })
            })
            .collect()
    }

    /// Non-key columns and their values, in declaration order.
    pub fn columns_and_values(&self, op: Operation) -> OrmResult<Vec<(String, Value)>> {
        Ok(self
            .fields(op)?
            .into_iter()
            .filter(|f| !f.is_primary_key)
            .map(|f| (f.db_name, f.value))
            .collect())
    }

    /// Timestamp values produced for `op`, keyed by declared field name.
    ///
    /// These are the values that must be written back into the record once
    /// the statement has been accepted.
    pub fn stamps(&self, op: Operation) -> Vec<(&'static str, Value)> {
        M::FIELDS
            .iter()
            .filter_map(|meta| {
                let db_name = naming::declared_to_column(meta.name);
                let current = self
                    .record
                    .and_then(|r| r.get(meta.name))
                    .unwrap_or(Value::Null);
                self.stamp(
                    op,
                    meta,
                    db_name == CREATED_AT,
                    db_name == UPDATED_AT,
                    &current,
                )
                .map(|v| (meta.name, v))
            })
            .collect()
    }

    fn stamp(
        &self,
        op: Operation,
        meta: &FieldMeta,
        auto_create_time: bool,
        auto_update_time: bool,
        current: &Value,
    ) -> Option<Value> {
        if meta.kind != ValueKind::Timestamp {
            return None;
        }
        let stamped = match op {
            Operation::Create => {
                (auto_create_time || auto_update_time) && current.is_zero_instant()
            }
            Operation::Update => auto_update_time,
            Operation::Neutral => false,
        };
        stamped.then_some(Value::Timestamp(self.now))
    }
}
