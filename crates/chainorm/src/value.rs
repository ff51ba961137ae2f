//! Dynamically typed values exchanged with the driver.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Timestamp text formats accepted when a driver returns timestamps as text.
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// A single bound parameter or decoded column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    /// Integers up to 32 bits wide (signed).
    I32(i32),
    /// Unsigned 32-bit integers.
    U32(u32),
    I64(i64),
    U64(u64),
    F64(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(NaiveDateTime),
    /// Expands into one placeholder per element inside a where fragment.
    List(Vec<Value>),
}

/// Column type tag of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    /// Integers up to 32 bits wide.
    Int,
    /// 64-bit integers.
    BigInt,
    Double,
    Text,
    Bytes,
    Timestamp,
}

impl Value {
    /// Build a list argument, e.g. for `id in (?)`.
    pub fn list<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Integer view of the value; text holding an integer also qualifies.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Bool(b) => Some(i64::from(*b)),
            Self::I32(v) => Some(i64::from(*v)),
            Self::U32(v) => Some(i64::from(*v)),
            Self::I64(v) => Some(*v),
            Self::U64(v) => i64::try_from(*v).ok(),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Bytes(b) => std::str::from_utf8(b).ok()?.trim().parse().ok(),
            _ => None,
        }
    }

    /// True for NULL and for the default timestamp, the "never set" instant.
    pub fn is_zero_instant(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Timestamp(t) => *t == NaiveDateTime::default(),
            _ => false,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "bool",
            Self::I32(_) | Self::U32(_) | Self::I64(_) | Self::U64(_) => "integer",
            Self::F64(_) => "float",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Timestamp(_) => "timestamp",
            Self::List(_) => "list",
        }
    }
}

/// Conversion between a record field type and [`Value`].
///
/// Implemented for the field types a record may persist; the derive macro
/// requires it for every non-skipped field, so unsupported types fail to
/// compile.
pub trait SqlValue: Sized {
    /// Column kind used for type inference.
    const KIND: ValueKind;

    fn to_value(&self) -> Value;

    /// Decode a column value. The error is a human readable reason.
    fn from_value(value: Value) -> Result<Self, String>;
}

fn mismatch(expected: &str, found: &Value) -> String {
    format!("expected {expected}, found {}", found.describe())
}

macro_rules! impl_sql_value_int {
    ($($ty:ty => $kind:ident, $variant:ident);* $(;)?) => {
        $(
            impl SqlValue for $ty {
                const KIND: ValueKind = ValueKind::$kind;

                fn to_value(&self) -> Value {
                    Value::$variant((*self).into())
                }

                fn from_value(value: Value) -> Result<Self, String> {
                    let wide = match &value {
                        Value::U64(v) => return <$ty>::try_from(*v).map_err(|e| e.to_string()),
                        other => other.as_i64(),
                    };
                    match wide {
                        Some(v) => <$ty>::try_from(v).map_err(|e| e.to_string()),
                        None => Err(mismatch(stringify!($ty), &value)),
                    }
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

impl_sql_value_int! {
    i8 => Int, I32;
    i16 => Int, I32;
    i32 => Int, I32;
    u8 => Int, U32;
    u16 => Int, U32;
    u32 => Int, U32;
    i64 => BigInt, I64;
    u64 => BigInt, U64;
}

impl SqlValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Bool(b) => Ok(b),
            other => other
                .as_i64()
                .map(|v| v != 0)
                .ok_or_else(|| mismatch("bool", &other)),
        }
    }
}

impl SqlValue for f64 {
    const KIND: ValueKind = ValueKind::Double;

    fn to_value(&self) -> Value {
        Value::F64(*self)
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::F64(v) => Ok(v),
            Value::Text(ref s) => s.trim().parse().map_err(|_| mismatch("f64", &value)),
            Value::Bytes(ref b) => std::str::from_utf8(b)
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .ok_or_else(|| mismatch("f64", &value)),
            other => other
                .as_i64()
                .map(|v| v as f64)
                .ok_or_else(|| mismatch("f64", &other)),
        }
    }
}

impl SqlValue for f32 {
    const KIND: ValueKind = ValueKind::Double;

    fn to_value(&self) -> Value {
        Value::F64(f64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, String> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl SqlValue for String {
    const KIND: ValueKind = ValueKind::Text;

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Bytes(b) => String::from_utf8(b).map_err(|e| e.to_string()),
            other => Err(mismatch("text", &other)),
        }
    }
}

impl SqlValue for Vec<u8> {
    const KIND: ValueKind = ValueKind::Bytes;

    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Bytes(b) => Ok(b),
            Value::Text(s) => Ok(s.into_bytes()),
            other => Err(mismatch("bytes", &other)),
        }
    }
}

impl SqlValue for NaiveDateTime {
    const KIND: ValueKind = ValueKind::Timestamp;

    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Timestamp(t) => Ok(t),
            Value::Text(ref s) => {
                parse_timestamp(s).ok_or_else(|| mismatch("timestamp", &value))
            }
            Value::Bytes(ref b) => std::str::from_utf8(b)
                .ok()
                .and_then(parse_timestamp)
                .ok_or_else(|| mismatch("timestamp", &value)),
            other => Err(mismatch("timestamp", &other)),
        }
    }
}

impl SqlValue for DateTime<Utc> {
    const KIND: ValueKind = ValueKind::Timestamp;

    fn to_value(&self) -> Value {
        Value::Timestamp(self.naive_utc())
    }

    fn from_value(value: Value) -> Result<Self, String> {
        NaiveDateTime::from_value(value).map(|t| t.and_utc())
    }
}

impl<T: SqlValue> SqlValue for Option<T> {
    const KIND: ValueKind = T::KIND;

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s.trim(), fmt).ok())
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F64(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v.naive_utc())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Positional arguments for a where fragment.
///
/// Implemented for `()`, arrays, `Vec`s and tuples of up to eight values:
///
/// ```ignore
/// db.where_("name = ? AND age > ?", ("3", 20)).find(&mut users).await;
/// ```
pub trait IntoArgs {
    fn into_args(self) -> Vec<Value>;
}

impl IntoArgs for () {
    fn into_args(self) -> Vec<Value> {
        Vec::new()
    }
}

impl<T: Into<Value>> IntoArgs for Vec<T> {
    fn into_args(self) -> Vec<Value> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<Value>, const N: usize> IntoArgs for [T; N] {
    fn into_args(self) -> Vec<Value> {
        self.into_iter().map(Into::into).collect()
    }
}

macro_rules! impl_into_args_tuple {
    ($($name:ident),+) => {
        impl<$($name: Into<Value>),+> IntoArgs for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_args(self) -> Vec<Value> {
                let ($($name,)+) = self;
                vec![$($name.into()),+]
            }
        }
    };
}

impl_into_args_tuple!(A);
impl_into_args_tuple!(A, B);
impl_into_args_tuple!(A, B, C);
impl_into_args_tuple!(A, B, C, D);
impl_into_args_tuple!(A, B, C, D, E);
impl_into_args_tuple!(A, B, C, D, E, F);
impl_into_args_tuple!(A, B, C, D, E, F, G);
impl_into_args_tuple!(A, B, C, D, E, F, G, H);
