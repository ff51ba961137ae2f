//! Hand-written models and a scripted driver for unit tests.

use crate::driver::{Driver, ExecResult, RowSet};
use crate::error::{OrmError, OrmResult};
use crate::model::{FieldMeta, Model, decode_field};
use crate::value::{SqlValue, Value, ValueKind};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::VecDeque;
use std::sync::Mutex;

pub(crate) fn ts(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct User {
    pub id: i64,
    pub age: i64,
    pub birthday: NaiveDateTime,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Model for User {
    const TYPE_NAME: &'static str = "User";
    const FIELDS: &'static [FieldMeta] = &[
        FieldMeta {
            name: "id",
            kind: ValueKind::BigInt,
        },
        FieldMeta {
            name: "age",
            kind: ValueKind::BigInt,
        },
        FieldMeta {
            name: "birthday",
            kind: ValueKind::Timestamp,
        },
        FieldMeta {
            name: "name",
            kind: ValueKind::Text,
        },
        FieldMeta {
            name: "created_at",
            kind: ValueKind::Timestamp,
        },
        FieldMeta {
            name: "updated_at",
            kind: ValueKind::Timestamp,
        },
    ];

    fn get(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.to_value()),
            "age" => Some(self.age.to_value()),
            "birthday" => Some(self.birthday.to_value()),
            "name" => Some(self.name.to_value()),
            "created_at" => Some(self.created_at.to_value()),
            "updated_at" => Some(self.updated_at.to_value()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> OrmResult<bool> {
        match field {
            "id" => self.id = decode_field(field, value)?,
            "age" => self.age = decode_field(field, value)?,
            "birthday" => self.birthday = decode_field(field, value)?,
            "name" => self.name = decode_field(field, value)?,
            "created_at" => self.created_at = decode_field(field, value)?,
            "updated_at" => self.updated_at = decode_field(field, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// A model with an explicit table name and a narrow key.
#[derive(Debug, Default)]
pub(crate) struct Account {
    pub id: i32,
    pub email: String,
}

impl Model for Account {
    const TYPE_NAME: &'static str = "Account";
    const TABLE: Option<&'static str> = Some("member_accounts");
    const FIELDS: &'static [FieldMeta] = &[
        FieldMeta {
            name: "id",
            kind: ValueKind::Int,
        },
        FieldMeta {
            name: "email",
            kind: ValueKind::Text,
        },
    ];

    fn get(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.to_value()),
            "email" => Some(self.email.to_value()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> OrmResult<bool> {
        match field {
            "id" => self.id = decode_field(field, value)?,
            "email" => self.email = decode_field(field, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// A model whose key cannot auto-increment.
#[derive(Debug, Default)]
pub(crate) struct Gadget {
    pub id: String,
}

impl Model for Gadget {
    const TYPE_NAME: &'static str = "Gadget";
    const FIELDS: &'static [FieldMeta] = &[FieldMeta {
        name: "id",
        kind: ValueKind::Text,
    }];

    fn get(&self, field: &str) -> Option<Value> {
        (field == "id").then(|| self.id.to_value())
    }

    fn set(&mut self, field: &str, value: Value) -> OrmResult<bool> {
        if field != "id" {
            return Ok(false);
        }
        self.id = decode_field(field, value)?;
        Ok(true)
    }
}

/// Scripted driver response.
pub(crate) enum Reply {
    Exec(ExecResult),
    Rows(RowSet),
    Fail(String),
}

/// Records every call and replays scripted replies in order. Unscripted
/// calls succeed with an empty result.
#[derive(Default)]
pub(crate) struct MockDriver {
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    replies: Mutex<VecDeque<Reply>>,
}

impl MockDriver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(self, reply: Reply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub(crate) fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn sql(&self) -> Vec<String> {
        self.calls().into_iter().map(|(sql, _)| sql).collect()
    }

    fn next(&self, sql: &str, params: &[Value]) -> Option<Reply> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        self.replies.lock().unwrap().pop_front()
    }
}

impl Driver for MockDriver {
    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<ExecResult> {
        match self.next(sql, params) {
            Some(Reply::Exec(result)) => Ok(result),
            Some(Reply::Fail(message)) => Err(OrmError::Other(message)),
            Some(Reply::Rows(_)) => Err(OrmError::Other("rows scripted for execute".into())),
            None => Ok(ExecResult::default()),
        }
    }

    async fn query(&self, sql: &str, params: &[Value]) -> OrmResult<RowSet> {
        match self.next(sql, params) {
            Some(Reply::Rows(rows)) => Ok(rows),
            Some(Reply::Fail(message)) => Err(OrmError::Other(message)),
            Some(Reply::Exec(_)) => Err(OrmError::Other("exec scripted for query".into())),
            None => Ok(RowSet::default()),
        }
    }
}
