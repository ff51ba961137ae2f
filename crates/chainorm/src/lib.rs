//! # chainorm
//!
//! A small chainable ORM for MySQL that maps plain structs to tables.
//!
//! ## Features
//!
//! - **Convention over configuration**: table names, column names and column
//!   types are inferred from the struct (`UserProfile` → `user_profiles`,
//!   `CreatedAt` → `created_at`)
//! - **Chainable queries**: accumulate `where_` / `order` and finish with a
//!   terminal such as `first`, `find`, `save` or `delete`
//! - **Errors stay on the chain**: terminals never fail across the call; read
//!   them back with `error()` / `errors()` / `result()`
//! - **Automatic timestamps**: `created_at` / `updated_at` are stamped on
//!   create and update
//! - **Pluggable driver**: the bundled `mysql_async` pool, or anything that
//!   implements [`Driver`]
//!
//! ## Example
//!
//! ```ignore
//! use chainorm::prelude::*;
//! use chrono::NaiveDateTime;
//!
//! #[derive(Debug, Default, Model)]
//! struct User {
//!     id: i64,
//!     name: String,
//!     age: i64,
//!     created_at: NaiveDateTime,
//!     updated_at: NaiveDateTime,
//! }
//!
//! let db = Db::open("mysql://root@localhost:3306/app")?;
//! db.create_table::<User>().await;
//!
//! let mut user = User { name: "jinzhu".into(), age: 18, ..Default::default() };
//! db.save(&mut user).await.result()?;
//!
//! let mut adults = Vec::new();
//! let chain = db
//!     .where_("age >= ?", (18,))
//!     .order("age desc")
//!     .find(&mut adults)
//!     .await;
//! chain.result()?;
//!
//! let mut found = User::default();
//! db.first_where(&mut found, "id in (?)", (Value::list([1, 2, 3]),)).await;
//! ```

// Generated code refers to `chainorm::...`, including inside this crate's tests.
extern crate self as chainorm;

pub mod chain;
pub mod config;
pub mod db;
pub mod driver;
pub mod error;
pub mod model;
pub mod naming;
pub mod prelude;
pub mod sql_type;
pub mod statement;
pub mod value;

mod scan;

#[cfg(feature = "mysql")]
pub mod mysql;

#[cfg(test)]
mod test_support;

pub use chain::Chain;
pub use config::DbConfig;
pub use db::Db;
pub use driver::{Driver, ExecResult, RowSet};
pub use error::{ErrorLog, OrmError, OrmResult};
pub use model::{Descriptor, FieldDescriptor, FieldMeta, Model, Operation, decode_field};
pub use statement::{Statement, WhereClause};
pub use value::{IntoArgs, SqlValue, Value, ValueKind};

#[cfg(feature = "mysql")]
pub use db::MySqlDb;
#[cfg(feature = "mysql")]
pub use mysql::MySql;

#[cfg(feature = "derive")]
pub use chainorm_derive::Model;
