//! Convenient imports for typical `chainorm` usage.
//!
//! ```ignore
//! use chainorm::prelude::*;
//! ```

pub use crate::{Chain, Db, DbConfig, Driver, Model, OrmError, OrmResult, Value};

#[cfg(feature = "mysql")]
pub use crate::{MySql, MySqlDb};
