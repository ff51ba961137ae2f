//! The driver contract the statement builder executes against.

use crate::error::OrmResult;
use crate::value::Value;

/// Metadata returned by a statement that produces no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Identifier assigned by an auto-increment column, if any.
    pub last_insert_id: Option<u64>,
}

/// A fully materialized query result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> &mut Self {
        self.rows.push(row);
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A database connection or pool that can run SQL with positional `?`
/// parameters.
///
/// Implementations own connection handling; a connection checked out for a
/// call must be released before the returned future completes.
pub trait Driver: Send + Sync {
    /// Execute a statement and return affected-row metadata.
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<ExecResult>> + Send;

    /// Execute a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<RowSet>> + Send;
}

impl<D: Driver> Driver for &D {
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<ExecResult>> + Send {
        (*self).execute(sql, params)
    }

    fn query(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<RowSet>> + Send {
        (*self).query(sql, params)
    }
}

impl<D: Driver> Driver for std::sync::Arc<D> {
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<ExecResult>> + Send {
        (**self).execute(sql, params)
    }

    fn query(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<RowSet>> + Send {
        (**self).query(sql, params)
    }
}
