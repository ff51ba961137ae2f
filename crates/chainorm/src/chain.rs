//! The fluent query chain.

use crate::db::Db;
use crate::driver::Driver;
use crate::error::{ErrorLog, OrmError};
use crate::model::Model;
use crate::scan::{Many, Single};
use crate::statement::{Statement, WhereClause};
use crate::value::{IntoArgs, Value};
use std::sync::Arc;

/// Accumulates conditions and ordering, then dispatches terminal operations.
///
/// Terminal operations never return an error. They record it in the chain's
/// log and hand the chain back, so calls can keep going:
///
/// ```ignore
/// let chain = db.where_("age > ?", (18,)).find(&mut adults).await;
/// if let Some(err) = chain.error() {
///     tracing::warn!(%err, "lookup failed");
/// }
/// ```
pub struct Chain<'d, D: Driver> {
    db: &'d Db<D>,
    clauses: Vec<WhereClause>,
    orders: Vec<String>,
    log: ErrorLog,
}

impl<'d, D: Driver> Chain<'d, D> {
    pub(crate) fn new(db: &'d Db<D>) -> Self {
        Self {
            db,
            clauses: Vec::new(),
            orders: Vec::new(),
            log: ErrorLog::new(),
        }
    }

    // ==================== Accumulators ====================

    /// Add a condition; `?` placeholders bind `args` in order.
    pub fn where_(mut self, fragment: impl Into<String>, args: impl IntoArgs) -> Self {
        self.clauses.push(WhereClause::literal(fragment, args));
        self
    }

    /// Add an equality condition on the primary key.
    pub fn where_id(mut self, id: impl Into<Value>) -> Self {
        self.clauses.push(WhereClause::PrimaryKey(id.into()));
        self
    }

    /// Add an `ORDER BY` term, e.g. `"age desc"`.
    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.orders.push(order.into());
        self
    }

    fn spawn(&mut self) -> Statement<'_, D> {
        Statement::new(
            self.db.driver(),
            self.db.config(),
            &mut self.log,
            self.clauses.clone(),
            self.orders.clone(),
        )
    }

    // ==================== Terminal operations ====================

    /// Load the first matching row into `out`.
    pub async fn first<M: Model>(mut self, out: &mut M) -> Self {
        let mut stmt = self.spawn();
        stmt.limit(1);
        stmt.query(Single(out), None).await;
        self
    }

    /// Like [`first`](Self::first) with one more condition for this call only.
    pub async fn first_where<M: Model>(
        mut self,
        out: &mut M,
        fragment: impl Into<String>,
        args: impl IntoArgs,
    ) -> Self {
        let extra = WhereClause::literal(fragment, args);
        let mut stmt = self.spawn();
        stmt.limit(1);
        stmt.query(Single(out), Some(extra)).await;
        self
    }

    /// Load the row with the given id into `out`.
    pub async fn first_by_id<M: Model>(mut self, out: &mut M, id: impl Into<Value>) -> Self {
        let extra = WhereClause::PrimaryKey(id.into());
        let mut stmt = self.spawn();
        stmt.limit(1);
        stmt.query(Single(out), Some(extra)).await;
        self
    }

    /// Append every matching row to `out`.
    pub async fn find<M: Model>(mut self, out: &mut Vec<M>) -> Self {
        self.spawn().query(Many(out), None).await;
        self
    }

    /// Like [`find`](Self::find) with one more condition for this call only.
    pub async fn find_where<M: Model>(
        mut self,
        out: &mut Vec<M>,
        fragment: impl Into<String>,
        args: impl IntoArgs,
    ) -> Self {
        let extra = WhereClause::literal(fragment, args);
        self.spawn().query(Many(out), Some(extra)).await;
        self
    }

    /// Insert `record` when its id is zero, update it otherwise.
    pub async fn save<M: Model>(mut self, record: &mut M) -> Self {
        self.spawn().save(record).await;
        self
    }

    /// Delete `record` (and whatever else the accumulated conditions match).
    pub async fn delete<M: Model>(mut self, record: &M) -> Self {
        self.spawn().delete(record).await;
        self
    }

    /// Run raw SQL without parameters.
    pub async fn exec(mut self, sql: &str) -> Self {
        self.spawn().exec_raw(sql).await;
        self
    }

    /// Create the table for `M`.
    pub async fn create_table<M: Model>(mut self) -> Self {
        self.spawn().create_table::<M>().await;
        self
    }

    // ==================== Errors ====================

    /// The most recent error.
    pub fn error(&self) -> Option<&OrmError> {
        self.log.last()
    }

    /// Every error raised on this chain, oldest first.
    pub fn errors(&self) -> &[Arc<OrmError>] {
        self.log.all()
    }

    /// `Err` with the most recent error, if any.
    pub fn result(&self) -> Result<(), Arc<OrmError>> {
        match self.log.all().last() {
            Some(err) => Err(Arc::clone(err)),
            None => Ok(()),
        }
    }
}
