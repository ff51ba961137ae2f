//! Per-operation SQL assembly, execution and row scanning.
//!
//! A [`Statement`] is spawned by a [`Chain`](crate::Chain) for every terminal
//! operation. It copies the chain's accumulated conditions, binds the record
//! type, renders one SQL string with `?` placeholders and runs it through the
//! driver. Failures are captured into the statement's local error list and the
//! owning chain's [`ErrorLog`]; nothing is returned across the public boundary.

use crate::config::DbConfig;
use crate::driver::{Driver, ExecResult, RowSet};
use crate::error::{ErrorLog, OrmError, OrmResult};
use crate::model::{Descriptor, Model, Operation, PRIMARY_KEY};
use crate::naming;
use crate::scan::Destination;
use crate::value::{IntoArgs, Value};
use std::sync::Arc;
use tracing::Level;

/// A single where-condition.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereClause {
    /// Caller SQL with positional `?` arguments.
    Literal { fragment: String, args: Vec<Value> },
    /// Equality on the primary key column.
    PrimaryKey(Value),
}

impl WhereClause {
    pub fn literal(fragment: impl Into<String>, args: impl IntoArgs) -> Self {
        Self::Literal {
            fragment: fragment.into(),
            args: args.into_args(),
        }
    }
}

/// One SQL statement in the making.
pub struct Statement<'c, D: Driver> {
    driver: &'c D,
    config: &'c DbConfig,
    log: &'c mut ErrorLog,
    table: Option<String>,
    primary_key: i64,
    primary_key_column: String,
    clauses: Vec<WhereClause>,
    orders: Vec<String>,
    limit: Option<u64>,
    sql: String,
    vars: Vec<Value>,
    result: Option<ExecResult>,
    errors: Vec<Arc<OrmError>>,
}

impl<'c, D: Driver> Statement<'c, D> {
    pub(crate) fn new(
        driver: &'c D,
        config: &'c DbConfig,
        log: &'c mut ErrorLog,
        clauses: Vec<WhereClause>,
        orders: Vec<String>,
    ) -> Self {
        Self {
            driver,
            config,
            log,
            table: None,
            primary_key: -1,
            primary_key_column: naming::declared_to_column(PRIMARY_KEY),
            clauses,
            orders,
            limit: None,
            sql: String::new(),
            vars: Vec::new(),
            result: None,
            errors: Vec::new(),
        }
    }

    // ==================== Accessors ====================

    /// The last rendered SQL.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameters bound to the last rendered SQL, in placeholder order.
    pub fn vars(&self) -> &[Value] {
        &self.vars
    }

    /// Result of the last driver call that produced no rows.
    pub fn result(&self) -> Option<ExecResult> {
        self.result
    }

    /// Errors raised by this statement alone.
    pub fn errors(&self) -> &[Arc<OrmError>] {
        &self.errors
    }

    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    fn err(&mut self, err: OrmError) {
        tracing::debug!(target: "chainorm", error = %err, table = ?self.table, "statement failed");
        let err = Arc::new(err);
        self.errors.push(Arc::clone(&err));
        self.log.push(err);
    }

    fn capture(&mut self, outcome: OrmResult<()>) {
        if let Err(err) = outcome {
            self.err(err);
        }
    }

    // ==================== Model binding ====================

    fn bind_model<M: Model>(&mut self, desc: &Descriptor<'_, M>) {
        self.table = Some(desc.table_name());
        self.primary_key = desc.primary_key_value();
        self.primary_key_column = desc.primary_key_column();
    }

    fn table(&self) -> OrmResult<&str> {
        self.table.as_deref().ok_or(OrmError::ModelNotSet)
    }

    fn reset(&mut self) {
        self.sql.clear();
        self.vars.clear();
    }

    /// Bind a parameter and return its placeholder.
    pub(crate) fn add_to_vars(&mut self, value: Value) -> &'static str {
        self.vars.push(value);
        "?"
    }

    // ==================== SQL rendering ====================

    fn prepare_create_sql<M: Model>(&mut self, desc: &Descriptor<'_, M>) -> OrmResult<()> {
        self.reset();
        let table = self.table()?.to_string();
        let columns = desc.columns_and_values(Operation::Create)?;

        let mut names = Vec::with_capacity(columns.len());
        let mut placeholders = Vec::with_capacity(columns.len());
        for (column, value) in columns {
            names.push(column);
            placeholders.push(self.add_to_vars(value));
        }

        self.sql = format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            names.join(", "),
            placeholders.join(", ")
        );
        Ok(())
    }

    fn prepare_update_sql<M: Model>(&mut self, desc: &Descriptor<'_, M>) -> OrmResult<()> {
        self.reset();
        let table = self.table()?.to_string();
        let columns = desc.columns_and_values(Operation::Update)?;

        let mut sets = Vec::with_capacity(columns.len());
        for (column, value) in columns {
            let placeholder = self.add_to_vars(value);
            sets.push(format!("{column} = {placeholder}"));
        }

        let combined = self.combined_sql();
        self.sql = format!("UPDATE {table} SET {}{combined}", sets.join(", "));
        Ok(())
    }

    fn prepare_delete_sql(&mut self) -> OrmResult<()> {
        self.reset();
        let table = self.table()?.to_string();
        let combined = self.combined_sql();
        self.sql = format!("DELETE FROM {table}{combined}");
        Ok(())
    }

    fn prepare_query_sql(&mut self) -> OrmResult<()> {
        self.reset();
        let table = self.table()?.to_string();
        let combined = self.combined_sql();
        self.sql = format!("SELECT * FROM {table}{combined}");
        Ok(())
    }

    /// The where expression, without the `WHERE` keyword. Empty when there
    /// are no conditions.
    fn where_sql(&mut self) -> String {
        let primary = (self.primary_key > 0).then(|| {
            let placeholder = self.add_to_vars(Value::I64(self.primary_key));
            format!("({} = {placeholder})", self.primary_key_column)
        });

        let clauses = std::mem::take(&mut self.clauses);
        let rendered: Vec<String> = clauses.iter().map(|c| self.render_clause(c)).collect();
        self.clauses = clauses;
        let combined = rendered.join(" AND ");

        match primary {
            Some(primary) if combined.is_empty() => primary,
            Some(primary) => format!("{primary} AND ({combined})"),
            None => combined,
        }
    }

    fn render_clause(&mut self, clause: &WhereClause) -> String {
        match clause {
            WhereClause::PrimaryKey(id) => {
                let placeholder = self.add_to_vars(id.clone());
                format!("({} = {placeholder})", self.primary_key_column)
            }
            WhereClause::Literal { fragment, args } => {
                format!("({})", self.bind_fragment(fragment, args))
            }
        }
    }

    /// Bind `args` to the `?` placeholders of `fragment`.
    ///
    /// List arguments expand into one placeholder per element (`NULL` when
    /// empty). A `?` inside a quoted literal or identifier (`'`, `"` or a
    /// backtick) is literal text; a backslash escapes the next character
    /// inside a string literal. Surplus arguments are still bound so the driver
    /// reports the mismatch.
    fn bind_fragment(&mut self, fragment: &str, args: &[Value]) -> String {
        let mut out = String::with_capacity(fragment.len());
        let mut args = args.iter();
        let mut quote: Option<char> = None;
        let mut escaped = false;

        for ch in fragment.chars() {
            if let Some(open) = quote {
                out.push(ch);
                if escaped {
                    escaped = false;
                } else if ch == '\\' && open != '`' {
                    escaped = true;
                } else if ch == open {
                    quote = None;
                }
                continue;
            }

            match ch {
                '\'' | '"' | '`' => {
                    quote = Some(ch);
                    out.push(ch);
                }
                '?' => match args.next() {
                    Some(Value::List(items)) if items.is_empty() => out.push_str("NULL"),
                    Some(Value::List(items)) => {
                        let placeholders: Vec<&str> =
                            items.iter().map(|v| self.add_to_vars(v.clone())).collect();
                        out.push_str(&placeholders.join(", "));
                    }
                    Some(value) => out.push_str(self.add_to_vars(value.clone())),
                    None => out.push(ch),
                },
                _ => out.push(ch),
            }
        }

        for value in args {
            self.add_to_vars(value.clone());
        }
        out
    }

    fn order_sql(&self) -> String {
        if self.orders.is_empty() {
            String::new()
        } else {
            format!(" ORDER BY {}", self.orders.join(", "))
        }
    }

    fn limit_sql(&self) -> String {
        self.limit.map(|n| format!(" LIMIT {n}")).unwrap_or_default()
    }

    fn combined_sql(&mut self) -> String {
        let where_sql = self.where_sql();
        let mut sql = String::new();
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }
        sql.push_str(&self.order_sql());
        sql.push_str(&self.limit_sql());
        sql
    }

    // ==================== Driver calls ====================

    fn log_sql(&self, operation: &'static str) {
        if !self.config.log_sql {
            return;
        }

        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.config.truncate_sql(&self.sql);
        emit_at_level!(
            self.config.log_level,
            target: "chainorm.sql",
            operation,
            param_count = self.vars.len(),
            sql = %sql,
        );
    }

    async fn execute(&mut self, operation: &'static str) -> OrmResult<ExecResult> {
        self.log_sql(operation);
        let result = self.driver.execute(&self.sql, &self.vars).await?;
        self.result = Some(result);
        Ok(result)
    }

    async fn fetch(&mut self, operation: &'static str) -> OrmResult<RowSet> {
        self.log_sql(operation);
        self.driver.query(&self.sql, &self.vars).await
    }

    // ==================== Operations ====================

    /// Insert `record`, then write the new id and any stamped timestamps back
    /// into it.
    pub async fn create<M: Model>(&mut self, record: &mut M) {
        let outcome = self.try_create(record).await;
        self.capture(outcome);
    }

    async fn try_create<M: Model>(&mut self, record: &mut M) -> OrmResult<()> {
        let stamps = {
            let desc = Descriptor::new(&*record);
            self.bind_model(&desc);
            self.prepare_create_sql(&desc)?;
            desc.stamps(Operation::Create)
        };

        let result = self.execute("create").await?;
        let id = result
            .last_insert_id
            .ok_or_else(|| OrmError::Other("driver returned no insert id".to_string()))?;

        record.set(PRIMARY_KEY, Value::U64(id))?;
        for (field, value) in stamps {
            record.set(field, value)?;
        }
        Ok(())
    }

    /// Update every non-key column of `record`. Zero affected rows is not an
    /// error.
    pub async fn update<M: Model>(&mut self, record: &mut M) {
        let outcome = self.try_update(record).await;
        self.capture(outcome);
    }

    async fn try_update<M: Model>(&mut self, record: &mut M) -> OrmResult<()> {
        let stamps = {
            let desc = Descriptor::new(&*record);
            self.bind_model(&desc);
            self.prepare_update_sql(&desc)?;
            desc.stamps(Operation::Update)
        };

        self.execute("update").await?;
        for (field, value) in stamps {
            record.set(field, value)?;
        }
        Ok(())
    }

    /// Create when the record has no id yet, update otherwise.
    pub async fn save<M: Model>(&mut self, record: &mut M) {
        if Descriptor::new(&*record).primary_key_is_zero() {
            self.create(record).await;
        } else {
            self.update(record).await;
        }
    }

    /// Delete the rows matching `record`'s id and the accumulated conditions.
    pub async fn delete<M: Model>(&mut self, record: &M) {
        let outcome = self.try_delete(record).await;
        self.capture(outcome);
    }

    async fn try_delete<M: Model>(&mut self, record: &M) -> OrmResult<()> {
        self.bind_model(&Descriptor::new(record));
        self.prepare_delete_sql()?;
        self.execute("delete").await?;
        Ok(())
    }

    /// Select rows into `dest`. `extra` applies to this statement only.
    pub(crate) async fn query<T: Destination>(&mut self, mut dest: T, extra: Option<WhereClause>) {
        self.clauses.extend(extra);
        let outcome = self.try_query(&mut dest).await;
        self.capture(outcome);
    }

    async fn try_query<T: Destination>(&mut self, dest: &mut T) -> OrmResult<()> {
        self.bind_model(&Descriptor::from_option(dest.record()));
        self.prepare_query_sql()?;

        let RowSet { columns, rows } = self.fetch("query").await?;
        if rows.is_empty() && !T::COLLECTION {
            return Err(OrmError::not_found("record not found"));
        }
        for row in rows {
            dest.scan_row(&columns, row)?;
        }
        Ok(())
    }

    /// Create the table for `M` with inferred column types.
    pub async fn create_table<M: Model>(&mut self) {
        let outcome = self.try_create_table::<M>().await;
        self.capture(outcome);
    }

    async fn try_create_table<M: Model>(&mut self) -> OrmResult<()> {
        let record = M::default();
        let desc = Descriptor::new(&record);
        self.bind_model(&desc);
        self.reset();

        let columns: Vec<String> = desc
            .fields(Operation::Neutral)?
            .into_iter()
            .map(|f| format!("{} {}", f.db_name, f.sql_type))
            .collect();
        let table = self.table()?.to_string();
        self.sql = format!("CREATE TABLE {table} ({})", columns.join(", "));

        self.execute("create_table").await?;
        Ok(())
    }

    /// Run caller SQL as is, with no parameters.
    pub async fn exec_raw(&mut self, sql: &str) {
        self.reset();
        self.sql.push_str(sql);
        let outcome = self.execute("exec").await.map(|_| ());
        self.capture(outcome);
    }
}

#[cfg(test)]
mod tests;
