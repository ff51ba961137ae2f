//! The connection handle.

use crate::chain::Chain;
use crate::config::DbConfig;
use crate::driver::Driver;
use crate::model::Model;
use crate::value::{IntoArgs, Value};

#[cfg(feature = "mysql")]
use crate::error::OrmResult;
#[cfg(feature = "mysql")]
use crate::mysql::MySql;

/// Owns the driver and its configuration. Every call starts a fresh
/// [`Chain`].
///
/// `Db` is `Send + Sync` when the driver is; share it between tasks behind an
/// `Arc` and build one chain per task.
#[derive(Debug)]
pub struct Db<D> {
    driver: D,
    config: DbConfig,
}

/// A handle over the bundled MySQL driver.
#[cfg(feature = "mysql")]
pub type MySqlDb = Db<MySql>;

#[cfg(feature = "mysql")]
impl Db<MySql> {
    /// Open a pooled MySQL handle from a `mysql://` URL with default settings.
    pub fn open(database_url: &str) -> OrmResult<Self> {
        Self::open_with_config(database_url, DbConfig::default())
    }

    pub fn open_with_config(database_url: &str, config: DbConfig) -> OrmResult<Self> {
        let driver = MySql::connect(database_url, &config)?;
        tracing::debug!(
            target: "chainorm",
            max_connections = config.max_connections,
            "opened mysql pool"
        );
        Ok(Self { driver, config })
    }

    /// Disconnect the pool.
    pub async fn close(self) -> OrmResult<()> {
        self.driver.disconnect().await
    }
}

impl<D: Driver> Db<D> {
    /// Wrap an already configured driver.
    pub fn new(driver: D) -> Self {
        Self::with_config(driver, DbConfig::default())
    }

    pub fn with_config(driver: D, config: DbConfig) -> Self {
        Self { driver, config }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// An empty chain.
    pub fn chain(&self) -> Chain<'_, D> {
        Chain::new(self)
    }

    pub fn where_(&self, fragment: impl Into<String>, args: impl IntoArgs) -> Chain<'_, D> {
        self.chain().where_(fragment, args)
    }

    pub fn where_id(&self, id: impl Into<Value>) -> Chain<'_, D> {
        self.chain().where_id(id)
    }

    pub fn order(&self, order: impl Into<String>) -> Chain<'_, D> {
        self.chain().order(order)
    }

    pub async fn first<M: Model>(&self, out: &mut M) -> Chain<'_, D> {
        self.chain().first(out).await
    }

    pub async fn first_where<M: Model>(
        &self,
        out: &mut M,
        fragment: impl Into<String>,
        args: impl IntoArgs,
    ) -> Chain<'_, D> {
        self.chain().first_where(out, fragment, args).await
    }

    pub async fn first_by_id<M: Model>(&self, out: &mut M, id: impl Into<Value>) -> Chain<'_, D> {
        self.chain().first_by_id(out, id).await
    }

    pub async fn find<M: Model>(&self, out: &mut Vec<M>) -> Chain<'_, D> {
        self.chain().find(out).await
    }

    pub async fn find_where<M: Model>(
        &self,
        out: &mut Vec<M>,
        fragment: impl Into<String>,
        args: impl IntoArgs,
    ) -> Chain<'_, D> {
        self.chain().find_where(out, fragment, args).await
    }

    pub async fn save<M: Model>(&self, record: &mut M) -> Chain<'_, D> {
        self.chain().save(record).await
    }

    pub async fn delete<M: Model>(&self, record: &M) -> Chain<'_, D> {
        self.chain().delete(record).await
    }

    pub async fn exec(&self, sql: &str) -> Chain<'_, D> {
        self.chain().exec(sql).await
    }

    pub async fn create_table<M: Model>(&self) -> Chain<'_, D> {
        self.chain().create_table::<M>().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockDriver, User};

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn handle_is_shareable() {
        assert_send_sync::<Db<MockDriver>>();
        #[cfg(feature = "mysql")]
        assert_send_sync::<MySqlDb>();
    }

    #[tokio::test]
    async fn create_table_uses_inferred_types() {
        let db = Db::new(MockDriver::new());
        let chain = db.create_table::<User>().await;

        assert!(chain.result().is_ok());
        assert_eq!(
            db.driver().sql(),
            vec![
                "CREATE TABLE users (id bigint NOT NULL AUTO_INCREMENT PRIMARY KEY, age bigint, \
                 birthday timestamp, name longtext, created_at timestamp, updated_at timestamp)"
                    .to_string()
            ]
        );
    }

    #[tokio::test]
    async fn sql_logging_can_be_disabled() {
        let db = Db::with_config(MockDriver::new(), DbConfig::new().disable_sql_log());
        assert!(!db.config().log_sql);
        let chain = db.exec("SELECT 1").await;
        assert!(chain.result().is_ok());
        assert_eq!(db.driver().sql(), vec!["SELECT 1".to_string()]);
    }

    #[cfg(feature = "mysql")]
    #[test]
    fn open_rejects_bad_urls() {
        assert!(Db::open("sqlite://app.db").is_err());
    }
}
