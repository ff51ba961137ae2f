//! Connection handle configuration.

use tracing::Level;

/// Configuration for a [`Db`](crate::Db).
///
/// ```ignore
/// let config = DbConfig::new()
///     .max_connections(8)
///     .log_level(tracing::Level::INFO)
///     .no_truncate();
/// let db = chainorm::Db::open_with_config("mysql://root@localhost/app", config)?;
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Upper bound of pooled connections.
    pub max_connections: usize,
    /// Whether statements are emitted as `tracing` events.
    pub log_sql: bool,
    /// Tracing event level for statements.
    pub log_level: Level,
    /// Truncate long SQL strings (in chars). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            max_connections: 16,
            log_sql: true,
            log_level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }
}

impl DbConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pool size. Values below 1 are raised to 1.
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max.max(1);
        self
    }

    /// Override the tracing event level.
    pub fn log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Stop emitting statement events.
    pub fn disable_sql_log(mut self) -> Self {
        self.log_sql = false;
        self
    }

    pub(crate) fn truncate_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_sql_length {
            Some(max) if sql.chars().count() > max => {
                let cut: String = sql.chars().take(max).collect();
                format!("{cut}...").into()
            }
            _ => sql.into(),
        }
    }
}
