//! MongoDB connection configuration.

use std::time::Duration;

use mongodb::options::ClientOptions;

use crate::error::{MongoError, MongoResult};

/// Default connection URI.
pub const DEFAULT_URI: &str = "mongodb://localhost:27017";

/// Default application name reported to the server.
pub const DEFAULT_APP_NAME: &str = "microscopium";

/// MongoDB connection configuration.
#[derive(Clone)]
pub struct MongoConfig {
    /// MongoDB connection URI.
    pub uri: String,
    /// Database name.
    pub database: String,
    /// User name, when not embedded in the URI.
    pub username: Option<String>,
    /// Password for `username`.
    pub password: Option<String>,
    /// Application name (shown in server logs).
    pub app_name: Option<String>,
    /// Minimum connection pool size.
    pub min_pool_size: Option<u32>,
    /// Maximum connection pool size.
    pub max_pool_size: Option<u32>,
    /// Maximum idle time for connections.
    pub max_idle_time: Option<Duration>,
    /// Connection timeout.
    pub connect_timeout: Option<Duration>,
    /// Server selection timeout.
    pub server_selection_timeout: Option<Duration>,
    /// Retry reads. Off unless asked for: failures surface to the caller.
    pub retry_reads: Option<bool>,
}

impl std::fmt::Debug for MongoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoConfig")
            .field("uri", &self.uri)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("app_name", &self.app_name)
            .field("min_pool_size", &self.min_pool_size)
            .field("max_pool_size", &self.max_pool_size)
            .field("max_idle_time", &self.max_idle_time)
            .field("connect_timeout", &self.connect_timeout)
            .field("server_selection_timeout", &self.server_selection_timeout)
            .field("retry_reads", &self.retry_reads)
            .finish()
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            database: String::new(),
            username: None,
            password: None,
            app_name: Some(DEFAULT_APP_NAME.to_string()),
            min_pool_size: None,
            max_pool_size: Some(10),
            max_idle_time: Some(Duration::from_secs(300)),
            connect_timeout: Some(Duration::from_secs(10)),
            server_selection_timeout: Some(Duration::from_secs(30)),
            retry_reads: Some(false),
        }
    }
}

impl MongoConfig {
    /// Create a new configuration from a MongoDB URI.
    pub fn from_uri(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            ..Self::default()
        }
    }

    /// Create a builder for configuration.
    pub fn builder() -> MongoConfigBuilder {
        MongoConfigBuilder::new()
    }

    /// Convert to MongoDB ClientOptions.
    pub async fn to_client_options(&self) -> MongoResult<ClientOptions> {
        let mut options = ClientOptions::parse(&self.uri)
            .await
            .map_err(|e| MongoError::config(format!("failed to parse URI: {}", e)))?;

        if let Some(ref username) = self.username {
            let mut credential = options.credential.take().unwrap_or_default();
            credential.username = Some(username.clone());
            credential.password = self.password.clone();
            options.credential = Some(credential);
        }

        if let Some(ref app_name) = self.app_name {
            options.app_name = Some(app_name.clone());
        }

        if let Some(min_pool) = self.min_pool_size {
            options.min_pool_size = Some(min_pool);
        }

        if let Some(max_pool) = self.max_pool_size {
            options.max_pool_size = Some(max_pool);
        }

        if let Some(max_idle) = self.max_idle_time {
            options.max_idle_time = Some(max_idle);
        }

        if let Some(connect_timeout) = self.connect_timeout {
            options.connect_timeout = Some(connect_timeout);
        }

        if let Some(selection_timeout) = self.server_selection_timeout {
            options.server_selection_timeout = Some(selection_timeout);
        }

        if let Some(retry_reads) = self.retry_reads {
            options.retry_reads = Some(retry_reads);
        }

        Ok(options)
    }
}

/// Builder for MongoDB configuration.
#[derive(Debug, Default)]
pub struct MongoConfigBuilder {
    uri: Option<String>,
    database: Option<String>,
    username: Option<String>,
    password: Option<String>,
    app_name: Option<String>,
    min_pool_size: Option<u32>,
    max_pool_size: Option<u32>,
    connect_timeout: Option<Duration>,
    server_selection_timeout: Option<Duration>,
}

impl MongoConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the MongoDB URI.
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set the database name.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Authenticate as `username` with `password`.
    pub fn credentials(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.username = Some(username.into());
        self.password = password;
        self
    }

    /// Set the application name.
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// Set the minimum pool size.
    pub fn min_pool_size(mut self, size: u32) -> Self {
        self.min_pool_size = Some(size);
        self
    }

    /// Set the maximum pool size.
    pub fn max_pool_size(mut self, size: u32) -> Self {
        self.max_pool_size = Some(size);
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = Some(duration);
        self
    }

    /// Set the server selection timeout.
    pub fn server_selection_timeout(mut self, duration: Duration) -> Self {
        self.server_selection_timeout = Some(duration);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> MongoResult<MongoConfig> {
        let database = self
            .database
            .filter(|name| !name.is_empty())
            .ok_or_else(|| MongoError::config("database name is required"))?;

        if self.password.is_some() && self.username.is_none() {
            return Err(MongoError::config("a password was given without a user name"));
        }

        let defaults = MongoConfig::default();
        Ok(MongoConfig {
            uri: self.uri.unwrap_or(defaults.uri),
            database,
            username: self.username,
            password: self.password,
            app_name: self.app_name.or(defaults.app_name),
            min_pool_size: self.min_pool_size,
            max_pool_size: self.max_pool_size.or(defaults.max_pool_size),
            max_idle_time: defaults.max_idle_time,
            connect_timeout: self.connect_timeout.or(defaults.connect_timeout),
            server_selection_timeout: self
                .server_selection_timeout
                .or(defaults.server_selection_timeout),
            retry_reads: defaults.retry_reads,
        })
    }
}
