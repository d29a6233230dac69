//! CLI configuration handling.
//!
//! Settings are layered, later layers winning: profile defaults, the TOML
//! file, then environment variables and flags (merged by clap).

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use microscopium_mongodb::MongoConfig;

use crate::cli::ConnectionArgs;
use crate::error::{CliError, CliResult};

/// Default config file name (looked up in the working directory)
pub const CONFIG_FILE_NAME: &str = "microscopium.toml";

/// Named sets of defaults.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Unminified HTML and a local `microscopium` database.
    #[default]
    Development,
    /// Minified HTML; the database must be configured explicitly.
    Production,
}

impl Profile {
    /// Whether this profile minifies HTML by default.
    pub fn minify_html(self) -> bool {
        matches!(self, Profile::Production)
    }

    /// Default database name, if the profile has one.
    pub fn database(self) -> Option<&'static str> {
        match self {
            Profile::Development => Some("microscopium"),
            Profile::Production => None,
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Profile::Development => write!(f, "development"),
            Profile::Production => write!(f, "production"),
        }
    }
}

/// Microscopium configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Profile whose defaults fill unset values
    pub profile: Option<Profile>,

    /// Web server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,


    /// Unset means the profile decides
    pub minify_html: Option<bool>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            minify_html: None,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// MongoDB connection string
    pub uri: Option<String>,

    /// Database name
    pub name: Option<String>,

    /// User name, when not part of the URI
    pub username: Option<String>,

    /// Password for `username`
    pub password: Option<String>,

    /// Application name reported to the server
    pub app_name: Option<String>,

    /// Connections kept open when idle
    pub min_pool_size: Option<u32>,

    /// Upper bound on pooled connections
    pub max_pool_size: Option<u32>,

    /// Seconds to wait for a connection to open
    pub connect_timeout_secs: Option<u64>,

    /// Seconds to wait for a usable server
    pub server_selection_timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `path` if given, otherwise `microscopium.toml` in `dir` if it
    /// exists, otherwise the defaults.
    pub fn discover(path: Option<&Path>, dir: &Path) -> CliResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Overlay values given on the command line or through the environment.
    pub fn apply(&mut self, args: &ConnectionArgs) {
        if let Some(profile) = args.profile {
            self.profile = Some(profile);
        }
        if let Some(ref uri) = args.mongo_url {
            self.database.uri = Some(uri.clone());
        }
        if let Some(ref name) = args.database {
            self.database.name = Some(name.clone());
        }
        if let Some(ref user) = args.mongo_user {
            self.database.username = Some(user.clone());
        }
        if let Some(ref password) = args.mongo_password {
            self.database.password = Some(password.clone());
        }
    }

    /// The effective profile.
    pub fn profile(&self) -> Profile {
        self.profile.unwrap_or_default()
    }

    /// Whether HTML responses are minified.
    pub fn minify_html(&self) -> bool {
        self.server
            .minify_html
            .unwrap_or_else(|| self.profile().minify_html())
    }

    /// The effective database name.
    pub fn database_name(&self) -> Option<&str> {
        self.database
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| self.profile().database())
    }

    /// Store configuration for the MongoDB client.
    pub fn mongo_config(&self) -> CliResult<MongoConfig> {
        let name = self.database_name().ok_or_else(|| {
            CliError::Config(format!(
                "No database name configured for the {} profile. Set MONGO_DBNAME, --database or [database] name.",
                self.profile()
            ))
        })?;

        let mut builder = MongoConfig::builder().database(name);
        if let Some(ref uri) = self.database.uri {
            builder = builder.uri(uri);
        }
        if let Some(ref username) = self.database.username {
            builder = builder.credentials(username, self.database.password.clone());
        } else if self.database.password.is_some() {
            return Err(CliError::Config(
                "A database password was given without a user name.".to_string(),
            ));
        }
        if let Some(ref app_name) = self.database.app_name {
            builder = builder.app_name(app_name);
        }
        if let Some(size) = self.database.min_pool_size {
            builder = builder.min_pool_size(size);
        }
        if let Some(size) = self.database.max_pool_size {
            builder = builder.max_pool_size(size);
        }
        if let Some(secs) = self.database.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.database.server_selection_timeout_secs {
            builder = builder.server_selection_timeout(Duration::from_secs(secs));
        }

        builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.profile(), Profile::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5000);
        assert!(!config.minify_html());
        assert_eq!(config.database_name(), Some("microscopium"));
    }

    #[test]
    fn test_production_profile() {
        let config = Config {
            profile: Some(Profile::Production),
            ..Config::default()
        };
        assert!(config.minify_html());
        assert_eq!(config.database_name(), None);
        assert!(matches!(config.mongo_config(), Err(CliError::Config(_))));
    }

    #[test]
    fn test_parse_toml() {
        let config: Config = toml::from_str(
            r#"
            profile = "production"

            [server]
            port = 8080
            minify_html = false

            [database]
            uri = "mongodb://db.example:27017"
            name = "screens"
            min_pool_size = 1
            max_pool_size = 4
            connect_timeout_secs = 3
            server_selection_timeout_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.profile(), Profile::Production);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert!(!config.minify_html());

        let mongo = config.mongo_config().unwrap();
        assert_eq!(mongo.uri, "mongodb://db.example:27017");
        assert_eq!(mongo.database, "screens");
        assert_eq!(mongo.min_pool_size, Some(1));
        assert_eq!(mongo.max_pool_size, Some(4));
        assert_eq!(mongo.connect_timeout, Some(Duration::from_secs(3)));
        assert_eq!(mongo.server_selection_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_apply_overrides_file() {
        let mut config: Config = toml::from_str(
            r#"
            [database]
            name = "from_file"
            "#,
        )
        .unwrap();

        config.apply(&ConnectionArgs {
            database: Some("from_flag".to_string()),
            mongo_user: Some("reader".to_string()),
            mongo_password: Some("secret".to_string()),
            ..ConnectionArgs::default()
        });

        let mongo = config.mongo_config().unwrap();
        assert_eq!(mongo.database, "from_flag");
        assert_eq!(mongo.username.as_deref(), Some("reader"));
        assert_eq!(mongo.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_password_without_user() {
        let mut config = Config::default();
        config.database.password = Some("secret".to_string());
        assert!(config.mongo_config().is_err());
    }

    #[test]
    fn test_discover() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::discover(None, dir.path()).unwrap();
        assert_eq!(config.server.port, 5000);

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[server]\nport = 6000\n").unwrap();
        let config = Config::discover(None, dir.path()).unwrap();
        assert_eq!(config.server.port, 6000);

        let other = dir.path().join("other.toml");
        std::fs::write(&other, "[server]\nport = 7000\n").unwrap();
        let config = Config::discover(Some(&other), dir.path()).unwrap();
        assert_eq!(config.server.port, 7000);

        assert!(Config::discover(Some(&dir.path().join("missing.toml")), dir.path()).is_err());
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[server]\nport = \"not a port\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(CliError::Config(_))));
    }
}
