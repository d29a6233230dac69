//! CLI argument definitions using clap.

use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Profile;

/// Microscopium - browse high-content screening data
#[derive(Parser, Debug)]
#[command(name = "microscopium")]
#[command(version)]
#[command(about = "Microscopium - browse high-content screening data", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the web server
    Serve(ServeArgs),

    /// Check the database connection and collections
    Check(CheckArgs),

    /// Display version information
    Version,
}

/// Configuration and database options shared by every command that
/// touches the store.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Path to a configuration file (defaults to ./microscopium.toml if present)
    #[arg(short, long, env = "MICROSCOPIUM_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Configuration profile
    #[arg(long, env = "MICROSCOPIUM_PROFILE", value_enum)]
    pub profile: Option<Profile>,

    /// MongoDB connection string
    #[arg(long, env = "MONGO_URL")]
    pub mongo_url: Option<String>,

    /// MongoDB database name
    #[arg(short, long, env = "MONGO_DBNAME")]
    pub database: Option<String>,

    /// MongoDB user name
    #[arg(long, env = "MONGO_USER")]
    pub mongo_user: Option<String>,

    /// MongoDB password
    #[arg(long, env = "MONGO_PASSWORD", hide_env_values = true)]
    pub mongo_password: Option<String>,
}

// =============================================================================
// Serve Command
// =============================================================================

/// Arguments for the `serve` command
#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Minify HTML responses (true/false)
    #[arg(long, env = "MINIFY_HTML", value_parser = BoolishValueParser::new())]
    pub minify_html: Option<bool>,

    /// Serve documents from a directory of <collection>.json files instead of MongoDB
    #[arg(long)]
    pub fixtures: Option<PathBuf>,
}

// =============================================================================
// Check Command
// =============================================================================

/// Arguments for the `check` command
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from([
            "microscopium",
            "serve",
            "--port",
            "8080",
            "--minify-html",
            "yes",
            "--profile",
            "production",
            "--database",
            "screens_db",
        ])
        .unwrap();

        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, Some(8080));
        assert_eq!(args.minify_html, Some(true));
        assert_eq!(args.connection.profile, Some(Profile::Production));
        assert_eq!(args.connection.database.as_deref(), Some("screens_db"));
        assert!(args.fixtures.is_none());
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from([
            "microscopium",
            "check",
            "--mongo-url",
            "mongodb://db.example:27017",
        ])
        .unwrap();
        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(
            args.connection.mongo_url.as_deref(),
            Some("mongodb://db.example:27017")
        );
    }

    #[test]
    fn test_invalid_profile() {
        assert!(Cli::try_parse_from(["microscopium", "serve", "--profile", "staging"]).is_err());
    }
}
