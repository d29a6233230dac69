//! CLI command implementations.

pub mod check;
pub mod serve;
pub mod version;

use crate::cli::ConnectionArgs;
use crate::config::Config;
use crate::error::CliResult;

/// Resolve the configuration for a command: file (explicit or discovered in
/// the working directory) overlaid with flags and environment.
pub fn load_config(args: &ConnectionArgs) -> CliResult<Config> {
    let cwd = std::env::current_dir()?;
    let mut config = Config::discover(args.config.as_deref(), &cwd)?;
    config.apply(args);
    Ok(config)
}
