//! `microscopium version` command - Display version information.

use crate::error::CliResult;
use crate::output::{self, kv};

/// Package version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Binary name
const NAME: &str = "microscopium";

/// Run the version command
pub async fn run() -> CliResult<()> {
    output::logo();
    output::newline();

    kv("Version", VERSION);
    kv("Binary", NAME);

    #[cfg(debug_assertions)]
    let build_mode = "debug";
    #[cfg(not(debug_assertions))]
    let build_mode = "release";

    kv("Build", build_mode);

    output::newline();

    output::section("Components");
    kv("microscopium-query", VERSION);
    kv("microscopium-mongodb", VERSION);
    kv("microscopium-axum", VERSION);

    output::newline();
    output::dim("Collections: screens, samples, features, images");

    Ok(())
}
