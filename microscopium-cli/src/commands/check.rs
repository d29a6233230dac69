//! `microscopium check` command - Verify the database connection.

use microscopium_mongodb::MongoClient;
use microscopium_query::collections::{FEATURES, IMAGES, SAMPLES, SCREENS};
use microscopium_query::logging;
use tracing::info;

use crate::cli::CheckArgs;
use crate::commands::load_config;
use crate::error::CliResult;
use crate::output::{self, kv};

/// Collections the browser reads from.
const REQUIRED: [&str; 4] = [SCREENS, SAMPLES, FEATURES, IMAGES];

/// Run the check command
pub async fn run(args: CheckArgs) -> CliResult<()> {
    logging::init();

    let config = load_config(&args.connection)?;
    let mongo = config.mongo_config()?;

    output::header("Microscopium Check");
    kv("Profile", &config.profile().to_string());
    kv("Database", &mongo.database);
    kv("URI", &mongo.uri);
    output::newline();

    let client = MongoClient::new(mongo).await?;
    let result = check_collections(&client).await;
    client.shutdown().await;
    let missing = result?;

    if missing.is_empty() {
        output::success("All collections are present");
    } else {
        output::warn(&format!(
            "{} of {} collections are missing; the matching endpoints will return empty lists",
            missing.len(),
            REQUIRED.len()
        ));
    }
    Ok(())
}

async fn check_collections(client: &MongoClient) -> CliResult<Vec<&'static str>> {
    client.ping().await?;
    output::success("Connected");

    let present = client.list_collections().await?;
    info!(collections = ?present, "Listed collections");

    let mut missing = Vec::new();
    for name in REQUIRED {
        if present.iter().any(|p| p == name) {
            output::list_item(&format!("{} ✔", name));
        } else {
            output::list_item(&format!("{} missing", name));
            missing.push(name);
        }
    }
    Ok(missing)
}
