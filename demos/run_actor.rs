//! Starts an actor, waits for the run to finish and prints its log.
//!
//! This example shows how to:
//! - Configure a client from the environment
//! - Start a run with input
//! - Wait for the run with a deadline
//! - Read the run log and the call statistics
//!
//! Run with: `APIFY_TOKEN=... cargo run --example run_actor`

use apify_client::resources::RunOptions;
use apify_client::{ApifyClient, ClientConfig, Error, WaitForFinishOptions};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("apify_client=debug,run_actor=info")
        .init();

    let config = ClientConfig {
        token: std::env::var("APIFY_TOKEN").ok(),
        max_retries: 4,
        ..ClientConfig::default()
    };
    let client = ApifyClient::new(config)?;

    let actor_id = "apify/hello-world";
    let run = client
        .actor(actor_id)
        .start(&RunOptions::new().input(json!({ "message": "Hello from Rust" })))
        .await?;
    println!("Started run {} ({:?})", run.id, run.status);

    let run = client
        .run(&run.id, actor_id)
        .wait_for_finish(&WaitForFinishOptions::new().wait_secs(120))
        .await?;

    match run {
        Some(run) => {
            println!("Run {} is {:?}", run.id, run.status);
            if let Some(log) = client.run(&run.id, actor_id).log().await? {
                println!("=== Log ===\n{}", log);
            }
        }
        None => println!("Run disappeared"),
    }

    let stats = client.stats();
    println!("Calls: {}, requests: {}", stats.calls, stats.requests);
    println!("Rate limit errors by attempt: {:?}", stats.rate_limit_errors);

    Ok(())
}
