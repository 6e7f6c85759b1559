use crud_sync::config::ApiConfig;
use crud_sync::lifecycle::{setup_tracing, SyncSystem};
use crud_sync::state::is_fetching_initial;
use crud_sync::sync::{FetchOptions, Record, WriteOptions};
use crud_sync::transport::HttpTransport;
use serde_json::json;
use tracing::{info, warn};

fn record(value: serde_json::Value) -> Record {
    match value {
        serde_json::Value::Object(record) => record,
        _ => Record::new(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let config = ApiConfig::from_env()?;
    info!(api_url = %config.api_url, "Starting");
    let transport = HttpTransport::for_config(&config)?;
    let system = SyncSystem::new(transport, config, ["photos"]);

    // Local-only writes never touch the network.
    let local = WriteOptions::local_only();
    let draft = record(json!({ "id": "draft-1", "title": "Sunset", "albumId": 3 }));
    system.create("photos", draft, local.clone()).await?;
    system
        .update("photos", record(json!({ "id": "draft-1", "title": "Sunset over the bay" })), local.clone())
        .await?;

    match system.fetch("photos", FetchOptions::default()).await {
        Ok(records) => info!(count = records.len(), "Fetched photos"),
        Err(e) => warn!(error = %e, "Fetch failed, keeping local state"),
    }

    if let Some(state) = system.state("photos").await? {
        info!(
            items = state.items.len(),
            fetching_initial = is_fetching_initial(&state),
            "Photos state"
        );
        println!("{}", serde_json::to_string_pretty(&state)?);
    }

    system
        .destroy("photos", record(json!({ "id": "draft-1" })), local)
        .await?;

    system.shutdown().await?;
    Ok(())
}
