//! Discover which remote procedures and raw-SQL endpoints the service
//! exposes to this key, and whether the stats view is in the exposed schema.

use reqwest::Method;
use serde_json::{Value, json};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tankdiag::config::Config;
use tankdiag::supabase::SupabaseClient;

const RPC_CANDIDATES: &[&str] = &[
    "get_devices",
    "list_devices",
    "get_device_stats",
    "create_device",
];

// Paths that hosted PostgREST deployments have historically used for raw
// SQL execution; none are expected to answer on a locked-down project.
const SQL_ENDPOINT_CANDIDATES: &[&str] = &[
    "/rest/v1/rpc/sql",
    "/rest/v1/rpc/exec_sql",
    "/database/sql",
    "/sql",
    "/rpc/sql",
];

fn preview(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() > 100 {
        let head: String = text.chars().take(100).collect();
        format!("{head}...")
    } else {
        text
    }
}

async fn probe_procedures(client: &SupabaseClient) -> usize {
    let mut available = 0usize;
    for name in RPC_CANDIDATES {
        match client.rpc(name, &json!({})).await {
            Ok(body) => {
                tracing::info!(name, body = %preview(&body), "Procedure available");
                available += 1;
            }
            Err(e) if e.is_not_found() => tracing::info!(name, "Procedure not found"),
            Err(e) => tracing::warn!(name, error = %e, "Procedure probe failed"),
        }
    }
    available
}

async fn probe_sql_endpoints(client: &SupabaseClient) -> usize {
    let body = json!({ "query": "select 1 as probe" });
    let mut answering = 0usize;
    for path in SQL_ENDPOINT_CANDIDATES {
        match client.request(Method::POST, path, Some(&body), None).await {
            Ok(response) => {
                tracing::warn!(
                    path,
                    status = %response.status,
                    "SQL endpoint answered; raw SQL is reachable"
                );
                answering += 1;
            }
            Err(e) if e.is_not_found() => tracing::info!(path, "No SQL endpoint"),
            Err(e) => tracing::info!(path, error = %e, "SQL endpoint rejected the call"),
        }
    }
    answering
}

async fn probe_introspection(client: &SupabaseClient) -> Option<bool> {
    match client.service_root().await {
        Ok(root) => {
            let exposes_stats = root.to_string().contains("device_stats");
            tracing::info!(exposes_stats, "Introspection document fetched");
            Some(exposes_stats)
        }
        Err(e) => {
            tracing::error!(error = %e, "Introspection fetch failed");
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tankdiag=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let client = SupabaseClient::new(&config);

    let procedures = probe_procedures(&client).await;
    let sql_endpoints = probe_sql_endpoints(&client).await;
    let stats_in_schema = probe_introspection(&client).await;

    println!();
    println!("RPC probe summary");
    println!("  procedures available: {procedures}/{}", RPC_CANDIDATES.len());
    println!("  raw SQL endpoints:    {sql_endpoints}/{}", SQL_ENDPOINT_CANDIDATES.len());
    match stats_in_schema {
        Some(true) => println!("  device_stats view:    exposed in schema"),
        Some(false) => println!("  device_stats view:    not in exposed schema"),
        None => println!("  device_stats view:    introspection unavailable"),
    }

    Ok(())
}
