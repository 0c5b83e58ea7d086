//! Probe how the remote row-security policies treat this key: an insert
//! that succeeds while every select comes back empty is the classic
//! symptom of a policy that permits writes but filters reads.

use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tankdiag::config::Config;
use tankdiag::supabase::models::{
    DeviceInsert, TANK_DATA_CHARACTERISTIC_UUID, TANK_SERVICE_UUID,
};
use tankdiag::supabase::{SupabaseClient, TableQuery};

const PROBE_DEVICE_ID: &str = "test_simple_001";

const LOOKUP_IDS: &[&str] = &[
    "device_main_tank_001",
    "device_backup_tank_002",
    "device_emergency_tank_003",
    PROBE_DEVICE_ID,
];

async fn probe_insert(client: &SupabaseClient) -> bool {
    let probe = DeviceInsert {
        id: PROBE_DEVICE_ID.to_string(),
        name: "TestDevice".to_string(),
        mac_address: "AA:BB:CC:DD:EE:99".to_string(),
        title: "Simple Test Device".to_string(),
        location: None,
        enabled: None,
        color: None,
        service_uuid: TANK_SERVICE_UUID,
        data_characteristic_uuid: TANK_DATA_CHARACTERISTIC_UUID,
    };

    match client.insert_device(&probe, None).await {
        Ok(_) => {
            tracing::info!(id = PROBE_DEVICE_ID, "Simple insert succeeded");
            true
        }
        Err(e) if e.is_conflict() => {
            tracing::info!(id = PROBE_DEVICE_ID, "Probe row already present");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Simple insert failed");
            false
        }
    }
}

/// Run the same select several ways; under a sound policy every variant
/// agrees on the row count.
async fn probe_query_variations(client: &SupabaseClient) -> usize {
    let variations: Vec<(&str, TableQuery)> = vec![
        ("no parameters", TableQuery::new()),
        ("select=*", TableQuery::new().select("*")),
        ("column projection", TableQuery::new().select("id,title,name")),
        ("limit 10", TableQuery::new().limit(10)),
    ];

    let mut max_visible = 0usize;
    for (label, query) in &variations {
        match client.fetch_rows("devices", query).await {
            Ok(rows) => {
                let sample = rows
                    .first()
                    .and_then(|row| row.get("title"))
                    .and_then(Value::as_str)
                    .unwrap_or("-");
                tracing::info!(variant = label, records = rows.len(), sample, "Query variant");
                max_visible = max_visible.max(rows.len());
            }
            Err(e) => tracing::error!(variant = label, error = %e, "Query variant failed"),
        }
    }
    max_visible
}

async fn probe_lookups(client: &SupabaseClient) {
    for id in LOOKUP_IDS {
        match client.find_device(id).await {
            Ok(Some(device)) => {
                tracing::info!(
                    id,
                    title = %device.title,
                    enabled = device.enabled,
                    location = device.location.as_deref().unwrap_or("-"),
                    "Device found"
                );
            }
            Ok(None) => tracing::warn!(id, "Device not visible"),
            Err(e) => tracing::error!(id, error = %e, "Lookup failed"),
        }
    }
}

async fn probe_count(client: &SupabaseClient) -> Option<u64> {
    match client.count_rows("devices").await {
        Ok(Some(total)) => {
            tracing::info!(total, "Exact device count from Content-Range");
            Some(total)
        }
        Ok(None) => {
            tracing::warn!("Count query answered without a Content-Range total");
            None
        }
        Err(e) => {
            tracing::error!(error = %e, "Count query failed");
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

    let insert_ok = probe_insert(&client).await;
    let visible = probe_query_variations(&client).await;
    probe_lookups(&client).await;
    let counted = probe_count(&client).await;

    println!();
    println!("Access probe summary");
    println!("  insert:        {}", if insert_ok { "accepted" } else { "rejected" });
    println!("  visible rows:  {visible}");
    match counted {
        Some(total) => println!("  exact count:   {total}"),
        None => println!("  exact count:   unavailable"),
    }
    println!();
    if insert_ok && visible == 0 {
        println!("Writes are accepted but reads return nothing: the row policy");
        println!("grants INSERT to this role without a matching SELECT policy.");
    } else if insert_ok {
        println!("Reads and writes both work for this key.");
    } else {
        println!("Inserts are rejected; check the table's grants and constraints.");
    }

    Ok(())
}
