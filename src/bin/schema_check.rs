//! Report which columns the `devices` table and the `device_stats` view
//! actually expose. Column names can only be read off a returned row, so an
//! empty table gets a temporary probe device inserted (and removed again).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use tankdiag::config::Config;
use tankdiag::supabase::models::{
    DeviceInsert, TANK_DATA_CHARACTERISTIC_UUID, TANK_SERVICE_UUID,
};
use tankdiag::supabase::{SupabaseClient, TableQuery};

/// Column names of the first row `query` returns, or `None` when the
/// relation is missing or unreadable. `Some(vec![])` means "exists but
/// returned no rows".
async fn inspect(
    client: &SupabaseClient,
    table: &str,
    query: &TableQuery,
) -> Option<Vec<String>> {
    match client.fetch_rows(table, query).await {
        Ok(rows) => match rows.first() {
            Some(row) => {
                let mut columns: Vec<String> = row.keys().cloned().collect();
                columns.sort();
                Some(columns)
            }
            None => Some(Vec::new()),
        },
        Err(e) if e.is_not_found() => {
            tracing::error!(table, "Relation does not exist (404)");
            None
        }
        Err(e) => {
            tracing::error!(table, error = %e, "Failed to inspect relation");
            None
        }
    }
}

fn print_columns(table: &str, columns: &[String]) {
    if columns.is_empty() {
        println!("{table}: exists but returned no rows");
        return;
    }
    println!("{table}: {} columns", columns.len());
    for column in columns {
        println!("  - {column}");
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

    let first_row = TableQuery::new().limit(1);
    let mut devices_columns = inspect(&client, "devices", &first_row).await;
    let mut stats_columns = inspect(&client, "device_stats", &first_row).await;

    let needs_probe = matches!(devices_columns.as_deref(), Some([]))
        || matches!(stats_columns.as_deref(), Some([]));

    let mut probe_id = None;
    if needs_probe {
        let id = format!("probe_{}", Uuid::new_v4().simple());
        tracing::info!(id = %id, "No rows to inspect, inserting a probe device");
        let probe = DeviceInsert {
            id: id.clone(),
            name: "@SCHEMAPROBE".to_string(),
            mac_address: "AA:BB:CC:DD:EE:99".to_string(),
            title: "Schema Probe Device".to_string(),
            location: Some("Probe Location".to_string()),
            enabled: Some(true),
            color: Some("#22c55e".to_string()),
            service_uuid: TANK_SERVICE_UUID,
            data_characteristic_uuid: TANK_DATA_CHARACTERISTIC_UUID,
        };

        match client.insert_device(&probe, None).await {
            Ok(_) => {
                let by_id = TableQuery::new().filter_eq("id", &id);
                devices_columns = inspect(&client, "devices", &by_id).await;
                stats_columns = inspect(&client, "device_stats", &by_id).await;
                probe_id = Some(id);
            }
            Err(e) => tracing::error!(error = %e, "Probe insert failed, cannot inspect columns"),
        }
    }

    println!();
    if let Some(ref columns) = devices_columns {
        print_columns("devices", columns);
    }
    if let Some(ref columns) = stats_columns {
        print_columns("device_stats", columns);
    }

    // The dashboard orders the view by device_created_at; flag its absence.
    let has_created_at = devices_columns
        .as_deref()
        .is_some_and(|c| c.iter().any(|name| name == "created_at"));
    let has_device_created_at = stats_columns
        .as_deref()
        .is_some_and(|c| c.iter().any(|name| name == "device_created_at"));

    if let Some(id) = probe_id {
        match client.delete_device(&id).await {
            Ok(()) => tracing::info!(id = %id, "Probe device cleaned up"),
            Err(e) => tracing::warn!(id = %id, error = %e, "Probe cleanup failed"),
        }
    }

    println!();
    println!("Schema summary");
    println!(
        "  devices table:          {}",
        if devices_columns.is_some() { "exists" } else { "MISSING" }
    );
    println!(
        "  device_stats view:      {}",
        if stats_columns.is_some() { "exists" } else { "MISSING" }
    );
    println!(
        "  created_at column:      {}",
        if has_created_at { "present" } else { "missing" }
    );
    println!(
        "  device_created_at:      {}",
        if has_device_created_at { "present" } else { "missing" }
    );
    if stats_columns.is_none() {
        println!();
        println!("The device_stats view needs to be recreated from the migration SQL.");
    }

    Ok(())
}
