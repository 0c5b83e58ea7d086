//! Walk the read path the dashboard uses and report which layer breaks:
//! the base table, the stats view, or the view's ordering column.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tankdiag::config::Config;
use tankdiag::supabase::{SupabaseClient, TableQuery};

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

    let devices = match client.list_devices(&TableQuery::new()).await {
        Ok(rows) => {
            tracing::info!(count = rows.len(), "Devices table read");
            for row in &rows {
                tracing::info!(
                    id = %row.id,
                    title = %row.title,
                    enabled = row.enabled,
                    location = row.location.as_deref().unwrap_or("-"),
                    "Device"
                );
            }
            Some(rows)
        }
        Err(e) => {
            tracing::error!(error = %e, "Devices table read failed");
            None
        }
    };

    let stats = match client.list_device_stats(&TableQuery::new()).await {
        Ok(rows) => {
            tracing::info!(count = rows.len(), "device_stats view read");
            for row in &rows {
                tracing::info!(
                    id = %row.id,
                    title = %row.title,
                    device_created_at = ?row.device_created_at,
                    total_readings = ?row.total_readings,
                    "Stats row"
                );
            }
            Some(rows)
        }
        Err(e) => {
            tracing::error!(error = %e, "device_stats view read failed");
            None
        }
    };

    // The exact query the dashboard issues on load.
    let ordering_query = TableQuery::new().order_desc("device_created_at");
    let ordering_ok = match client.list_device_stats(&ordering_query).await {
        Ok(rows) => {
            tracing::info!(count = rows.len(), "Ordering by device_created_at works");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Ordering by device_created_at failed");
            false
        }
    };

    let readings = match client.list_readings(&TableQuery::new()).await {
        Ok(rows) => {
            tracing::info!(count = rows.len(), "Sensor readings read");
            for row in rows.iter().take(3) {
                tracing::info!(
                    device_id = %row.device_id,
                    measurement = %format!("{}{}", row.measurement, row.measurement_unit),
                    battery = ?row.battery,
                    "Sample reading"
                );
            }
            Some(rows)
        }
        Err(e) => {
            tracing::error!(error = %e, "Sensor readings read failed");
            None
        }
    };

    let status = |ok: bool| if ok { "working" } else { "FAILED" };

    println!();
    println!("Fetch debug summary");
    println!(
        "  devices table:     {} ({} records)",
        status(devices.is_some()),
        devices.as_ref().map_or(0, Vec::len)
    );
    println!(
        "  device_stats view: {} ({} records)",
        status(stats.is_some()),
        stats.as_ref().map_or(0, Vec::len)
    );
    println!("  view ordering:     {}", status(ordering_ok));
    println!(
        "  sensor_data:       {} ({} records)",
        status(readings.is_some()),
        readings.as_ref().map_or(0, Vec::len)
    );

    println!();
    match devices {
        Some(ref rows) if !rows.is_empty() => {
            if stats.as_ref().is_none_or(Vec::is_empty) {
                println!("Devices exist but the stats view returns nothing; the view's");
                println!("join or its grants are the broken layer.");
            } else if !ordering_ok {
                println!("The view answers but rejects ordering by device_created_at;");
                println!("that column is missing from the deployed view definition.");
            } else {
                println!("Remote reads look healthy; any remaining issue is client-side.");
            }
        }
        _ => {
            println!("No devices are visible. Either creation never persisted or the");
            println!("row policy hides every row from this key.");
        }
    }

    Ok(())
}
