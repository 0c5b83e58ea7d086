//! Seed the remote database with the three known tank devices plus one
//! sensor reading each, then read both tables back.

use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tankdiag::config::Config;
use tankdiag::supabase::models::{
    BatteryLevel, DeviceInsert, ReadingInsert, ReadingMetadata, TANK_DATA_CHARACTERISTIC_UUID,
    TANK_SERVICE_UUID,
};
use tankdiag::supabase::{SupabaseClient, TableQuery};

fn seed_devices() -> Vec<DeviceInsert> {
    vec![
        DeviceInsert {
            id: "device_main_tank_001".to_string(),
            name: "@TNK21B3A6".to_string(),
            mac_address: "C5:BA:A0:16:CF:65".to_string(),
            title: "Main Gas Tank #1".to_string(),
            location: Some("Warehouse A - Section 1".to_string()),
            enabled: Some(true),
            color: Some("#22c55e".to_string()),
            service_uuid: TANK_SERVICE_UUID,
            data_characteristic_uuid: TANK_DATA_CHARACTERISTIC_UUID,
        },
        DeviceInsert {
            id: "device_backup_tank_002".to_string(),
            name: "@TNK98X5Z2".to_string(),
            mac_address: "D6:CB:B1:27:D0:76".to_string(),
            title: "Backup Gas Tank #2".to_string(),
            location: Some("Warehouse B - Section 3".to_string()),
            enabled: Some(true),
            color: Some("#3b82f6".to_string()),
            service_uuid: TANK_SERVICE_UUID,
            data_characteristic_uuid: TANK_DATA_CHARACTERISTIC_UUID,
        },
        DeviceInsert {
            id: "device_emergency_tank_003".to_string(),
            name: "@TNK44K8M1".to_string(),
            mac_address: "E7:DC:C2:38:E1:87".to_string(),
            title: "Emergency Gas Tank #3".to_string(),
            location: Some("Emergency Station - Floor 2".to_string()),
            enabled: Some(false),
            color: Some("#f59e0b".to_string()),
            service_uuid: TANK_SERVICE_UUID,
            data_characteristic_uuid: TANK_DATA_CHARACTERISTIC_UUID,
        },
    ]
}

fn seed_readings() -> Vec<ReadingInsert> {
    vec![
        ReadingInsert {
            device_id: "device_main_tank_001".to_string(),
            title_name: "Main Gas Tank #1".to_string(),
            tank_level: 68.5,
            tank_level_unit: "cm".to_string(),
            updated_refresh: "2 minutes ago".to_string(),
            battery: BatteryLevel::Full,
            connection_strength: 95,
            measurement: 82.3,
            measurement_unit: "%".to_string(),
            technical_data: Some(ReadingMetadata {
                timestamp: Utc::now(),
                source: "seed_devices".to_string(),
                signal_quality: "excellent".to_string(),
            }),
        },
        ReadingInsert {
            device_id: "device_backup_tank_002".to_string(),
            title_name: "Backup Gas Tank #2".to_string(),
            tank_level: 45.2,
            tank_level_unit: "cm".to_string(),
            updated_refresh: "5 minutes ago".to_string(),
            battery: BatteryLevel::Ok,
            connection_strength: 78,
            measurement: 54.6,
            measurement_unit: "%".to_string(),
            technical_data: Some(ReadingMetadata {
                timestamp: Utc::now(),
                source: "seed_devices".to_string(),
                signal_quality: "good".to_string(),
            }),
        },
        ReadingInsert {
            device_id: "device_emergency_tank_003".to_string(),
            title_name: "Emergency Gas Tank #3".to_string(),
            tank_level: 89.1,
            tank_level_unit: "cm".to_string(),
            updated_refresh: "10 minutes ago".to_string(),
            battery: BatteryLevel::Low,
            connection_strength: 45,
            measurement: 91.2,
            measurement_unit: "%".to_string(),
            technical_data: Some(ReadingMetadata {
                timestamp: Utc::now(),
                source: "seed_devices".to_string(),
                signal_quality: "poor".to_string(),
            }),
        },
    ]
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

    tracing::info!("Creating seed devices...");
    let devices = seed_devices();
    let device_total = devices.len();
    let mut devices_present = 0usize;
    for device in &devices {
        match client.insert_device(device, None).await {
            Ok(_) => {
                tracing::info!(id = %device.id, title = %device.title, "Device created");
                devices_present += 1;
            }
            Err(e) if e.is_conflict() => {
                tracing::warn!(id = %device.id, "Device already exists, skipping");
                devices_present += 1;
            }
            Err(e) => {
                tracing::error!(id = %device.id, error = %e, "Failed to create device");
            }
        }
    }

    tracing::info!("Adding seed sensor readings...");
    let readings = seed_readings();
    let reading_total = readings.len();
    let mut readings_added = 0usize;
    for reading in &readings {
        match client.insert_reading(reading).await {
            Ok(()) => {
                tracing::info!(device_id = %reading.device_id, "Reading added");
                readings_added += 1;
            }
            Err(e) => {
                tracing::error!(device_id = %reading.device_id, error = %e, "Failed to add reading");
            }
        }
    }

    // Read both tables back to confirm what this key can actually see.
    match client.list_devices(&TableQuery::new()).await {
        Ok(rows) => {
            tracing::info!(count = rows.len(), "Devices visible after seeding");
            for row in &rows {
                tracing::info!(id = %row.id, title = %row.title, "Visible device");
            }
        }
        Err(e) => tracing::error!(error = %e, "Failed to list devices"),
    }
    match client.list_readings(&TableQuery::new()).await {
        Ok(rows) => tracing::info!(count = rows.len(), "Sensor readings visible after seeding"),
        Err(e) => tracing::error!(error = %e, "Failed to list sensor readings"),
    }

    println!();
    println!("Seed summary");
    println!("  devices present: {devices_present}/{device_total}");
    println!("  readings added:  {readings_added}/{reading_total}");

    Ok(())
}
