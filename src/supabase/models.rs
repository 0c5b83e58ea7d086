use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::{Uuid, uuid};

/// GATT service advertised by the tank sensors.
pub const TANK_SERVICE_UUID: Uuid = uuid!("0000fff0-0000-1000-8000-00805f9b34fb");
/// GATT characteristic the sensors publish readings on.
pub const TANK_DATA_CHARACTERISTIC_UUID: Uuid = uuid!("0000fff1-0000-1000-8000-00805f9b34fb");

/// Battery charge vocabulary used by the remote schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatteryLevel {
    Full,
    Ok,
    Low,
}

/// A row of the `devices` table.
///
/// Server-maintained columns are defaulted so that probing still decodes rows
/// coming from schema revisions that lack them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRow {
    pub id: String,
    pub name: String,
    pub mac_address: String,
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub service_uuid: Option<Uuid>,
    #[serde(default)]
    pub data_characteristic_uuid: Option<Uuid>,
    #[serde(default)]
    pub rssi: Option<i32>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub last_discovered: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_connected: bool,
    #[serde(default)]
    pub last_connected: Option<DateTime<Utc>>,
    #[serde(default)]
    pub connection_attempts: i32,
    #[serde(default)]
    pub total_packets_received: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Client-supplied columns for a device insert.
/// `None` fields are omitted from the serialized body and default remotely.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInsert {
    pub id: String,
    pub name: String,
    pub mac_address: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub service_uuid: Uuid,
    pub data_characteristic_uuid: Uuid,
}

/// Partial device update. `None` columns are left untouched by the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DevicePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Nested `technical_data` payload attached to a reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingMetadata {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub signal_quality: String,
}

/// Client-supplied columns for a `sensor_data` insert.
#[derive(Debug, Clone, Serialize)]
pub struct ReadingInsert {
    pub device_id: String,
    pub title_name: String,
    pub tank_level: f64,
    pub tank_level_unit: String,
    pub updated_refresh: String,
    pub battery: BatteryLevel,
    pub connection_strength: i32,
    pub measurement: f64,
    pub measurement_unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical_data: Option<ReadingMetadata>,
}

/// A row of the `sensor_data` table.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadingRow {
    pub id: String,
    pub device_id: String,
    pub title_name: String,
    pub tank_level: f64,
    #[serde(default)]
    pub tank_level_unit: String,
    pub updated_refresh: String,
    pub battery: BatteryLevel,
    pub connection_strength: i32,
    pub measurement: f64,
    #[serde(default)]
    pub measurement_unit: String,
    #[serde(default)]
    pub technical_data: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A row of the `device_stats` view: device columns joined with
/// latest-reading aggregates. Every aggregate column can be null for a
/// device that has no readings yet.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceStatsRow {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub is_connected: bool,
    #[serde(default)]
    pub last_connected: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_packets_received: i64,
    #[serde(default)]
    pub device_created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub latest_tank_level: Option<f64>,
    #[serde(default)]
    pub tank_level_unit: Option<String>,
    #[serde(default)]
    pub latest_measurement: Option<f64>,
    #[serde(default)]
    pub measurement_unit: Option<String>,
    #[serde(default)]
    pub latest_battery: Option<BatteryLevel>,
    #[serde(default)]
    pub latest_connection_strength: Option<i32>,
    #[serde(default)]
    pub latest_refresh: Option<String>,
    #[serde(default)]
    pub latest_reading_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_readings: Option<i64>,
    #[serde(default)]
    pub readings_last_24h: Option<i64>,
    #[serde(default)]
    pub avg_measurement_24h: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn device_insert_round_trips_through_json() {
        let insert = DeviceInsert {
            id: "test_crud_device_001".to_string(),
            name: "@CRUDTEST".to_string(),
            mac_address: "FF:EE:DD:CC:BB:AA".to_string(),
            title: "CRUD Test Device".to_string(),
            location: Some("Test Location for CRUD".to_string()),
            enabled: Some(true),
            color: Some("#ff6b6b".to_string()),
            service_uuid: TANK_SERVICE_UUID,
            data_characteristic_uuid: TANK_DATA_CHARACTERISTIC_UUID,
        };

        let serialized = serde_json::to_string(&insert).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed, serde_json::to_value(&insert).unwrap());
        assert_eq!(parsed["id"], json!("test_crud_device_001"));
        assert_eq!(parsed["enabled"], json!(true));
        assert_eq!(
            parsed["service_uuid"],
            json!("0000fff0-0000-1000-8000-00805f9b34fb")
        );
    }

    #[test]
    fn patch_omits_unset_columns() {
        let patch = DevicePatch {
            title: Some("Updated Main Gas Tank #1".to_string()),
            location: Some("Updated Location - Warehouse A".to_string()),
            ..DevicePatch::default()
        };

        let value = serde_json::to_value(&patch).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert!(!object.contains_key("enabled"));
        assert!(!object.contains_key("color"));
    }

    #[test]
    fn battery_level_uses_schema_vocabulary() {
        assert_eq!(serde_json::to_value(BatteryLevel::Full).unwrap(), json!("Full"));
        assert_eq!(serde_json::to_value(BatteryLevel::Ok).unwrap(), json!("Ok"));
        let parsed: BatteryLevel = serde_json::from_value(json!("Low")).unwrap();
        assert_eq!(parsed, BatteryLevel::Low);
    }

    #[test]
    fn stats_row_tolerates_null_aggregates() {
        let row: DeviceStatsRow = serde_json::from_value(json!({
            "id": "device_main_tank_001",
            "name": "@TNK21B3A6",
            "title": "Main Gas Tank #1",
            "enabled": true,
            "latest_tank_level": null,
            "latest_battery": null,
            "total_readings": null
        }))
        .unwrap();

        assert_eq!(row.id, "device_main_tank_001");
        assert!(row.latest_tank_level.is_none());
        assert!(row.latest_battery.is_none());
        assert!(row.device_created_at.is_none());
    }
}
