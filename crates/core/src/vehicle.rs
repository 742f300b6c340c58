//! Vehicle records and the storage trait that serves them.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::emergency::{EmergencyContact, PoliceStation};
use crate::error::StoreError;

/// Tire pressure per wheel position, in PSI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TirePressure {
    #[serde(rename = "FL")]
    pub front_left: f64,
    #[serde(rename = "FR")]
    pub front_right: f64,
    #[serde(rename = "RL")]
    pub rear_left: f64,
    #[serde(rename = "RR")]
    pub rear_right: f64,
}

impl TirePressure {
    pub fn uniform(psi: f64) -> Self {
        Self {
            front_left: psi,
            front_right: psi,
            rear_left: psi,
            rear_right: psi,
        }
    }

    /// Wheel label and pressure, in dashboard order.
    pub fn wheels(&self) -> [(&'static str, f64); 4] {
        [
            ("FL", self.front_left),
            ("FR", self.front_right),
            ("RL", self.rear_left),
            ("RR", self.rear_right),
        ]
    }
}

/// Read-only view of one vehicle row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub id: i64,
    pub model: String,
    pub year: i32,
    pub vin: String,

    /// Odometer reading
    pub mileage: f64,

    /// State of charge in percent; `None` for combustion vehicles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<f64>,

    pub tire_pressure: TirePressure,

    /// Remaining engine-oil life in percent
    pub engine_oil_life: f64,

    pub last_service_date: NaiveDate,
}

impl VehicleSnapshot {
    /// "2024 ID.4" style label.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.year, self.model)
    }

    pub fn is_electric(&self) -> bool {
        self.battery_level.is_some()
    }
}

/// Row used for vehicle pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSummary {
    pub id: i64,
    pub model: String,
    pub year: i32,
}

impl std::fmt::Display for VehicleSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.year, self.model)
    }
}

/// A past service visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub id: i64,
    pub vehicle_id: i64,
    pub service_date: NaiveDate,
    pub service_type: String,
    pub mileage: f64,
    #[serde(default)]
    pub description: String,
}

/// Storage collaborator holding vehicles, maintenance history, emergency
/// contacts and police-station locations.
#[async_trait]
pub trait VehicleStore: Send + Sync {
    /// A human-readable name for this backend (e.g., "sqlite", "in_memory").
    fn name(&self) -> &str;

    /// Fetch one vehicle by id.
    async fn get_vehicle(&self, id: i64) -> Result<VehicleSnapshot, StoreError>;

    /// All vehicles, ordered by id.
    async fn list_vehicles(&self) -> Result<Vec<VehicleSummary>, StoreError>;

    /// Insert or replace a vehicle row.
    async fn save_vehicle(&self, vehicle: &VehicleSnapshot) -> Result<(), StoreError>;

    /// Service history for a vehicle, most recent first.
    async fn maintenance_records(&self, vehicle_id: i64)
    -> Result<Vec<MaintenanceRecord>, StoreError>;

    async fn emergency_contacts(&self) -> Result<Vec<EmergencyContact>, StoreError>;

    async fn police_stations(&self) -> Result<Vec<PoliceStation>, StoreError>;
}
