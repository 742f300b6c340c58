//! In-memory store for tests and ephemeral sessions.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use veloce_core::emergency::{EmergencyContact, PoliceStation};
use veloce_core::error::StoreError;
use veloce_core::vehicle::{MaintenanceRecord, VehicleSnapshot, VehicleStore, VehicleSummary};

use crate::seed;

/// A vehicle store backed by in-process collections.
pub struct InMemoryVehicleStore {
    vehicles: RwLock<BTreeMap<i64, VehicleSnapshot>>,
    maintenance: Vec<MaintenanceRecord>,
    contacts: Vec<EmergencyContact>,
    stations: Vec<PoliceStation>,
}

impl InMemoryVehicleStore {
    /// An empty store.
    pub fn new() -> Self {
        Self {
            vehicles: RwLock::new(BTreeMap::new()),
            maintenance: Vec::new(),
            contacts: Vec::new(),
            stations: Vec::new(),
        }
    }

    /// A store holding the sample fleet and its service history.
    pub fn seeded() -> Self {
        let vehicles = seed::sample_vehicles()
            .into_iter()
            .map(|v| (v.id, v))
            .collect();
        Self {
            vehicles: RwLock::new(vehicles),
            maintenance: seed::sample_maintenance(),
            contacts: Vec::new(),
            stations: Vec::new(),
        }
    }

    pub fn with_contacts(mut self, contacts: Vec<EmergencyContact>) -> Self {
        self.contacts = contacts;
        self
    }

    pub fn with_stations(mut self, stations: Vec<PoliceStation>) -> Self {
        self.stations = stations;
        self
    }

    pub fn with_maintenance(mut self, records: Vec<MaintenanceRecord>) -> Self {
        self.maintenance = records;
        self
    }
}

impl Default for InMemoryVehicleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VehicleStore for InMemoryVehicleStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn get_vehicle(&self, id: i64) -> Result<VehicleSnapshot, StoreError> {
        self.vehicles
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn list_vehicles(&self) -> Result<Vec<VehicleSummary>, StoreError> {
        Ok(self
            .vehicles
            .read()
            .await
            .values()
            .map(|v| VehicleSummary {
                id: v.id,
                model: v.model.clone(),
                year: v.year,
            })
            .collect())
    }

    async fn save_vehicle(&self, vehicle: &VehicleSnapshot) -> Result<(), StoreError> {
        self.vehicles
            .write()
            .await
            .insert(vehicle.id, vehicle.clone());
        Ok(())
    }

    async fn maintenance_records(
        &self,
        vehicle_id: i64,
    ) -> Result<Vec<MaintenanceRecord>, StoreError> {
        let mut records: Vec<MaintenanceRecord> = self
            .maintenance
            .iter()
            .filter(|r| r.vehicle_id == vehicle_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.service_date.cmp(&a.service_date));
        Ok(records)
    }

    async fn emergency_contacts(&self) -> Result<Vec<EmergencyContact>, StoreError> {
        Ok(self.contacts.clone())
    }

    async fn police_stations(&self) -> Result<Vec<PoliceStation>, StoreError> {
        Ok(self.stations.clone())
    }
}
