//! SQLite vehicle store.
//!
//! Tables:
//! - `vehicles`: one row per vehicle; tire pressures stored as JSON
//! - `maintenance_records`: service history, foreign key to `vehicles`
//! - `emergency_contacts`: SOS recipients
//! - `police_stations`: positions used for nearest-station lookup
//!
//! An empty database is seeded with the sample fleet on first open.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};
use veloce_core::emergency::{EmergencyContact, PoliceStation};
use veloce_core::error::StoreError;
use veloce_core::vehicle::{
    MaintenanceRecord, TirePressure, VehicleSnapshot, VehicleStore, VehicleSummary,
};

use crate::seed;

pub struct SqliteVehicleStore {
    pool: SqlitePool,
}

impl SqliteVehicleStore {
    /// Open (or create) the database at `path` and run migrations.
    ///
    /// Pass `"sqlite::memory:"` for an ephemeral database.
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        // Every connection to ":memory:" is its own database.
        let max_connections = if path.contains(":memory:") { 1 } else { 4 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        store.seed_if_empty().await?;
        info!("SQLite vehicle store initialized at {path}");
        Ok(store)
    }

    /// Open a database file, creating parent directories as needed.
    pub async fn open(path: &std::path::Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Storage(format!("{}: {e}", parent.display())))?;
        }
        Self::new(&format!("sqlite://{}", path.display())).await
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS vehicles (
                id                INTEGER PRIMARY KEY AUTOINCREMENT,
                model             TEXT NOT NULL,
                year              INTEGER NOT NULL,
                vin               TEXT UNIQUE NOT NULL,
                current_mileage   REAL NOT NULL DEFAULT 0,
                battery_level     REAL,
                tire_pressure     TEXT NOT NULL,
                engine_oil_life   REAL NOT NULL DEFAULT 100,
                last_service_date TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("vehicles table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS maintenance_records (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                vehicle_id   INTEGER NOT NULL REFERENCES vehicles(id) ON DELETE CASCADE,
                service_date TEXT NOT NULL,
                service_type TEXT NOT NULL,
                mileage      REAL NOT NULL,
                description  TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("maintenance_records table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS emergency_contacts (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                name         TEXT NOT NULL,
                phone_number TEXT NOT NULL,
                relationship TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("emergency_contacts table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS police_stations (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                name         TEXT NOT NULL,
                latitude     REAL NOT NULL,
                longitude    REAL NOT NULL,
                phone_number TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("police_stations table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_maintenance_vehicle ON maintenance_records(vehicle_id, service_date DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("maintenance index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    async fn seed_if_empty(&self) -> Result<(), StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vehicles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("vehicle count: {e}")))?;
        if count > 0 {
            return Ok(());
        }

        for vehicle in seed::sample_vehicles() {
            self.save_vehicle(&vehicle).await?;
        }
        for record in seed::sample_maintenance() {
            self.add_maintenance_record(&record).await?;
        }
        info!("Seeded empty database with sample vehicles");
        Ok(())
    }

    /// Append a service record. The record's `id` is ignored.
    pub async fn add_maintenance_record(&self, record: &MaintenanceRecord) -> Result<i64, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO maintenance_records (vehicle_id, service_date, service_type, mileage, description)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(record.vehicle_id)
        .bind(record.service_date)
        .bind(&record.service_type)
        .bind(record.mileage)
        .bind(&record.description)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("INSERT maintenance failed: {e}")))?;
        Ok(result.last_insert_rowid())
    }

    /// Register an SOS recipient. The contact's `id` is ignored.
    pub async fn add_emergency_contact(&self, contact: &EmergencyContact) -> Result<i64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO emergency_contacts (name, phone_number, relationship) VALUES (?1, ?2, ?3)",
        )
        .bind(&contact.name)
        .bind(&contact.phone_number)
        .bind(&contact.relationship)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("INSERT contact failed: {e}")))?;
        Ok(result.last_insert_rowid())
    }

    /// Register a police station. The station's `id` is ignored.
    pub async fn add_police_station(&self, station: &PoliceStation) -> Result<i64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO police_stations (name, latitude, longitude, phone_number) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&station.name)
        .bind(station.latitude)
        .bind(station.longitude)
        .bind(&station.phone_number)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("INSERT station failed: {e}")))?;
        Ok(result.last_insert_rowid())
    }

    fn row_to_vehicle(row: &SqliteRow) -> Result<VehicleSnapshot, StoreError> {
        let column = |name: &str, e: sqlx::Error| StoreError::QueryFailed(format!("{name} column: {e}"));

        let tire_json: String = row
            .try_get("tire_pressure")
            .map_err(|e| column("tire_pressure", e))?;
        let tire_pressure: TirePressure = serde_json::from_str(&tire_json)
            .map_err(|e| StoreError::QueryFailed(format!("tire_pressure JSON: {e}")))?;

        Ok(VehicleSnapshot {
            id: row.try_get("id").map_err(|e| column("id", e))?,
            model: row.try_get("model").map_err(|e| column("model", e))?,
            year: row.try_get("year").map_err(|e| column("year", e))?,
            vin: row.try_get("vin").map_err(|e| column("vin", e))?,
            mileage: row
                .try_get("current_mileage")
                .map_err(|e| column("current_mileage", e))?,
            battery_level: row
                .try_get("battery_level")
                .map_err(|e| column("battery_level", e))?,
            tire_pressure,
            engine_oil_life: row
                .try_get("engine_oil_life")
                .map_err(|e| column("engine_oil_life", e))?,
            last_service_date: row
                .try_get::<NaiveDate, _>("last_service_date")
                .map_err(|e| column("last_service_date", e))?,
        })
    }

    fn row_to_record(row: &SqliteRow) -> Result<MaintenanceRecord, StoreError> {
        let column = |name: &str, e: sqlx::Error| StoreError::QueryFailed(format!("{name} column: {e}"));
        Ok(MaintenanceRecord {
            id: row.try_get("id").map_err(|e| column("id", e))?,
            vehicle_id: row.try_get("vehicle_id").map_err(|e| column("vehicle_id", e))?,
            service_date: row
                .try_get("service_date")
                .map_err(|e| column("service_date", e))?,
            service_type: row
                .try_get("service_type")
                .map_err(|e| column("service_type", e))?,
            mileage: row.try_get("mileage").map_err(|e| column("mileage", e))?,
            description: row
                .try_get("description")
                .map_err(|e| column("description", e))?,
        })
    }
}

#[async_trait]
impl VehicleStore for SqliteVehicleStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn get_vehicle(&self, id: i64) -> Result<VehicleSnapshot, StoreError> {
        let row = sqlx::query("SELECT * FROM vehicles WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("get_vehicle: {e}")))?
            .ok_or(StoreError::NotFound(id))?;
        Self::row_to_vehicle(&row)
    }

    async fn list_vehicles(&self) -> Result<Vec<VehicleSummary>, StoreError> {
        let rows = sqlx::query("SELECT id, model, year FROM vehicles ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("list_vehicles: {e}")))?;

        rows.iter()
            .map(|row| {
                Ok(VehicleSummary {
                    id: row
                        .try_get("id")
                        .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))?,
                    model: row
                        .try_get("model")
                        .map_err(|e| StoreError::QueryFailed(format!("model column: {e}")))?,
                    year: row
                        .try_get("year")
                        .map_err(|e| StoreError::QueryFailed(format!("year column: {e}")))?,
                })
            })
            .collect()
    }

    async fn save_vehicle(&self, vehicle: &VehicleSnapshot) -> Result<(), StoreError> {
        let tire_json = serde_json::to_string(&vehicle.tire_pressure)
            .map_err(|e| StoreError::Storage(format!("Tire pressure serialization: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO vehicles (id, model, year, vin, current_mileage, battery_level,
                                  tire_pressure, engine_oil_life, last_service_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                model = excluded.model,
                year = excluded.year,
                vin = excluded.vin,
                current_mileage = excluded.current_mileage,
                battery_level = excluded.battery_level,
                tire_pressure = excluded.tire_pressure,
                engine_oil_life = excluded.engine_oil_life,
                last_service_date = excluded.last_service_date
            "#,
        )
        .bind(vehicle.id)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(&vehicle.vin)
        .bind(vehicle.mileage)
        .bind(vehicle.battery_level)
        .bind(&tire_json)
        .bind(vehicle.engine_oil_life)
        .bind(vehicle.last_service_date)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("UPSERT vehicle failed: {e}")))?;

        debug!(vehicle_id = vehicle.id, "Saved vehicle");
        Ok(())
    }

    async fn maintenance_records(
        &self,
        vehicle_id: i64,
    ) -> Result<Vec<MaintenanceRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM maintenance_records WHERE vehicle_id = ?1 ORDER BY service_date DESC, id DESC",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("maintenance_records: {e}")))?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn emergency_contacts(&self) -> Result<Vec<EmergencyContact>, StoreError> {
        let rows = sqlx::query("SELECT * FROM emergency_contacts ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("emergency_contacts: {e}")))?;

        rows.iter()
            .map(|row| {
                let column =
                    |name: &str, e: sqlx::Error| StoreError::QueryFailed(format!("{name} column: {e}"));
                Ok(EmergencyContact {
                    id: row.try_get("id").map_err(|e| column("id", e))?,
                    name: row.try_get("name").map_err(|e| column("name", e))?,
                    phone_number: row
                        .try_get("phone_number")
                        .map_err(|e| column("phone_number", e))?,
                    relationship: row
                        .try_get("relationship")
                        .map_err(|e| column("relationship", e))?,
                })
            })
            .collect()
    }

    async fn police_stations(&self) -> Result<Vec<PoliceStation>, StoreError> {
        let rows = sqlx::query("SELECT * FROM police_stations ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("police_stations: {e}")))?;

        rows.iter()
            .map(|row| {
                let column =
                    |name: &str, e: sqlx::Error| StoreError::QueryFailed(format!("{name} column: {e}"));
                Ok(PoliceStation {
                    id: row.try_get("id").map_err(|e| column("id", e))?,
                    name: row.try_get("name").map_err(|e| column("name", e))?,
                    latitude: row.try_get("latitude").map_err(|e| column("latitude", e))?,
                    longitude: row.try_get("longitude").map_err(|e| column("longitude", e))?,
                    phone_number: row
                        .try_get("phone_number")
                        .map_err(|e| column("phone_number", e))?,
                })
            })
            .collect()
    }
}
