//! Sample fleet used to seed empty stores.

use chrono::NaiveDate;
use veloce_core::vehicle::{MaintenanceRecord, TirePressure, VehicleSnapshot};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// An electric ID.4 and a combustion Golf GTI.
pub fn sample_vehicles() -> Vec<VehicleSnapshot> {
    vec![
        VehicleSnapshot {
            id: 1,
            model: "ID.4".into(),
            year: 2024,
            vin: "WVGZZZE2ZMP123456".into(),
            mileage: 15000.5,
            battery_level: Some(85.5),
            tire_pressure: TirePressure::uniform(32.0),
            engine_oil_life: 75.0,
            last_service_date: date(2024, 1, 15),
        },
        VehicleSnapshot {
            id: 2,
            model: "Golf GTI".into(),
            year: 2023,
            vin: "WVWZZZ1KZNW987654".into(),
            mileage: 22000.0,
            battery_level: None,
            tire_pressure: TirePressure {
                front_left: 35.0,
                front_right: 35.0,
                rear_left: 35.0,
                rear_right: 34.0,
            },
            engine_oil_life: 45.0,
            last_service_date: date(2023, 12, 1),
        },
    ]
}

pub fn sample_maintenance() -> Vec<MaintenanceRecord> {
    vec![
        MaintenanceRecord {
            id: 1,
            vehicle_id: 1,
            service_date: date(2024, 1, 15),
            service_type: "Annual inspection".into(),
            mileage: 14800.0,
            description: "Brake fluid check and software update".into(),
        },
        MaintenanceRecord {
            id: 2,
            vehicle_id: 2,
            service_date: date(2023, 6, 10),
            service_type: "Tire rotation".into(),
            mileage: 17500.0,
            description: String::new(),
        },
        MaintenanceRecord {
            id: 3,
            vehicle_id: 2,
            service_date: date(2023, 12, 1),
            service_type: "Oil change".into(),
            mileage: 21500.0,
            description: "Synthetic 5W-30, new oil filter".into(),
        },
    ]
}
