//! `veloce status`: Vehicle telemetry and service history.

use veloce_core::vehicle::{MaintenanceRecord, VehicleSnapshot, VehicleStore};

use super::runtime;

pub async fn run(vehicle: Option<i64>) -> Result<(), Box<dyn std::error::Error>> {
    let config = runtime::load_config()?;
    let store = runtime::open_store(&config).await?;
    let id = runtime::pick_vehicle(store.as_ref(), vehicle, &config).await?;
    print!("{}", report(store.as_ref(), id).await?);
    Ok(())
}

/// Full status report for one vehicle.
pub async fn report(store: &dyn VehicleStore, id: i64) -> Result<String, Box<dyn std::error::Error>> {
    let vehicle = store.get_vehicle(id).await?;
    let records = store.maintenance_records(id).await?;
    Ok(render(&vehicle, &records))
}

fn render(vehicle: &VehicleSnapshot, records: &[MaintenanceRecord]) -> String {
    let mut out = String::new();
    out.push_str(&format!("🚗 {} (VIN {})\n", vehicle.display_name(), vehicle.vin));
    out.push_str(&format!("   Mileage:        {} mi\n", vehicle.mileage));
    match vehicle.battery_level {
        Some(level) => out.push_str(&format!("   Battery:        {level}%\n")),
        None => out.push_str("   Battery:        N/A (not an electric vehicle)\n"),
    }
    out.push_str(&format!("   Oil life:       {}%\n", vehicle.engine_oil_life));
    let tires = vehicle
        .tire_pressure
        .wheels()
        .iter()
        .map(|(wheel, psi)| format!("{wheel} {psi}"))
        .collect::<Vec<_>>()
        .join(" | ");
    out.push_str(&format!("   Tire pressure:  {tires} PSI\n"));
    out.push_str(&format!(
        "   Last service:   {}\n",
        vehicle.last_service_date.format("%Y-%m-%d")
    ));

    out.push('\n');
    if records.is_empty() {
        out.push_str("🔧 No maintenance history\n");
        return out;
    }
    out.push_str("🔧 Maintenance history\n");
    for r in records {
        out.push_str(&format!(
            "   {}  {:<18} {:>9} mi",
            r.service_date.format("%Y-%m-%d"),
            r.service_type,
            r.mileage
        ));
        if !r.description.is_empty() {
            out.push_str(&format!("  {}", r.description));
        }
        out.push('\n');
    }
    out
}
