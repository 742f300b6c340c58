//! `veloce vehicles`: List the vehicles in the store.

use super::runtime;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = runtime::load_config()?;
    let store = runtime::open_store(&config).await?;
    let vehicles = store.list_vehicles().await?;

    if vehicles.is_empty() {
        println!("  No vehicles found — run `veloce onboard` to create the sample fleet.");
        return Ok(());
    }

    println!("🚗 Vehicles ({})", store.name());
    for v in &vehicles {
        let marker = if config.assistant.default_vehicle == Some(v.id) {
            " (default)"
        } else {
            ""
        };
        println!("  [{}] {v}{marker}", v.id);
    }
    Ok(())
}
