//! `veloce onboard`: First-time setup.

use veloce_config::AppConfig;
use veloce_core::vehicle::VehicleStore;
use veloce_storage::SqliteVehicleStore;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = AppConfig::config_path();

    println!("🚗 Veloce — First-Time Setup");
    println!("============================\n");

    // Create directories
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    // Create config file
    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
    }

    // Create the vehicle database
    let config = AppConfig::load_from(&config_path)?;
    let db_path = config.storage.database_path();
    let store = SqliteVehicleStore::open(&db_path).await?;
    let vehicles = store.list_vehicles().await?;
    println!("✅ Vehicle database ready: {} ({} vehicles)", db_path.display(), vehicles.len());
    for v in &vehicles {
        println!("   [{}] {v}", v.id);
    }

    println!("\n📝 Next steps:");
    println!("   1. export GROQ_API_KEY=gsk_...");
    println!("   2. Optional: OPENWEATHERMAP_API_KEY, YOUTUBE_API_KEY, TWILIO_* for weather, music and SOS");
    println!("   3. veloce chat");
    println!();

    Ok(())
}
