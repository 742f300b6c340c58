//! Wiring shared by the commands: config, vehicle store and session.

use std::path::Path;
use std::sync::Arc;

use tracing::warn;
use veloce_assistant::{
    CommandDispatcher, ContextAssembler, EnvironmentGatherer, ResponsePipeline, Session,
};
use veloce_config::AppConfig;
use veloce_core::error::StoreError;
use veloce_core::message::ImageAttachment;
use veloce_core::vehicle::VehicleStore;
use veloce_providers::builder::{build_chat_model, build_transcriber};
use veloce_services::builder::{
    build_geocoder, build_locator, build_music, build_notifier, build_speaker, build_weather,
};
use veloce_storage::{InMemoryVehicleStore, SqliteVehicleStore};

pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    AppConfig::load().map_err(|e| format!("Failed to load config: {e}").into())
}

/// The configured vehicle store; `memory` is seeded with the sample fleet.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn VehicleStore>, StoreError> {
    match config.storage.backend.as_str() {
        "memory" => Ok(Arc::new(InMemoryVehicleStore::seeded())),
        _ => Ok(Arc::new(
            SqliteVehicleStore::open(&config.storage.database_path()).await?,
        )),
    }
}

/// `id`, else the configured default, else the first stored vehicle.
pub async fn pick_vehicle(
    store: &dyn VehicleStore,
    requested: Option<i64>,
    config: &AppConfig,
) -> Result<i64, Box<dyn std::error::Error>> {
    if let Some(id) = requested.or(config.assistant.default_vehicle) {
        return Ok(id);
    }
    let vehicles = store.list_vehicles().await?;
    vehicles
        .first()
        .map(|v| v.id)
        .ok_or_else(|| "No vehicles in the database — run `veloce onboard`".into())
}

/// A session wired to every configured capability.
pub fn build_session(
    config: &AppConfig,
    store: Arc<dyn VehicleStore>,
) -> Result<Session, Box<dyn std::error::Error>> {
    let model = build_chat_model(config)?;
    let transcriber = match build_transcriber(config) {
        Ok(t) => Some(t),
        Err(e) => {
            warn!(error = %e, "Voice input disabled");
            None
        }
    };

    let locator = build_locator(config);
    let environment = EnvironmentGatherer::new(locator.clone(), build_geocoder(config))
        .with_weather(build_weather(config));
    let dispatcher = CommandDispatcher::new(locator)
        .with_music(build_music(config))
        .with_notifier(build_notifier(config, store.clone()));

    Ok(Session::new(
        store,
        ResponsePipeline::from_config(model, &config.model),
        environment,
        dispatcher,
    )
    .with_assembler(ContextAssembler::from_config(&config.assistant))
    .with_transcriber(transcriber)
    .with_speaker(Some(build_speaker(config)))
    .with_maintenance_limit(config.assistant.maintenance_in_prompt))
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

pub async fn load_image(path: &Path) -> Result<ImageAttachment, Box<dyn std::error::Error>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Cannot read image {}: {e}", path.display()))?;
    Ok(ImageAttachment::from_bytes(&bytes, mime_for(path)))
}
