//! Renders the system message from a vehicle and an environment snapshot.
//!
//! # Determinism
//!
//! Rendering uses only its inputs. The timestamp comes from the
//! [`EnvironmentSnapshot`], never from the clock, so identical inputs
//! always produce identical prompt text.

use veloce_config::AssistantConfig;
use veloce_core::environment::{AddressFields, EnvironmentSnapshot, UNKNOWN};
use veloce_core::message::Message;
use veloce_core::vehicle::{MaintenanceRecord, VehicleSnapshot};

/// Built-in assistant persona.
pub const VELOCE_PERSONA: &str = "You are Veloce AI, Volkswagen's intelligent vehicle assistant. You help users with:
- Vehicle information and status
- Maintenance scheduling and alerts
- Weather updates and driving conditions
- Voice commands for vehicle controls
- Navigation assistance
- Battery management for electric vehicles

Always maintain a helpful, professional tone focusing on Volkswagen vehicles and their features.
If asked about non-Volkswagen vehicles, politely redirect to VW equivalents.";

/// What the assistant may reference when answering.
pub const CAPABILITY_MANIFEST: &str = "[Data Access]
You have read access to the data above and nothing else:
- Vehicle identity and live telemetry (battery, tire pressure, oil life, mileage)
- Service history for the selected vehicle
- Current location, local weather and time
Lights, doors, engine, music and SOS requests are handled by the vehicle directly.
Do not invent telemetry values that are not listed above.";

/// Everything rendered into one system message.
#[derive(Debug, Clone, Copy)]
pub struct SystemPromptContext<'a> {
    pub vehicle: &'a VehicleSnapshot,
    pub environment: &'a EnvironmentSnapshot,
    /// Most recent first. Empty omits the section.
    pub maintenance: &'a [MaintenanceRecord],
}

/// Builds system messages for the currently selected vehicle.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    persona: String,
}

impl ContextAssembler {
    pub fn new() -> Self {
        Self {
            persona: VELOCE_PERSONA.to_string(),
        }
    }

    /// Replace the persona paragraph at the top of the prompt.
    pub fn with_persona(persona: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
        }
    }

    pub fn from_config(config: &AssistantConfig) -> Self {
        match config.system_prompt_override.as_deref() {
            Some(persona) if !persona.trim().is_empty() => Self::with_persona(persona),
            _ => Self::new(),
        }
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    /// System message for `vehicle` in `environment`, without service history.
    pub fn build_system_prompt(
        &self,
        vehicle: &VehicleSnapshot,
        environment: &EnvironmentSnapshot,
    ) -> Message {
        self.assemble(&SystemPromptContext {
            vehicle,
            environment,
            maintenance: &[],
        })
    }

    /// System message for a full context. Never fails.
    pub fn assemble(&self, context: &SystemPromptContext<'_>) -> Message {
        let mut sections = vec![
            self.persona.clone(),
            render_vehicle(context.vehicle),
            render_environment(context.environment),
        ];
        if !context.maintenance.is_empty() {
            sections.push(render_maintenance(context.maintenance));
        }
        sections.push(CAPABILITY_MANIFEST.to_string());

        Message::system(sections.join("\n\n"))
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new()
    }
}

// ── Section renderers ─────────────────────────────────────────────────────

fn render_vehicle(vehicle: &VehicleSnapshot) -> String {
    let battery = match vehicle.battery_level {
        Some(level) => format!("{level}%"),
        None => "N/A (not an electric vehicle)".to_string(),
    };
    let tires = vehicle
        .tire_pressure
        .wheels()
        .iter()
        .map(|(wheel, psi)| format!("{wheel} {psi}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "[Vehicle]\n\
         - Model: {name}\n\
         - VIN: {vin}\n\
         - Mileage: {mileage} miles\n\
         - Battery level: {battery}\n\
         - Tire pressure (PSI): {tires}\n\
         - Engine oil life: {oil}%\n\
         - Last service: {service}",
        name = vehicle.display_name(),
        vin = vehicle.vin,
        mileage = vehicle.mileage,
        oil = vehicle.engine_oil_life,
        service = vehicle.last_service_date.format("%Y-%m-%d"),
    )
}

fn render_environment(environment: &EnvironmentSnapshot) -> String {
    let location = &environment.location;
    let position = match location.coordinates {
        Some(coordinates) => format!("{} ({coordinates})", location.city),
        None => location.city.clone(),
    };
    let weather = &environment.weather;

    format!(
        "[Environment]\n\
         - Location: {position}\n\
         - Weather: {description}, {temperature}°C, humidity {humidity}%, wind {wind} m/s\n\
         - Current time: {time}",
        description = weather.description,
        temperature = weather.temperature,
        humidity = weather.humidity,
        wind = weather.wind_speed,
        time = environment.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

fn render_maintenance(records: &[MaintenanceRecord]) -> String {
    let lines: Vec<String> = records
        .iter()
        .map(|r| {
            let mut line = format!(
                "- {}: {} at {} miles",
                r.service_date.format("%Y-%m-%d"),
                r.service_type,
                r.mileage
            );
            if !r.description.is_empty() {
                line.push_str(&format!(" ({})", r.description));
            }
            line
        })
        .collect();
    format!("[Recent Maintenance]\n{}", lines.join("\n"))
}

/// City name from reverse-geocoded address components.
///
/// Takes the first non-empty of city, town, village, suburb, state and
/// keeps its first whitespace- or comma-delimited token.
pub fn resolve_city_name(address: &AddressFields) -> String {
    [
        &address.city,
        &address.town,
        &address.village,
        &address.suburb,
        &address.state,
    ]
    .into_iter()
    .filter_map(|field| field.as_deref())
    .find_map(|value| {
        value
            .split(|c: char| c.is_whitespace() || c == ',')
            .find(|token| !token.is_empty())
    })
    .map(str::to_string)
    .unwrap_or_else(|| UNKNOWN.to_string())
}
