//! System-prompt context: what the model is told about the vehicle and its
//! surroundings before every forwarded turn.
//!
//! | Section | Source | When missing |
//! |---------|--------|--------------|
//! | Persona | config override or built-in text | never |
//! | Vehicle | `VehicleStore` snapshot | never (a vehicle must be selected) |
//! | Environment | locator → geocoder → weather | `"Unknown"` / zeroed weather |
//! | Maintenance | `VehicleStore` history | section omitted |
//! | Data access | static manifest | never |

pub mod assembler;
pub mod environment;

pub use assembler::{
    CAPABILITY_MANIFEST, ContextAssembler, SystemPromptContext, VELOCE_PERSONA, resolve_city_name,
};
pub use environment::EnvironmentGatherer;
