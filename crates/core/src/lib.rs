//! # Veloce Core
//!
//! Domain types, capability traits, and error definitions for the Veloce
//! vehicle assistant. This crate has **no framework dependencies**; it
//! defines the domain model that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (chat model, speech, weather, geocoding,
//! music, SMS, vehicle storage) is a trait here. Implementations live in
//! `veloce-providers`, `veloce-services` and `veloce-storage`. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod emergency;
pub mod environment;
pub mod error;
pub mod message;
pub mod music;
pub mod provider;
pub mod speech;
pub mod vehicle;

// Re-export key types at crate root for ergonomics
pub use emergency::{EmergencyContact, EmergencyNotifier, PoliceStation};
pub use environment::{
    AddressFields, Coordinates, EnvironmentSnapshot, GeoLocator, LocationInfo, ReverseGeocoder,
    WeatherProvider, WeatherSnapshot,
};
pub use error::{ProviderError, StoreError};
pub use message::{Content, ContentPart, ImageAttachment, ImageRef, Message, Role};
pub use music::{MusicProvider, PlayableRef};
pub use provider::{ChatModel, CompletionRequest};
pub use speech::{AudioClip, SpeechToText, TextToSpeech};
pub use vehicle::{MaintenanceRecord, TirePressure, VehicleSnapshot, VehicleStore, VehicleSummary};
