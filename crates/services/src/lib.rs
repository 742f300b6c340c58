//! External service adapters for Veloce: weather, position, reverse
//! geocoding, music, SOS messaging and spoken replies.
//!
//! Each adapter implements one capability trait from `veloce-core`.

pub mod builder;
pub mod geolocation;
pub mod music;
pub mod sms;
pub mod tts;
pub mod weather;

pub use geolocation::{FixedLocator, IpApiLocator, NominatimGeocoder};
pub use music::YouTubeMusic;
pub use sms::{TwilioCredentials, TwilioNotifier};
pub use tts::{CommandSpeaker, NoopSpeaker};
pub use weather::OpenWeatherMap;
