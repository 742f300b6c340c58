//! Vehicle store implementations for Veloce.

pub mod in_memory;
pub mod seed;
pub mod sqlite;

pub use in_memory::InMemoryVehicleStore;
pub use sqlite::SqliteVehicleStore;
