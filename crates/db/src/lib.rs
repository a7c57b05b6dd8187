pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod store;

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{DemoSeedDataset, OrderSeedInfo, SeedCheck, SeedResult, VerificationResult};
pub use store::{InMemoryOrderStore, SqlOrderStore};
