//! Domain core for the Orderly support pipeline.
//!
//! Everything in this crate is deterministic: order/customer/shipment
//! records, the resolved projection the pipeline reports on, the
//! `OrderStore` collaborator interface, status-message templates, and
//! configuration loading. Natural-language handling and collaborator
//! adapters live in the `orderly-agent`, `orderly-db`, and
//! `orderly-server` crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod message;
pub mod store;

pub use domain::customer::{CustomerId, CustomerRecord};
pub use domain::order::{DeliveryStatus, OrderId, OrderRecord};
pub use domain::resolution::{QueryResolution, ResolutionPayload};
pub use domain::shipment::ShipmentRecord;
pub use domain::view::ResolvedOrderView;
pub use errors::InterfaceError;
pub use store::{OrderStore, StoreError};
