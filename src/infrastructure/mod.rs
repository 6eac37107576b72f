//! Infrastructure layer: record stores, input loading and service wiring
//!
//! This layer implements the store boundary and wires up providers.

pub mod di;
pub mod error;
pub mod memory;
pub mod source;
pub mod store;

pub use error::{InfraError, InfraResult};
pub use memory::InMemoryStore;
pub use store::{Entity, Filter, RecordStore, SortDirection, StoreError, StoreQuery, StoreResult};
