//! Application layer: record normalization, providers and presentation
//!
//! This layer orchestrates domain logic and depends on the store boundary trait.

pub mod error;
pub mod normalizer;
pub mod options;
pub mod provider;
pub mod selection;
pub mod view;

pub use error::{ApplicationError, ApplicationResult};
pub use normalizer::{normalize_map_record, normalize_map_records, FieldMapping, Record, RecordProjection};
pub use options::QueryOptions;
pub use provider::{ArrayTreeDataProvider, EntityTreeDataProvider, TreeDataProvider};
pub use selection::SelectionBinder;
pub use view::{Choice, NodeView, TreeView};
