//! Service container for dependency injection
//!
//! Wires providers to the loaded settings and the record store.

use std::sync::Arc;

use crate::application::{
    ArrayTreeDataProvider, EntityTreeDataProvider, Record, SelectionBinder,
};
use crate::config::Settings;
use crate::infrastructure::store::RecordStore;
use crate::infrastructure::{InMemoryStore, InfraResult};

/// Container holding settings and the shared record store.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Store abstraction backing entity providers
    pub store: Arc<dyn RecordStore>,
}

impl ServiceContainer {
    /// Create a container over an empty in-memory store.
    pub fn new(settings: Settings) -> Self {
        Self::with_store(settings, Arc::new(InMemoryStore::new()))
    }

    /// Create a container with a custom store (for tests or other backends).
    pub fn with_store(settings: Settings, store: Arc<dyn RecordStore>) -> Self {
        Self {
            settings: Arc::new(settings),
            store,
        }
    }

    /// Provider over a static record list using the configured tree settings.
    pub fn array_provider(&self, records: Vec<Record>) -> ArrayTreeDataProvider {
        ArrayTreeDataProvider::new(records, self.settings.tree)
    }

    /// Provider over `entity` rows using the configured field mapping.
    pub fn entity_provider(&self, entity: &str) -> InfraResult<EntityTreeDataProvider> {
        Ok(EntityTreeDataProvider::new(
            Arc::clone(&self.store),
            entity,
            self.settings.fields.clone(),
            self.settings.tree,
        )?)
    }

    /// Binder resolving selected ids of `entity` back to rows.
    pub fn selection_binder(&self, entity: &str) -> InfraResult<SelectionBinder> {
        Ok(SelectionBinder::new(
            Arc::clone(&self.store),
            entity,
            self.settings.fields.id_field.clone(),
        )?)
    }
}
