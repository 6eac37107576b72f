//! Two-way binding between selected ids (view side) and store entities (model side)

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{DomainError, NodeId};
use crate::infrastructure::store::{Entity, Filter, RecordStore, StoreQuery};

/// Maps entities to the ids a selection control submits, and back.
pub struct SelectionBinder {
    store: Arc<dyn RecordStore>,
    entity: String,
    id_field: String,
}

impl SelectionBinder {
    pub fn new(
        store: Arc<dyn RecordStore>,
        entity: impl Into<String>,
        id_field: impl Into<String>,
    ) -> ApplicationResult<Self> {
        let entity = entity.into();
        if entity.trim().is_empty() {
            return Err(DomainError::EmptyEntityName.into());
        }
        let id_field = id_field.into();
        if id_field.trim().is_empty() {
            return Err(DomainError::InvalidFieldName {
                option: "id_field".into(),
                reason: "must not be empty".into(),
            }
            .into());
        }
        Ok(Self {
            store,
            entity,
            id_field,
        })
    }

    /// Id of `entity`; `None` when absent or `null`.
    pub fn to_id(&self, entity: &Entity) -> Option<NodeId> {
        entity.get(&self.id_field).and_then(NodeId::from_value)
    }

    /// Ids of all entities that have one, in input order.
    pub fn to_ids(&self, entities: &[Entity]) -> Vec<NodeId> {
        entities.iter().filter_map(|e| self.to_id(e)).collect()
    }

    /// Entity whose id field equals `id`.
    ///
    /// `null` and the empty string stand for "nothing selected" and return
    /// `None` without touching the store. Submitted text that looks like an
    /// integer also matches an integer id (`"2"` finds `{"id": 2}`). Unknown
    /// ids yield `None`.
    #[instrument(level = "debug", skip(self), fields(entity = %self.entity))]
    pub fn to_entity(&self, id: &Value) -> ApplicationResult<Option<Entity>> {
        if is_blank_selection(id) {
            return Ok(None);
        }
        for candidate in lookup_values(id) {
            let query = StoreQuery::new(&self.entity).filter(Filter::Eq {
                field: self.id_field.clone(),
                value: candidate,
            });
            let found = self
                .store
                .fetch(&query)
                .map_err(|source| ApplicationError::Store {
                    entity: self.entity.clone(),
                    source,
                })?
                .into_iter()
                .next();
            if found.is_some() {
                return Ok(found);
            }
        }
        debug!("no {} with {} = {}", self.entity, self.id_field, id);
        Ok(None)
    }

    /// Entities for `ids`, skipping blanks and misses, in input order.
    pub fn to_entities(&self, ids: &[Value]) -> ApplicationResult<Vec<Entity>> {
        let mut entities = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(entity) = self.to_entity(id)? {
                entities.push(entity);
            }
        }
        Ok(entities)
    }
}

/// Values to try for a submitted id, exact form first.
fn lookup_values(id: &Value) -> Vec<Value> {
    match id {
        Value::String(raw) => match NodeId::parse_loose(raw) {
            NodeId::Int(n) => vec![id.clone(), Value::from(n)],
            _ => vec![id.clone()],
        },
        _ => vec![id.clone()],
    }
}

fn is_blank_selection(id: &Value) -> bool {
    match id {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
