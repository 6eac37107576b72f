//! In-memory record store backed by JSON tables

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::infrastructure::store::{Entity, RecordStore, SortDirection, StoreError, StoreQuery, StoreResult};

/// Tables of entity rows held in memory.
///
/// Loaded from a JSON document of the shape `{ "<entity>": [ {row}, ... ] }`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: BTreeMap<String, Vec<Entity>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, entity: impl Into<String>, rows: Vec<Entity>) -> Self {
        self.insert_table(entity, rows);
        self
    }

    pub fn insert_table(&mut self, entity: impl Into<String>, rows: Vec<Entity>) {
        self.tables.insert(entity.into(), rows);
    }

    /// Append one row, creating the table if needed.
    pub fn insert(&mut self, entity: &str, row: Entity) {
        self.tables.entry(entity.to_string()).or_default().push(row);
    }

    pub fn from_json(document: &Value) -> StoreResult<Self> {
        let tables = document
            .as_object()
            .ok_or_else(|| StoreError::DataFormat("store document must be an object of tables".into()))?;

        let mut store = Self::new();
        for (name, rows) in tables {
            let rows = rows
                .as_array()
                .ok_or_else(|| StoreError::DataFormat(format!("table '{}' must be an array", name)))?;
            let rows = rows
                .iter()
                .map(|row| {
                    row.as_object().cloned().ok_or_else(|| {
                        StoreError::DataFormat(format!("table '{}' contains a non-object row", name))
                    })
                })
                .collect::<StoreResult<Vec<_>>>()?;
            store.insert_table(name.clone(), rows);
        }
        Ok(store)
    }

    pub fn from_json_str(content: &str) -> StoreResult<Self> {
        let document: Value =
            serde_json::from_str(content).map_err(|e| StoreError::DataFormat(e.to_string()))?;
        Self::from_json(&document)
    }

    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self, entity: &str) -> usize {
        self.tables.get(entity).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.values().all(Vec::is_empty)
    }
}

impl RecordStore for InMemoryStore {
    #[instrument(level = "debug", skip(self))]
    fn fetch(&self, query: &StoreQuery) -> StoreResult<Vec<Entity>> {
        let rows = self
            .tables
            .get(&query.entity)
            .ok_or_else(|| StoreError::UnknownEntity(query.entity.clone()))?;

        let mut result: Vec<Entity> = rows.iter().filter(|row| query.matches(row)).cloned().collect();
        if !query.order_by.is_empty() {
            // Stable: rows equal on every key keep their stored order
            result.sort_by(|a, b| {
                query
                    .order_by
                    .iter()
                    .map(|(field, direction)| {
                        let ord = compare_values(a.get(field), b.get(field));
                        match direction {
                            SortDirection::Asc => ord,
                            SortDirection::Desc => ord.reverse(),
                        }
                    })
                    .find(|ord| *ord != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }
        debug!("fetched {} of {} rows from '{}'", result.len(), rows.len(), query.entity);
        Ok(result)
    }
}

/// SQL-like ordering: nulls first, then bools, numbers, strings, everything else.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.unwrap_or(&Value::Null);
    let b = b.unwrap_or(&Value::Null);
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a)
            .cmp(&type_rank(b))
            .then_with(|| a.to_string().cmp(&b.to_string())),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::store::Filter;
    use serde_json::json;

    fn store() -> InMemoryStore {
        InMemoryStore::from_json(&json!({
            "category": [
                {"id": 1, "name": "Beta", "sort": 2, "parent": null},
                {"id": 2, "name": "Alpha", "sort": 1, "parent": null},
                {"id": 3, "name": "Gamma", "sort": 1, "parent": {"id": 1}}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn given_order_by_when_fetching_then_sorts_by_keys_in_sequence() {
        let query = StoreQuery::new("category")
            .order("sort", SortDirection::Asc)
            .order("name", SortDirection::Desc);

        let rows = store().fetch(&query).unwrap();

        let names: Vec<_> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Gamma", "Alpha", "Beta"]);
    }

    #[test]
    fn given_filter_when_fetching_then_returns_matching_rows_only() {
        let query = StoreQuery::new("category").filter(Filter::IsNull { field: "parent".into() });

        let rows = store().fetch(&query).unwrap();

        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn given_unknown_entity_when_fetching_then_errors() {
        let result = store().fetch(&StoreQuery::new("missing"));
        assert!(matches!(result, Err(StoreError::UnknownEntity(_))));
    }

    #[test]
    fn given_non_object_rows_when_loading_then_errors() {
        let result = InMemoryStore::from_json(&json!({"category": [1, 2]}));
        assert!(matches!(result, Err(StoreError::DataFormat(_))));
    }
}
