//! Request-scoped query options (`where` / `order_by`)

use serde_json::{Map, Value};

use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::store::{Filter, SortDirection, StoreQuery};

/// Per-call filter and ordering, meaningful for store-backed providers only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    /// `field = value` conditions, all of which must hold
    pub filters: Vec<(String, Value)>,
    /// Sort keys applied in sequence
    pub order_by: Vec<(String, SortDirection)>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by.push((field.into(), direction));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.order_by.is_empty()
    }

    /// Parse `{ "where": {field: value}, "order_by": {field: "ASC"|"DESC"} }`.
    ///
    /// Other keys are ignored. A `where`/`order_by` that is not an object, or a
    /// direction other than ASC/DESC, is a configuration error.
    pub fn from_value(value: &Value) -> DomainResult<Self> {
        let Some(options) = value.as_object() else {
            return Err(invalid("options", "expected an object"));
        };

        let mut parsed = Self::new();
        if let Some(conditions) = object_option(options, "where")? {
            for (field, value) in conditions {
                parsed.filters.push((field.clone(), value.clone()));
            }
        }
        if let Some(ordering) = object_option(options, "order_by")? {
            for (field, direction) in ordering {
                let direction = direction
                    .as_str()
                    .ok_or_else(|| invalid("order_by", &format!("direction for '{}' must be a string", field)))?
                    .parse::<SortDirection>()
                    .map_err(|e| invalid("order_by", &e))?;
                parsed.order_by.push((field.clone(), direction));
            }
        }
        Ok(parsed)
    }

    /// Translate into a store query for `entity`.
    pub fn to_store_query(&self, entity: &str) -> StoreQuery {
        let query = self.filters.iter().fold(StoreQuery::new(entity), |query, (field, value)| {
            query.filter(Filter::Eq {
                field: field.clone(),
                value: value.clone(),
            })
        });
        self.order_by
            .iter()
            .fold(query, |query, (field, direction)| query.order(field.clone(), *direction))
    }
}

fn object_option<'a>(options: &'a Map<String, Value>, key: &str) -> DomainResult<Option<&'a Map<String, Value>>> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(invalid(key, "expected an object")),
    }
}

fn invalid(option: &str, reason: &str) -> DomainError {
    DomainError::InvalidOption {
        option: option.to_string(),
        reason: reason.to_string(),
    }
}
