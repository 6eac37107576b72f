//! Record store boundary
//!
//! The store-backed provider never talks to a database directly; it hands a
//! [`StoreQuery`] to a [`RecordStore`] and receives flat entity rows back.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A store row: field name to value. Relations are nested objects.
pub type Entity = Map<String, Value>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    #[error("invalid store data: {0}")]
    DataFormat(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            _ => Err(format!("sort direction must be ASC or DESC, got '{}'", s)),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// Row predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `field = value`; a `null` value never matches
    Eq { field: String, value: Value },
    /// `field IS NULL` (missing counts as null)
    IsNull { field: String },
    /// `relation.field = value` through a nested relation object
    RelatedEq {
        relation: String,
        field: String,
        value: Value,
    },
}

impl Filter {
    pub fn matches(&self, entity: &Entity) -> bool {
        match self {
            Filter::Eq { field, value } => {
                !value.is_null() && entity.get(field).is_some_and(|v| v == value)
            }
            Filter::IsNull { field } => entity.get(field).map_or(true, Value::is_null),
            Filter::RelatedEq {
                relation,
                field,
                value,
            } => match entity.get(relation) {
                Some(Value::Object(related)) => {
                    !value.is_null() && related.get(field).is_some_and(|v| v == value)
                }
                _ => false,
            },
        }
    }
}

/// Fetch request for one entity set: all filters must hold, rows come back
/// ordered by `order_by` keys in sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreQuery {
    pub entity: String,
    pub filters: Vec<Filter>,
    pub order_by: Vec<(String, SortDirection)>,
}

impl StoreQuery {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            filters: Vec::new(),
            order_by: Vec::new(),
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by.push((field.into(), direction));
        self
    }

    pub fn matches(&self, entity: &Entity) -> bool {
        self.filters.iter().all(|f| f.matches(entity))
    }
}

/// Source of flat entity rows.
pub trait RecordStore: Send + Sync {
    /// Return the rows of `query.entity` matching all filters, in query order.
    fn fetch(&self, query: &StoreQuery) -> StoreResult<Vec<Entity>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn entity(value: Value) -> Entity {
        value.as_object().cloned().unwrap()
    }

    #[rstest]
    #[case("asc", SortDirection::Asc)]
    #[case("DESC", SortDirection::Desc)]
    #[case("Desc", SortDirection::Desc)]
    fn given_direction_string_when_parsing_then_case_insensitive(
        #[case] input: &str,
        #[case] expected: SortDirection,
    ) {
        assert_eq!(input.parse::<SortDirection>().unwrap(), expected);
    }

    #[test]
    fn given_invalid_direction_when_parsing_then_errors() {
        assert!("sideways".parse::<SortDirection>().is_err());
    }

    #[test]
    fn given_filters_when_matching_then_follow_sql_null_semantics() {
        let root = entity(json!({"id": 1, "name": "Root", "parent": null}));
        let child = entity(json!({"id": 2, "name": "Child", "parent": {"id": 1}}));

        let is_root = Filter::IsNull { field: "parent".into() };
        assert!(is_root.matches(&root));
        assert!(!is_root.matches(&child));

        let under_one = Filter::RelatedEq {
            relation: "parent".into(),
            field: "id".into(),
            value: json!(1),
        };
        assert!(under_one.matches(&child));
        assert!(!under_one.matches(&root));

        let eq_null = Filter::Eq { field: "parent".into(), value: Value::Null };
        assert!(!eq_null.matches(&root));
    }
}
