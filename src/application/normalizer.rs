//! Record normalization: loose map records and store entities into nodes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::domain::{DomainError, DomainResult, Metadata, NodeId, TreeNode, ENTITY_KEY};
use crate::infrastructure::store::Entity;

/// A loose key/value record as supplied to the static-list provider.
pub type Record = Map<String, Value>;

const LABEL_KEYS: [&str; 2] = ["label", "name"];
const PARENT_KEYS: [&str; 2] = ["parent_id", "parentId"];

/// Coerce a label value to a string.
///
/// Strings pass through; numbers and booleans are stringified the way a
/// scalar string cast does (`true` -> `"1"`, `false` -> `""`); anything else,
/// including a missing value, becomes `""`.
pub fn coerce_label(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(true)) => "1".to_string(),
        _ => String::new(),
    }
}

/// First key whose value is present and not `null`.
fn first_present<'a>(record: &'a Record, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
}

/// Convert one map record into a node.
///
/// `label` is preferred over `name`, `parent_id` over `parentId`. The
/// `selectable` and `expanded` flags are only honoured when supplied as
/// booleans; an explicit `expanded` pins the flag against the default
/// expansion policy.
pub fn normalize_map_record(record: &Record) -> TreeNode {
    let id = record.get("id").and_then(NodeId::from_value);
    let label = coerce_label(first_present(record, &LABEL_KEYS));
    let parent_id = first_present(record, &PARENT_KEYS).and_then(NodeId::from_value);
    let metadata = match record.get("metadata") {
        Some(Value::Object(map)) => map.clone(),
        _ => Metadata::new(),
    };

    let mut node = TreeNode::new(id, label, parent_id).with_metadata(metadata);
    if let Some(Value::Bool(selectable)) = record.get("selectable") {
        node = node.with_selectable(*selectable);
    }
    if let Some(Value::Bool(expanded)) = record.get("expanded") {
        node = node.with_pinned_expanded(*expanded);
    }
    node
}

#[instrument(level = "debug", skip(records), fields(count = records.len()))]
pub fn normalize_map_records(records: &[Record]) -> Vec<TreeNode> {
    records.iter().map(normalize_map_record).collect()
}

/// Names of the entity fields carrying id, label and parent relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    pub id_field: String,
    pub label_field: String,
    /// Relation to the parent entity; `None` makes every entity a root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_field: Option<String>,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            id_field: "id".into(),
            label_field: "name".into(),
            parent_field: None,
        }
    }
}

impl FieldMapping {
    /// Read `id_field`, `label_field` and `parent_field` from loose options.
    ///
    /// Missing keys (or `null`) keep the defaults; any other non-string value
    /// is a configuration error.
    pub fn from_options(options: &Map<String, Value>) -> DomainResult<Self> {
        let defaults = Self::default();
        let mapping = Self {
            id_field: string_option(options, "id_field")?.unwrap_or(defaults.id_field),
            label_field: string_option(options, "label_field")?.unwrap_or(defaults.label_field),
            parent_field: string_option(options, "parent_field")?,
        };
        mapping.validate()?;
        Ok(mapping)
    }

    pub fn validate(&self) -> DomainResult<()> {
        check_field_name("id_field", &self.id_field)?;
        check_field_name("label_field", &self.label_field)?;
        if let Some(parent) = &self.parent_field {
            check_field_name("parent_field", parent)?;
        }
        Ok(())
    }
}

fn string_option(options: &Map<String, Value>, key: &str) -> DomainResult<Option<String>> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(DomainError::InvalidFieldName {
            option: key.to_string(),
            reason: format!("expected a string, got {}", other),
        }),
    }
}

fn check_field_name(option: &str, name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidFieldName {
            option: option.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Projection of store entities onto nodes, resolved once from a validated
/// [`FieldMapping`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordProjection {
    mapping: FieldMapping,
}

impl RecordProjection {
    pub fn new(mapping: FieldMapping) -> DomainResult<Self> {
        mapping.validate()?;
        Ok(Self { mapping })
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    pub fn id(&self, entity: &Entity) -> Option<NodeId> {
        entity.get(&self.mapping.id_field).and_then(NodeId::from_value)
    }

    pub fn label(&self, entity: &Entity) -> String {
        coerce_label(entity.get(&self.mapping.label_field))
    }

    /// Id of the related parent entity; `None` without a relation.
    pub fn parent_id(&self, entity: &Entity) -> Option<NodeId> {
        let relation = self.mapping.parent_field.as_ref()?;
        match entity.get(relation) {
            Some(Value::Object(parent)) => parent.get(&self.mapping.id_field).and_then(NodeId::from_value),
            _ => None,
        }
    }

    /// Node for `entity`, carrying the entity itself under `metadata.entity`.
    pub fn project(&self, entity: &Entity) -> TreeNode {
        let mut metadata = Metadata::new();
        metadata.insert(ENTITY_KEY.to_string(), Value::Object(entity.clone()));
        TreeNode::new(self.id(entity), self.label(entity), self.parent_id(entity)).with_metadata(metadata)
    }

    #[instrument(level = "debug", skip(self, entities), fields(count = entities.len()))]
    pub fn project_all(&self, entities: &[Entity]) -> Vec<TreeNode> {
        entities.iter().map(|e| self.project(e)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[rstest]
    #[case(json!("text"), "text")]
    #[case(json!(42), "42")]
    #[case(json!(1.5), "1.5")]
    #[case(json!(true), "1")]
    #[case(json!(false), "")]
    #[case(json!(null), "")]
    #[case(json!(["a"]), "")]
    #[case(json!({"a": 1}), "")]
    fn given_label_value_when_coercing_then_scalar_cast(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(coerce_label(Some(&value)), expected);
    }

    #[test]
    fn given_label_and_name_when_normalizing_then_label_wins() {
        let node = normalize_map_record(&record(json!({"id": 1, "label": "L", "name": "N"})));
        assert_eq!(node.label(), "L");
    }

    #[test]
    fn given_null_label_when_normalizing_then_falls_back_to_name() {
        let node = normalize_map_record(&record(json!({"id": 1, "label": null, "name": "N"})));
        assert_eq!(node.label(), "N");
    }

    #[test]
    fn given_parent_aliases_when_normalizing_then_parent_id_wins() {
        let both = normalize_map_record(&record(json!({"id": 3, "parent_id": 1, "parentId": 2})));
        assert_eq!(both.parent_id(), Some(&NodeId::Int(1)));

        let camel = normalize_map_record(&record(json!({"id": 3, "parentId": "2"})));
        assert_eq!(camel.parent_id(), Some(&NodeId::Str("2".into())));
    }

    #[test]
    fn given_non_boolean_flags_when_normalizing_then_ignored() {
        let node = normalize_map_record(&record(json!({"id": 1, "selectable": "no", "expanded": 1})));
        assert!(node.is_selectable());
        assert!(!node.is_expanded());
        assert!(!node.has_explicit_expanded());
    }

    #[test]
    fn given_explicit_expanded_when_normalizing_then_marked_in_metadata() {
        let node = normalize_map_record(&record(json!({
            "id": 1, "expanded": false, "metadata": {"custom": "value"}
        })));
        assert!(node.has_explicit_expanded());
        assert_eq!(node.metadata()["custom"], json!("value"));
    }

    #[test]
    fn given_non_object_metadata_when_normalizing_then_empty() {
        let node = normalize_map_record(&record(json!({"id": 1, "metadata": [1, 2]})));
        assert!(node.metadata().is_empty());
    }

    #[test]
    fn given_entity_with_relation_when_projecting_then_reads_parent_id() {
        let mapping = FieldMapping {
            parent_field: Some("parent".into()),
            ..FieldMapping::default()
        };
        let projection = RecordProjection::new(mapping).unwrap();
        let entity = record(json!({"id": 3, "name": "Child", "parent": {"id": 1, "name": "Root"}}));

        let node = projection.project(&entity);

        assert_eq!(node.id(), Some(&NodeId::Int(3)));
        assert_eq!(node.label(), "Child");
        assert_eq!(node.parent_id(), Some(&NodeId::Int(1)));
        assert_eq!(node.metadata()[ENTITY_KEY], Value::Object(entity));
    }

    #[test]
    fn given_scalar_relation_when_projecting_then_no_parent() {
        let mapping = FieldMapping {
            parent_field: Some("parent".into()),
            ..FieldMapping::default()
        };
        let projection = RecordProjection::new(mapping).unwrap();

        let node = projection.project(&record(json!({"id": 3, "name": "x", "parent": 1})));

        assert!(node.parent_id().is_none());
    }

    #[rstest]
    #[case(json!({"id_field": 5}))]
    #[case(json!({"label_field": ["name"]}))]
    #[case(json!({"parent_field": ""}))]
    fn given_malformed_field_options_when_parsing_then_errors(#[case] options: Value) {
        let result = FieldMapping::from_options(options.as_object().unwrap());
        assert!(matches!(result, Err(DomainError::InvalidFieldName { .. })));
    }
}
