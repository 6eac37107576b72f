//! Tree data providers
//!
//! A provider owns immutable tree settings and a source of flat records. Every
//! call takes a fresh snapshot of the records, normalizes it and builds a new
//! forest; nothing is cached between calls.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::application::normalizer::{normalize_map_records, FieldMapping, Record, RecordProjection};
use crate::application::options::QueryOptions;
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::TreeSettings;
use crate::domain::{query, BuildOutcome, DomainError, NodeId, TreeBuilder, TreeNode};
use crate::infrastructure::store::{Entity, Filter, RecordStore, StoreQuery};

/// Capability shared by all record sources.
///
/// Implementors supply record acquisition (`fetch_nodes`, `root_nodes`,
/// `children_nodes`); building, lookups and search are shared. Every lookup
/// rebuilds the forest and delegates to the query engine, so each costs O(n)
/// in the record count.
pub trait TreeDataProvider {
    fn settings(&self) -> &TreeSettings;

    /// Current record snapshot as flat, unbuilt nodes.
    fn fetch_nodes(&self, options: &QueryOptions) -> ApplicationResult<Vec<TreeNode>>;

    /// Records without a parent, unbuilt (no children, level 0).
    fn root_nodes(&self) -> ApplicationResult<Vec<TreeNode>>;

    /// Records whose parent id equals `parent_id`, unbuilt.
    fn children_nodes(&self, parent_id: &NodeId) -> ApplicationResult<Vec<TreeNode>>;

    /// Run the builder with this provider's expansion level.
    fn build_tree(&self, nodes: Vec<TreeNode>) -> Vec<TreeNode> {
        TreeBuilder::new(self.settings().expanded_level).build(nodes)
    }

    /// Build the forest from the current record snapshot.
    fn get_tree_data(&self, options: &QueryOptions) -> ApplicationResult<Vec<TreeNode>> {
        Ok(self.build_tree(self.fetch_nodes(options)?))
    }

    /// Like [`get_tree_data`](Self::get_tree_data), plus the accounting of
    /// dropped records.
    fn get_tree_outcome(&self, options: &QueryOptions) -> ApplicationResult<BuildOutcome> {
        let nodes = self.fetch_nodes(options)?;
        Ok(TreeBuilder::new(self.settings().expanded_level).build_with_report(nodes))
    }

    fn find_node_by_id(&self, id: &NodeId) -> ApplicationResult<Option<TreeNode>> {
        let forest = self.get_tree_data(&QueryOptions::default())?;
        Ok(query::find_node_by_id(&forest, id).cloned())
    }

    fn find_nodes_by_ids(&self, ids: &[NodeId]) -> ApplicationResult<Vec<TreeNode>> {
        let forest = self.get_tree_data(&QueryOptions::default())?;
        Ok(query::find_nodes_by_ids(&forest, ids)
            .into_iter()
            .cloned()
            .collect())
    }

    fn search_nodes(&self, query: &str, options: &QueryOptions) -> ApplicationResult<Vec<TreeNode>> {
        let forest = self.get_tree_data(options)?;
        Ok(query::search_nodes(&forest, query)
            .into_iter()
            .cloned()
            .collect())
    }
}

/// Provider over a static, in-memory list of map records.
///
/// Query options are ignored; every call re-normalizes the same list.
#[derive(Debug, Clone)]
pub struct ArrayTreeDataProvider {
    records: Vec<Record>,
    settings: TreeSettings,
}

impl ArrayTreeDataProvider {
    pub fn new(records: Vec<Record>, settings: TreeSettings) -> Self {
        Self { records, settings }
    }

    /// Construct from loose options (`max_depth`, `expanded_level`, `sortable`).
    pub fn from_options(records: Vec<Record>, options: &Map<String, Value>) -> ApplicationResult<Self> {
        let settings = TreeSettings::from_options(options)?;
        Ok(Self::new(records, settings))
    }

    /// Construct from a JSON array of record objects.
    pub fn from_json(document: &Value, settings: TreeSettings) -> ApplicationResult<Self> {
        let items = document.as_array().ok_or_else(|| ApplicationError::DataFormat {
            message: "records must be a JSON array".to_string(),
        })?;
        let records = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_object().cloned().ok_or_else(|| ApplicationError::DataFormat {
                    message: format!("record {} is not an object", i),
                })
            })
            .collect::<ApplicationResult<Vec<_>>>()?;
        Ok(Self::new(records, settings))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    fn nodes(&self) -> Vec<TreeNode> {
        normalize_map_records(&self.records)
    }
}

impl TreeDataProvider for ArrayTreeDataProvider {
    fn settings(&self) -> &TreeSettings {
        &self.settings
    }

    #[instrument(level = "debug", skip(self, options))]
    fn fetch_nodes(&self, options: &QueryOptions) -> ApplicationResult<Vec<TreeNode>> {
        if !options.is_empty() {
            debug!("static list ignores query options");
        }
        Ok(self.nodes())
    }

    fn root_nodes(&self) -> ApplicationResult<Vec<TreeNode>> {
        Ok(self
            .nodes()
            .into_iter()
            .filter(|node| node.parent_id().is_none())
            .collect())
    }

    fn children_nodes(&self, parent_id: &NodeId) -> ApplicationResult<Vec<TreeNode>> {
        Ok(self
            .nodes()
            .into_iter()
            .filter(|node| node.parent_id() == Some(parent_id))
            .collect())
    }
}

/// Provider fetching entity rows from a [`RecordStore`] on every call.
///
/// Without a parent field every entity is a root. Root and child listings
/// issue targeted fetches instead of rebuilding the whole forest, so they
/// can disagree with an earlier `get_tree_data` if the store changed between
/// calls.
pub struct EntityTreeDataProvider {
    store: Arc<dyn RecordStore>,
    entity: String,
    projection: RecordProjection,
    settings: TreeSettings,
}

impl EntityTreeDataProvider {
    /// Validates the entity name and field mapping up front.
    pub fn new(
        store: Arc<dyn RecordStore>,
        entity: impl Into<String>,
        mapping: FieldMapping,
        settings: TreeSettings,
    ) -> ApplicationResult<Self> {
        let entity = entity.into();
        if entity.trim().is_empty() {
            return Err(DomainError::EmptyEntityName.into());
        }
        let projection = RecordProjection::new(mapping)?;
        Ok(Self {
            store,
            entity,
            projection,
            settings,
        })
    }

    /// Construct from loose options carrying both tree settings and field names.
    pub fn from_options(
        store: Arc<dyn RecordStore>,
        entity: impl Into<String>,
        options: &Map<String, Value>,
    ) -> ApplicationResult<Self> {
        let settings = TreeSettings::from_options(options)?;
        let mapping = FieldMapping::from_options(options)?;
        Self::new(store, entity, mapping, settings)
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn mapping(&self) -> &FieldMapping {
        self.projection.mapping()
    }

    fn fetch(&self, query: &StoreQuery) -> ApplicationResult<Vec<Entity>> {
        self.store.fetch(query).map_err(|source| ApplicationError::Store {
            entity: self.entity.clone(),
            source,
        })
    }
}

impl TreeDataProvider for EntityTreeDataProvider {
    fn settings(&self) -> &TreeSettings {
        &self.settings
    }

    #[instrument(level = "debug", skip(self), fields(entity = %self.entity))]
    fn fetch_nodes(&self, options: &QueryOptions) -> ApplicationResult<Vec<TreeNode>> {
        let entities = self.fetch(&options.to_store_query(&self.entity))?;
        Ok(self.projection.project_all(&entities))
    }

    #[instrument(level = "debug", skip(self), fields(entity = %self.entity))]
    fn root_nodes(&self) -> ApplicationResult<Vec<TreeNode>> {
        let mut query = StoreQuery::new(&self.entity);
        if let Some(parent_field) = &self.mapping().parent_field {
            query = query.filter(Filter::IsNull {
                field: parent_field.clone(),
            });
        }
        let entities = self.fetch(&query)?;
        Ok(self.projection.project_all(&entities))
    }

    #[instrument(level = "debug", skip(self), fields(entity = %self.entity))]
    fn children_nodes(&self, parent_id: &NodeId) -> ApplicationResult<Vec<TreeNode>> {
        let mut query = StoreQuery::new(&self.entity);
        if let Some(parent_field) = &self.mapping().parent_field {
            query = query.filter(Filter::RelatedEq {
                relation: parent_field.clone(),
                field: self.mapping().id_field.clone(),
                value: parent_id.to_value(),
            });
        }
        let entities = self.fetch(&query)?;
        Ok(self.projection.project_all(&entities))
    }
}
