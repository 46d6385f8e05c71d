use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Entity type names the builder dispatches on
pub mod type_names {
    pub const RELATIONAL_TABLE: &str = "RelationalTable";
    pub const DATA_FILE: &str = "DataFile";
    pub const FILE_FOLDER: &str = "FileFolder";
    pub const DATABASE: &str = "Database";
    pub const COMPLEX_SCHEMA_TYPE: &str = "ComplexSchemaType";
}

/// Catalog entity (table, column, file, folder, connection...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub guid: String,
    pub type_name: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl Entity {
    pub fn new(guid: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            type_name: type_name.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn proxy(&self) -> EntityProxy {
        EntityProxy {
            guid: self.guid.clone(),
            type_name: self.type_name.clone(),
        }
    }
}

/// Reference to one end of a relationship
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityProxy {
    pub guid: String,
    pub type_name: String,
}

/// Typed, directed link between two entities (proxy one -> proxy two)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub guid: String,
    pub type_name: String,
    pub proxy_one: EntityProxy,
    pub proxy_two: EntityProxy,
}

impl Relationship {
    pub fn new(
        guid: impl Into<String>,
        kind: RelationshipKind,
        proxy_one: EntityProxy,
        proxy_two: EntityProxy,
    ) -> Self {
        Self {
            guid: guid.into(),
            type_name: kind.type_name().to_string(),
            proxy_one,
            proxy_two,
        }
    }

    /// The proxy opposite `guid`, or `None` if the relationship does not touch it
    pub fn other_end(&self, guid: &str) -> Option<&EntityProxy> {
        if self.proxy_one.guid == guid {
            Some(&self.proxy_two)
        } else if self.proxy_two.guid == guid {
            Some(&self.proxy_one)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    #[serde(default)]
    pub super_type: Option<String>,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>, super_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            super_type: super_type.map(str::to_string),
        }
    }
}

/// Relationship types traversed while building an asset context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipKind {
    /// Schema attribute -> its schema type
    SchemaAttributeType,

    /// Complex schema type -> attribute it contains
    AttributeForSchema,

    /// Attribute -> attribute nested directly under it
    NestedSchemaAttribute,

    /// Asset -> schema type describing it
    AssetSchemaType,

    /// Folder -> file stored in it
    NestedFile,

    /// Data set -> asset supplying its content
    DataContentForDataSet,

    /// Connection -> asset it reaches
    ConnectionToAsset,

    /// Endpoint -> connection using it
    ConnectionEndpoint,

    /// Parent folder -> nested folder
    FolderHierarchy,
}

impl RelationshipKind {
    pub const fn type_name(self) -> &'static str {
        match self {
            RelationshipKind::SchemaAttributeType => "SchemaAttributeType",
            RelationshipKind::AttributeForSchema => "AttributeForSchema",
            RelationshipKind::NestedSchemaAttribute => "NestedSchemaAttribute",
            RelationshipKind::AssetSchemaType => "AssetSchemaType",
            RelationshipKind::NestedFile => "NestedFile",
            RelationshipKind::DataContentForDataSet => "DataContentForDataSet",
            RelationshipKind::ConnectionToAsset => "ConnectionToAsset",
            RelationshipKind::ConnectionEndpoint => "ConnectionEndpoint",
            RelationshipKind::FolderHierarchy => "FolderHierarchy",
        }
    }
}

/// Edge in the context graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEdge {
    pub relationship_guid: String,
    pub relationship_type: String,
}

/// Asset context materialized around one seed entity
///
/// Owned by a single build; nodes are keyed by entity guid and every
/// relationship is recorded at most once.
#[derive(Debug)]
pub struct ContextGraph {
    /// Directed graph (entity -> entity with relationship)
    pub graph: DiGraph<Entity, ContextEdge>,

    /// Entity guid -> NodeIndex mapping
    pub entity_index: HashMap<String, NodeIndex>,

    /// Relationship guids already recorded
    relationships: HashSet<String>,

    seed: String,
}

impl ContextGraph {
    pub fn new(seed: &Entity) -> Self {
        let mut graph = Self {
            graph: DiGraph::new(),
            entity_index: HashMap::new(),
            relationships: HashSet::new(),
            seed: seed.guid.clone(),
        };
        graph.add_entity(seed);
        graph
    }

    /// Add entity, returning the existing node when the guid is already present
    pub fn add_entity(&mut self, entity: &Entity) -> NodeIndex {
        if let Some(&idx) = self.entity_index.get(&entity.guid) {
            return idx;
        }
        let idx = self.graph.add_node(entity.clone());
        self.entity_index.insert(entity.guid.clone(), idx);
        idx
    }

    /// Record `relationship` as an edge `from -> to`, adding both endpoints.
    ///
    /// Returns `false` when the relationship was already recorded.
    pub fn add_relationship(&mut self, from: &Entity, to: &Entity, relationship: &Relationship) -> bool {
        if !self.relationships.insert(relationship.guid.clone()) {
            return false;
        }
        let from_idx = self.add_entity(from);
        let to_idx = self.add_entity(to);
        self.graph.add_edge(
            from_idx,
            to_idx,
            ContextEdge {
                relationship_guid: relationship.guid.clone(),
                relationship_type: relationship.type_name.clone(),
            },
        );
        true
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Find node by entity guid
    pub fn find_node(&self, guid: &str) -> Option<NodeIndex> {
        self.entity_index.get(guid).copied()
    }

    pub fn get_node(&self, idx: NodeIndex) -> Option<&Entity> {
        self.graph.node_weight(idx)
    }

    pub fn contains_entity(&self, guid: &str) -> bool {
        self.entity_index.contains_key(guid)
    }

    pub fn contains_relationship(&self, guid: &str) -> bool {
        self.relationships.contains(guid)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Entity> {
        self.graph.node_weights()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
