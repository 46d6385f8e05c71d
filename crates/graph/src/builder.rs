use crate::catalog::{AssetKind, TypeCatalog};
use crate::error::{GraphError, Result};
use crate::repository::RepositoryAccessor;
use crate::types::type_names::{DATA_FILE, FILE_FOLDER, RELATIONAL_TABLE};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Instant;

/// Which candidates to continue from when an expansion step yields several
/// (nested schema attributes, owning data sets, connections, parent folders).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidatePolicy {
    /// Continue from the first candidate only
    #[default]
    First,
    /// Continue from every candidate
    All,
}

impl CandidatePolicy {
    fn select(self, candidates: Vec<Entity>) -> Vec<Entity> {
        match self {
            CandidatePolicy::First => candidates.into_iter().take(1).collect(),
            CandidatePolicy::All => candidates,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub candidate_policy: CandidatePolicy,
}

/// How a traversed relationship is recorded relative to the expanded entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeDirection {
    /// expanded entity -> reached entity
    Forward,
    /// reached entity -> expanded entity
    Reversed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Task {
    /// Schema type / column expansion, then classification of the schema parents
    Schema,
    /// Schema boundary -> owning data set -> its content
    AssetDetails,
    /// Database -> connections -> endpoints
    Connections,
    /// Connection, endpoint and parent folder of a file or folder
    FolderHierarchy,
}

/// Builds the asset context graph around a seed entity
pub struct ContextGraphBuilder<'a, R: RepositoryAccessor + ?Sized> {
    repository: &'a R,
    config: BuilderConfig,
}

impl<'a, R: RepositoryAccessor + ?Sized> ContextGraphBuilder<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        Self {
            repository,
            config: BuilderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the asset context for entity `guid` of type `type_name`.
    ///
    /// Fails with [`GraphError::EntityNotFound`] when the seed is absent; any
    /// repository failure aborts the whole build.
    pub fn build(&self, user_id: &str, guid: &str, type_name: &str) -> Result<ContextGraph> {
        let started = Instant::now();

        if guid.trim().is_empty() {
            return Err(GraphError::InvalidParameter("guid must not be empty".to_string()));
        }

        let seed = self
            .repository
            .entity_by_guid(user_id, guid, type_name)?
            .ok_or_else(|| {
                log::error!("Entity not found with guid {guid} (type {type_name})");
                GraphError::EntityNotFound(guid.to_string())
            })?;

        let catalog = TypeCatalog::from_definitions(&self.repository.type_definitions(user_id)?);

        let mut session = BuildSession {
            repository: self.repository,
            user_id,
            policy: self.config.candidate_policy,
            catalog,
            graph: ContextGraph::new(&seed),
            expanded: HashMap::new(),
            scheduled: HashSet::new(),
            worklist: VecDeque::new(),
        };
        match session.catalog.kind_of(&seed.type_name) {
            AssetKind::Database => session.schedule(Task::Connections, seed.clone()),
            _ if session.catalog.is_subtype(&seed.type_name, FILE_FOLDER) => {
                session.schedule(Task::FolderHierarchy, seed.clone())
            }
            _ => {}
        }
        session.schedule(Task::Schema, seed);
        session.run()?;

        log::info!(
            "Built asset context for {}: {} nodes, {} edges in {} ms",
            guid,
            session.graph.node_count(),
            session.graph.edge_count(),
            started.elapsed().as_millis()
        );

        Ok(session.graph)
    }
}

/// State of one build: the graph accumulator plus worklist bookkeeping
struct BuildSession<'a, R: RepositoryAccessor + ?Sized> {
    repository: &'a R,
    user_id: &'a str,
    policy: CandidatePolicy,
    catalog: TypeCatalog,
    graph: ContextGraph,
    /// (entity guid, relationship) -> entities reached; each pair is asked once
    expanded: HashMap<(String, RelationshipKind), Vec<Entity>>,
    scheduled: HashSet<(Task, String)>,
    worklist: VecDeque<(Task, Entity)>,
}

impl<R: RepositoryAccessor + ?Sized> BuildSession<'_, R> {
    fn schedule(&mut self, task: Task, entity: Entity) {
        if self.scheduled.insert((task, entity.guid.clone())) {
            self.worklist.push_back((task, entity));
        }
    }

    fn run(&mut self) -> Result<()> {
        while let Some((task, entity)) = self.worklist.pop_front() {
            log::debug!("{:?} <- {} ({})", task, entity.guid, entity.type_name);
            match task {
                Task::Schema => self.expand_schema(&entity)?,
                Task::AssetDetails => self.expand_asset_details(&entity)?,
                Task::Connections => self.expand_connections(&entity)?,
                Task::FolderHierarchy => self.walk_folder_hierarchy(&entity)?,
            }
        }
        Ok(())
    }

    fn expand_schema(&mut self, entity: &Entity) -> Result<()> {
        if entity.type_name == RELATIONAL_TABLE || entity.type_name == DATA_FILE {
            self.add_schema_attribute_types(entity)?;
        }

        let mut candidates =
            self.expand(entity, RelationshipKind::AttributeForSchema, EdgeDirection::Forward)?;
        if candidates.is_empty() {
            candidates =
                self.expand(entity, RelationshipKind::NestedSchemaAttribute, EdgeDirection::Forward)?;
        }

        let (boundaries, mut nested): (Vec<Entity>, Vec<Entity>) = candidates
            .into_iter()
            .partition(|e| self.catalog.kind_of(&e.type_name) == AssetKind::SchemaBoundary);

        // Nested relationships match at both ends; the attribute we came from is not a parent
        let before = nested.len();
        nested.retain(|e| !self.scheduled.contains(&(Task::Schema, e.guid.clone())));
        if nested.len() < before {
            log::debug!(
                "Skipped {} already expanded schema candidates of {}",
                before - nested.len(),
                entity.guid
            );
        }

        for boundary in boundaries {
            self.schedule(Task::AssetDetails, boundary);
        }
        for parent in self.policy.select(nested) {
            self.schedule(Task::Schema, parent);
        }
        Ok(())
    }

    /// Tables and files: recover the schema type (or nested attributes) and its columns
    fn add_schema_attribute_types(&mut self, entity: &Entity) -> Result<()> {
        let schema_types =
            self.expand(entity, RelationshipKind::SchemaAttributeType, EdgeDirection::Reversed)?;

        if schema_types.is_empty() {
            self.expand(entity, RelationshipKind::NestedSchemaAttribute, EdgeDirection::Reversed)?;
        }

        for schema_type in &schema_types {
            self.expand(schema_type, RelationshipKind::AttributeForSchema, EdgeDirection::Reversed)?;
        }
        Ok(())
    }

    fn expand_asset_details(&mut self, boundary: &Entity) -> Result<()> {
        let data_sets =
            self.expand(boundary, RelationshipKind::AssetSchemaType, EdgeDirection::Forward)?;

        for data_set in self.policy.select(data_sets) {
            let relationship = if self.catalog.is_subtype(&data_set.type_name, DATA_FILE) {
                RelationshipKind::NestedFile
            } else {
                RelationshipKind::DataContentForDataSet
            };

            for asset in self.expand(&data_set, relationship, EdgeDirection::Forward)? {
                match self.catalog.kind_of(&asset.type_name) {
                    AssetKind::Database => self.schedule(Task::Connections, asset),
                    AssetKind::FolderBearing | AssetKind::SchemaBoundary | AssetKind::Generic => {
                        self.schedule(Task::FolderHierarchy, asset)
                    }
                }
            }
        }
        Ok(())
    }

    fn expand_connections(&mut self, database: &Entity) -> Result<()> {
        let connections =
            self.expand(database, RelationshipKind::ConnectionToAsset, EdgeDirection::Forward)?;
        for connection in &connections {
            self.expand(connection, RelationshipKind::ConnectionEndpoint, EdgeDirection::Forward)?;
        }
        Ok(())
    }

    fn walk_folder_hierarchy(&mut self, entity: &Entity) -> Result<()> {
        let connections =
            self.expand(entity, RelationshipKind::ConnectionToAsset, EdgeDirection::Forward)?;
        for connection in self.policy.select(connections) {
            self.expand(&connection, RelationshipKind::ConnectionEndpoint, EdgeDirection::Forward)?;
        }

        let parents = self.expand(entity, RelationshipKind::FolderHierarchy, EdgeDirection::Forward)?;
        for parent in self.policy.select(parents) {
            self.schedule(Task::FolderHierarchy, parent);
        }
        Ok(())
    }

    /// Follow every `kind` relationship of `entity`, record it in the graph and
    /// return the entities at the far end.
    fn expand(
        &mut self,
        entity: &Entity,
        kind: RelationshipKind,
        direction: EdgeDirection,
    ) -> Result<Vec<Entity>> {
        let key = (entity.guid.clone(), kind);
        if let Some(reached) = self.expanded.get(&key) {
            return Ok(reached.clone());
        }

        let mut relationships = self.repository.relationships_by_type(
            self.user_id,
            &entity.guid,
            kind.type_name(),
            &entity.type_name,
        )?;

        // Folders only follow relationships that point at them
        if self.catalog.is_subtype(&entity.type_name, FILE_FOLDER) {
            relationships.retain(|r| r.proxy_two.guid == entity.guid);
        }

        let mut reached = Vec::with_capacity(relationships.len());
        for relationship in &relationships {
            let Some(far) = relationship.other_end(&entity.guid) else {
                log::warn!(
                    "Relationship {} returned for {} does not reference it",
                    relationship.guid,
                    entity.guid
                );
                continue;
            };

            let Some(end) =
                self.repository
                    .entity_by_guid(self.user_id, &far.guid, &far.type_name)?
            else {
                log::warn!(
                    "Skipping {} {}: entity {} could not be resolved",
                    relationship.type_name,
                    relationship.guid,
                    far.guid
                );
                continue;
            };

            match direction {
                EdgeDirection::Forward => self.graph.add_relationship(entity, &end, relationship),
                EdgeDirection::Reversed => self.graph.add_relationship(&end, entity, relationship),
            };
            reached.push(end);
        }

        self.expanded.insert(key, reached.clone());
        Ok(reached)
    }
}
