use crate::catalog::TypeCatalog;
use crate::error::{GraphError, Result};
use crate::repository::RepositoryAccessor;
use crate::types::{Entity, Relationship, TypeDefinition};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// JSON fixture layout for [`InMemoryRepository`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryFixture {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub type_definitions: Vec<TypeDefinition>,
    /// Users refused every request
    #[serde(default)]
    pub denied_users: Vec<String>,
}

/// Repository held entirely in memory, for fixtures and tests
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    entities: HashMap<String, Entity>,
    relationships: Vec<Relationship>,
    /// Entity guid -> positions in `relationships`
    incident: HashMap<String, Vec<usize>>,
    type_definitions: Vec<TypeDefinition>,
    catalog: TypeCatalog,
    denied_users: HashSet<String>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: RepositoryFixture) -> Self {
        let mut repo = Self::new();
        repo.type_definitions = fixture.type_definitions;
        repo.catalog = TypeCatalog::from_definitions(&repo.type_definitions);
        for entity in fixture.entities {
            repo.add_entity(entity);
        }
        for relationship in fixture.relationships {
            repo.add_relationship(relationship);
        }
        repo.denied_users = fixture.denied_users.into_iter().collect();
        log::debug!(
            "Loaded repository fixture: {} type definitions, {} entities, {} relationships",
            repo.type_definitions.len(),
            repo.entity_count(),
            repo.relationship_count()
        );
        repo
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let fixture: RepositoryFixture = serde_json::from_slice(bytes)?;
        Ok(Self::from_fixture(fixture))
    }

    pub fn add_entity(&mut self, entity: Entity) {
        self.entities.insert(entity.guid.clone(), entity);
    }

    pub fn add_relationship(&mut self, relationship: Relationship) {
        let position = self.relationships.len();
        self.incident
            .entry(relationship.proxy_one.guid.clone())
            .or_default()
            .push(position);
        if relationship.proxy_two.guid != relationship.proxy_one.guid {
            self.incident
                .entry(relationship.proxy_two.guid.clone())
                .or_default()
                .push(position);
        }
        self.relationships.push(relationship);
    }

    pub fn add_type_definition(&mut self, definition: TypeDefinition) {
        self.type_definitions.push(definition);
        self.catalog = TypeCatalog::from_definitions(&self.type_definitions);
    }

    pub fn deny_user(&mut self, user_id: impl Into<String>) {
        self.denied_users.insert(user_id.into());
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    fn authorize(&self, user_id: &str) -> Result<()> {
        if self.denied_users.contains(user_id) {
            return Err(GraphError::AccessDenied {
                user_id: user_id.to_string(),
                reason: "user is not authorized to read the repository".to_string(),
            });
        }
        Ok(())
    }
}

impl RepositoryAccessor for InMemoryRepository {
    fn entity_by_guid(&self, user_id: &str, guid: &str, type_name: &str) -> Result<Option<Entity>> {
        self.authorize(user_id)?;
        let entity = self
            .entities
            .get(guid)
            .filter(|e| type_name.is_empty() || self.catalog.is_subtype(&e.type_name, type_name));
        Ok(entity.cloned())
    }

    fn relationships_by_type(
        &self,
        user_id: &str,
        guid: &str,
        relationship_type: &str,
        _entity_type: &str,
    ) -> Result<Vec<Relationship>> {
        self.authorize(user_id)?;
        let Some(positions) = self.incident.get(guid) else {
            return Ok(Vec::new());
        };
        Ok(positions
            .iter()
            .map(|&i| &self.relationships[i])
            .filter(|r| r.type_name == relationship_type)
            .cloned()
            .collect())
    }

    fn type_definitions(&self, user_id: &str) -> Result<Vec<TypeDefinition>> {
        self.authorize(user_id)?;
        Ok(self.type_definitions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RelationshipKind;

    #[test]
    fn test_entity_lookup_respects_subtypes() {
        let mut repo = InMemoryRepository::new();
        repo.add_type_definition(TypeDefinition::new("DataFile", Some("DataStore")));
        repo.add_type_definition(TypeDefinition::new("CSVFile", Some("DataFile")));
        repo.add_entity(Entity::new("f", "CSVFile"));

        assert!(repo.entity_by_guid("u", "f", "DataFile").unwrap().is_some());
        assert!(repo.entity_by_guid("u", "f", "CSVFile").unwrap().is_some());
        assert!(repo.entity_by_guid("u", "f", "Database").unwrap().is_none());
        assert!(repo.entity_by_guid("u", "missing", "DataFile").unwrap().is_none());
    }

    #[test]
    fn test_relationships_filtered_by_type() {
        let mut repo = InMemoryRepository::new();
        let a = Entity::new("a", "FileFolder");
        let b = Entity::new("b", "FileFolder");
        let c = Entity::new("c", "DataFile");
        repo.add_relationship(Relationship::new(
            "r1",
            RelationshipKind::FolderHierarchy,
            a.proxy(),
            b.proxy(),
        ));
        repo.add_relationship(Relationship::new(
            "r2",
            RelationshipKind::NestedFile,
            b.proxy(),
            c.proxy(),
        ));

        let found = repo
            .relationships_by_type("u", "b", "FolderHierarchy", "FileFolder")
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].guid, "r1");
        assert!(repo
            .relationships_by_type("u", "c", "FolderHierarchy", "DataFile")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_denied_user() {
        let mut repo = InMemoryRepository::new();
        repo.deny_user("mallory");
        let err = repo.type_definitions("mallory").unwrap_err();
        assert!(matches!(err, GraphError::AccessDenied { .. }));
    }

    #[test]
    fn test_fixture_from_json() {
        let raw = br#"{
            "entities": [{"guid": "t1", "type_name": "RelationalTable", "properties": {"name": "orders"}}],
            "relationships": [],
            "type_definitions": [{"name": "RelationalTable", "super_type": "SchemaAttribute"}]
        }"#;
        let repo = InMemoryRepository::from_json_slice(raw).unwrap();
        assert_eq!(repo.entity_count(), 1);
        let entity = repo.entity_by_guid("u", "t1", "RelationalTable").unwrap().unwrap();
        assert_eq!(entity.properties["name"], "orders");
    }

    #[test]
    fn test_fixture_resolves_supertypes_declared_out_of_order() {
        let raw = br#"{
            "entities": [{"guid": "c1", "type_name": "RelationalColumn"}],
            "relationships": [{
                "guid": "r1", "type_name": "NestedSchemaAttribute",
                "proxy_one": {"guid": "t1", "type_name": "RelationalTable"},
                "proxy_two": {"guid": "c1", "type_name": "RelationalColumn"}
            }],
            "type_definitions": [
                {"name": "RelationalColumn", "super_type": "TabularColumn"},
                {"name": "TabularColumn", "super_type": "SchemaAttribute"},
                {"name": "SchemaAttribute"}
            ]
        }"#;
        let repo = InMemoryRepository::from_json_slice(raw).unwrap();
        assert_eq!(repo.relationship_count(), 1);
        assert!(repo.entity_by_guid("u", "c1", "SchemaAttribute").unwrap().is_some());
        assert!(repo.entity_by_guid("u", "c1", "TabularColumn").unwrap().is_some());
        assert!(repo.entity_by_guid("u", "c1", "Database").unwrap().is_none());
    }

    #[test]
    fn test_incremental_type_definitions_update_catalog() {
        let mut repo = InMemoryRepository::new();
        repo.add_entity(Entity::new("f1", "CSVFile"));
        assert!(repo.entity_by_guid("u", "f1", "DataFile").unwrap().is_none());
        repo.add_type_definition(TypeDefinition::new("CSVFile", Some("DataFile")));
        assert!(repo.entity_by_guid("u", "f1", "DataFile").unwrap().is_some());
    }
}
