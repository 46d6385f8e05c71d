use crate::types::type_names::{COMPLEX_SCHEMA_TYPE, DATABASE, DATA_FILE, FILE_FOLDER};
use crate::types::TypeDefinition;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Capability an entity type has during asset context expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AssetKind {
    /// Subtype of ComplexSchemaType: table/schema boundary
    SchemaBoundary,
    Database,
    /// Files and folders, walked up the folder hierarchy
    FolderBearing,
    Generic,
}

/// Type-name -> [`AssetKind`] map computed once from the type definitions
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    super_types: HashMap<String, String>,
    kinds: HashMap<String, AssetKind>,
}

impl TypeCatalog {
    pub fn from_definitions(definitions: &[TypeDefinition]) -> Self {
        let super_types: HashMap<String, String> = definitions
            .iter()
            .filter_map(|def| def.super_type.clone().map(|s| (def.name.clone(), s)))
            .collect();

        let mut catalog = Self {
            super_types,
            kinds: HashMap::new(),
        };

        let kinds: HashMap<String, AssetKind> = definitions
            .iter()
            .map(|def| (def.name.clone(), catalog.classify(&def.name)))
            .collect();
        catalog.kinds = kinds;

        log::debug!(
            "Type catalog: {} definitions, {} with a supertype",
            definitions.len(),
            catalog.super_types.len()
        );
        catalog
    }

    /// Kind of `type_name`; unknown types are classified from their name alone
    pub fn kind_of(&self, type_name: &str) -> AssetKind {
        self.kinds
            .get(type_name)
            .copied()
            .unwrap_or_else(|| self.classify(type_name))
    }

    /// True if `type_name` equals `ancestor` or inherits from it
    pub fn is_subtype(&self, type_name: &str, ancestor: &str) -> bool {
        let mut seen = HashSet::new();
        let mut current = type_name;
        loop {
            if current == ancestor {
                return true;
            }
            if !seen.insert(current) {
                // supertype cycle in the definitions
                return false;
            }
            match self.super_types.get(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn classify(&self, type_name: &str) -> AssetKind {
        if type_name != COMPLEX_SCHEMA_TYPE && self.is_subtype(type_name, COMPLEX_SCHEMA_TYPE) {
            AssetKind::SchemaBoundary
        } else if self.is_subtype(type_name, DATABASE) {
            AssetKind::Database
        } else if self.is_subtype(type_name, DATA_FILE) || self.is_subtype(type_name, FILE_FOLDER) {
            AssetKind::FolderBearing
        } else {
            AssetKind::Generic
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> TypeCatalog {
        TypeCatalog::from_definitions(&[
            TypeDefinition::new("SchemaType", None),
            TypeDefinition::new("ComplexSchemaType", Some("SchemaType")),
            TypeDefinition::new("TabularSchemaType", Some("ComplexSchemaType")),
            TypeDefinition::new("RelationalTableType", Some("TabularSchemaType")),
            TypeDefinition::new("SchemaAttribute", None),
            TypeDefinition::new("RelationalColumn", Some("SchemaAttribute")),
            TypeDefinition::new("DataStore", None),
            TypeDefinition::new("Database", Some("DataStore")),
            TypeDefinition::new("DataFile", Some("DataStore")),
            TypeDefinition::new("CSVFile", Some("DataFile")),
        ])
    }

    #[test]
    fn test_schema_boundary_follows_supertype_chain() {
        let catalog = catalog();
        assert_eq!(catalog.kind_of("TabularSchemaType"), AssetKind::SchemaBoundary);
        assert_eq!(catalog.kind_of("RelationalTableType"), AssetKind::SchemaBoundary);
        assert_eq!(catalog.kind_of("ComplexSchemaType"), AssetKind::Generic);
        assert_eq!(catalog.kind_of("RelationalColumn"), AssetKind::Generic);
    }

    #[test]
    fn test_asset_kinds() {
        let catalog = catalog();
        assert_eq!(catalog.kind_of("Database"), AssetKind::Database);
        assert_eq!(catalog.kind_of("CSVFile"), AssetKind::FolderBearing);
        assert_eq!(catalog.kind_of("FileFolder"), AssetKind::FolderBearing);
        assert_eq!(catalog.kind_of("Unknown"), AssetKind::Generic);
    }

    #[test]
    fn test_supertype_cycle_terminates() {
        let catalog = TypeCatalog::from_definitions(&[
            TypeDefinition::new("A", Some("B")),
            TypeDefinition::new("B", Some("A")),
        ]);
        assert!(!catalog.is_subtype("A", "ComplexSchemaType"));
        assert_eq!(catalog.kind_of("A"), AssetKind::Generic);
    }
}
