//! # Lineage Graph
//!
//! Asset context graphs: the structural surroundings of a catalog entity.
//!
//! ## Features
//!
//! - **Schema expansion** - table/file -> schema type -> columns, or nested attributes
//! - **Asset details** - schema boundary -> data set -> database or file
//! - **Connectivity** - connections and endpoints of databases, files and folders
//! - **Folder hierarchy** - parent folders, upward only
//!
//! ## Architecture
//!
//! ```text
//! seed (guid, type)
//!     │
//!     ├──> RepositoryAccessor (entities, relationships, type definitions)
//!     │
//!     ├──> TypeCatalog (type name -> AssetKind, computed once per build)
//!     │
//!     ├──> ContextGraphBuilder (worklist of typed expansion tasks)
//!     │      ├─ Schema
//!     │      ├─ AssetDetails
//!     │      ├─ Connections
//!     │      └─ FolderHierarchy
//!     │
//!     └──> ContextGraph (petgraph, one per build)
//! ```

mod builder;
mod catalog;
mod error;
mod graph;
mod memory;
mod repository;
mod types;

pub use builder::{BuilderConfig, CandidatePolicy, ContextGraphBuilder};
pub use catalog::{AssetKind, TypeCatalog};
pub use error::{GraphError, Result};
pub use memory::{InMemoryRepository, RepositoryFixture};
pub use repository::RepositoryAccessor;
pub use types::{
    type_names, ContextEdge, ContextGraph, Entity, EntityProxy, Relationship, RelationshipKind,
    TypeDefinition,
};
