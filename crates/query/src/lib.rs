//! # Lineage Query
//!
//! Scoped lineage queries over a persisted graph of data-flow and glossary edges.
//!
//! ## Scopes
//!
//! - **source_and_destination** - direct neighbours, one hop each way
//! - **end_to_end** - everything reachable upstream and downstream
//! - **ultimate_source** / **ultimate_destination** - walk one direction, report the ends
//! - **glossary** - vertices linked through glossary labels
//!
//! ## Usage
//!
//! ```no_run
//! use lineage_query::{InMemoryLineageStore, LineageQueryEngine};
//! use lineage_protocol::{Scope, View};
//!
//! # fn main() -> lineage_query::Result<()> {
//! let store = InMemoryLineageStore::from_json_slice(br#"{"vertices": [], "edges": []}"#)?;
//! let engine = LineageQueryEngine::new(&store);
//! let result = engine.lineage(Scope::EndToEnd, View::TableLevel, "orders", "", true);
//! # let _ = result;
//! # Ok(())
//! # }
//! ```

mod config;
mod engine;
mod error;
mod export;
mod filter;
mod memory;
mod result;
mod store;
mod walk;

pub use config::QueryConfig;
pub use engine::LineageQueryEngine;
pub use error::{LineageError, Result};
pub use export::{export, export_adjacency_json, export_graphml, ExportFormat};
pub use filter::{filter_display_name, filter_out_processes};
pub use memory::{InMemoryLineageStore, LineageDocument};
pub use result::LineageResult;
pub use store::{Direction, LineageStore};
