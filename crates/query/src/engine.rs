use crate::config::QueryConfig;
use crate::error::{LineageError, Result};
use crate::filter::{filter_display_name, filter_out_processes};
use crate::result::LineageResult;
use crate::store::{Direction, LineageStore};
use crate::walk::{walk, WalkPlan};
use lineage_protocol::{LineageRequest, Scope, View};
use std::time::Instant;

/// Scoped lineage queries over a [`LineageStore`]
pub struct LineageQueryEngine<'a, S: LineageStore + ?Sized> {
    store: &'a S,
    config: QueryConfig,
}

impl<'a, S: LineageStore + ?Sized> LineageQueryEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            config: QueryConfig::default(),
        }
    }

    pub fn with_config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn execute(&self, request: &LineageRequest) -> Result<LineageResult> {
        self.lineage(
            request.scope,
            request.view,
            &request.guid,
            &request.display_name_must_contain,
            request.include_processes,
        )
    }

    /// Compute `scope` around node `guid`, then apply the display filters.
    ///
    /// An unknown node fails with [`LineageError::NodeNotFound`]; a node without
    /// matching edges yields an empty result.
    pub fn lineage(
        &self,
        scope: Scope,
        view: View,
        guid: &str,
        display_name_must_contain: &str,
        include_processes: bool,
    ) -> Result<LineageResult> {
        let started = Instant::now();

        if guid.trim().is_empty() {
            return Err(LineageError::InvalidParameter("guid must not be empty".to_string()));
        }

        let start = self
            .store
            .find_vertex(guid)?
            .ok_or_else(|| LineageError::NodeNotFound(guid.to_string()))?;

        let plan = self.plan(scope, view);
        let mut result = walk(self.store, &start, &plan)?;

        if !include_processes {
            filter_out_processes(&mut result);
        }
        if !display_name_must_contain.is_empty() {
            filter_display_name(
                &mut result,
                display_name_must_contain,
                self.config.display_name_case_sensitive,
            );
        }

        log::debug!(
            "Lineage {} ({}) for {}: {} vertices, {} edges in {} ms",
            scope.as_str(),
            view.as_str(),
            guid,
            result.vertex_count(),
            result.edge_count(),
            started.elapsed().as_millis()
        );

        Ok(result)
    }

    fn plan(&self, scope: Scope, view: View) -> WalkPlan {
        let data_flow = vec![self.config.edge_label(view).to_string()];
        match scope {
            Scope::SourceAndDestination => WalkPlan {
                labels: data_flow,
                directions: Direction::BOTH.to_vec(),
                max_hops: Some(1),
                track_terminals: false,
            },
            Scope::EndToEnd => WalkPlan {
                labels: data_flow,
                directions: Direction::BOTH.to_vec(),
                max_hops: None,
                track_terminals: false,
            },
            Scope::UltimateSource => WalkPlan {
                labels: data_flow,
                directions: vec![Direction::Incoming],
                max_hops: None,
                track_terminals: true,
            },
            Scope::UltimateDestination => WalkPlan {
                labels: data_flow,
                directions: vec![Direction::Outgoing],
                max_hops: None,
                track_terminals: true,
            },
            Scope::Glossary => WalkPlan {
                labels: self.config.glossary_labels.clone(),
                directions: Direction::BOTH.to_vec(),
                max_hops: None,
                track_terminals: false,
            },
        }
    }
}
