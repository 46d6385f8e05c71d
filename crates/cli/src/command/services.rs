use super::domain::{
    AssetContextPayload, CommandAction, CommandOutcome, ExportOutput, ExportPayload,
    LineagePayload,
};
use crate::config::LineageConfig;
use anyhow::{Context, Result};
use lineage_graph::{ContextGraphBuilder, InMemoryRepository};
use lineage_protocol::{
    AssetContextResponse, Capabilities, CapabilitiesServer, Scope, View,
    CAPABILITIES_SCHEMA_VERSION,
};
use lineage_query::{export as export_store, InMemoryLineageStore, LineageQueryEngine};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinSet;

pub struct Services {
    config: LineageConfig,
}

impl Services {
    pub fn new(config: LineageConfig) -> Self {
        Self { config }
    }

    pub async fn route(&self, action: CommandAction, payload: Value) -> Result<CommandOutcome> {
        match action {
            CommandAction::AssetContext => self.asset_context(parse_payload(payload)?).await,
            CommandAction::Lineage => self.lineage(parse_payload(payload)?).await,
            CommandAction::Export => self.export(parse_payload(payload)?).await,
            CommandAction::Capabilities => self.capabilities(),
        }
    }

    /// One context graph per seed, built concurrently over a shared repository
    async fn asset_context(&self, payload: AssetContextPayload) -> Result<CommandOutcome> {
        if payload.seeds.is_empty() {
            anyhow::bail!("asset_context requires at least one seed");
        }

        let bytes = read_file(&payload.repository).await?;
        let repository = Arc::new(
            InMemoryRepository::from_json_slice(&bytes).with_context(|| {
                format!("Failed to load repository {}", payload.repository.display())
            })?,
        );

        let mut builds = JoinSet::new();
        for (position, seed) in payload.seeds.into_iter().enumerate() {
            let repository = Arc::clone(&repository);
            let builder_config = self.config.builder.clone();
            builds.spawn_blocking(move || {
                let graph = ContextGraphBuilder::new(repository.as_ref())
                    .with_config(builder_config)
                    .build(&seed.user_id, &seed.guid, &seed.type_name)
                    .with_context(|| format!("asset_context failed for {}", seed.guid))?;
                Ok::<_, anyhow::Error>((position, graph.to_response()))
            });
        }

        let mut contexts: Vec<(usize, AssetContextResponse)> = Vec::new();
        while let Some(joined) = builds.join_next().await {
            contexts.push(joined.context("Context build task panicked")??);
        }
        contexts.sort_by_key(|(position, _)| *position);

        let nodes = contexts.iter().map(|(_, c)| c.nodes.len()).sum();
        let edges = contexts.iter().map(|(_, c)| c.edges.len()).sum();
        let contexts: Vec<AssetContextResponse> = contexts.into_iter().map(|(_, c)| c).collect();

        let mut outcome = CommandOutcome::from_data(json!({ "contexts": contexts }))?;
        outcome.meta.graph_nodes = Some(nodes);
        outcome.meta.graph_edges = Some(edges);
        Ok(outcome)
    }

    async fn lineage(&self, payload: LineagePayload) -> Result<CommandOutcome> {
        let store = load_store(&payload.store).await?;
        let response = LineageQueryEngine::new(&store)
            .with_config(self.config.query.clone())
            .execute(&payload.request)
            .with_context(|| {
                format!(
                    "{} lineage failed for {}",
                    payload.request.scope.as_str(),
                    payload.request.guid
                )
            })?
            .into_sorted_response();

        let nodes = response.vertices.len();
        let edges = response.edges.len();
        let mut outcome = CommandOutcome::from_data(response)?;
        outcome.meta.graph_nodes = Some(nodes);
        outcome.meta.graph_edges = Some(edges);
        Ok(outcome)
    }

    async fn export(&self, payload: ExportPayload) -> Result<CommandOutcome> {
        let store = load_store(&payload.store).await?;
        let content = export_store(&store, payload.format.into())?;

        let mut outcome = CommandOutcome::from_data(ExportOutput {
            format: payload.format,
            content,
        })?;
        outcome.meta.graph_nodes = Some(store.vertex_count());
        outcome.meta.graph_edges = Some(store.edge_count());
        Ok(outcome)
    }

    fn capabilities(&self) -> Result<CommandOutcome> {
        CommandOutcome::from_data(Capabilities {
            schema_version: CAPABILITIES_SCHEMA_VERSION,
            server: CapabilitiesServer {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            scopes: Scope::ALL.to_vec(),
            views: View::ALL.to_vec(),
            actions: CommandAction::ALL
                .iter()
                .map(|action| action.as_str().to_string())
                .collect(),
        })
    }
}

fn parse_payload<T: DeserializeOwned>(payload: Value) -> Result<T> {
    serde_json::from_value(payload).context("Invalid payload")
}

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

async fn load_store(path: &Path) -> Result<InMemoryLineageStore> {
    let bytes = read_file(path).await?;
    InMemoryLineageStore::from_json_slice(&bytes)
        .with_context(|| format!("Failed to load lineage store {}", path.display()))
}
