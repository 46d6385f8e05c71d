use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const CAPABILITIES_SCHEMA_VERSION: u32 = 1;

pub const DEFAULT_USER_ID: &str = "lineage-cli";

/// Traversal pattern requested by a lineage query.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// One hop upstream and one hop downstream
    SourceAndDestination,
    /// Everything connected through the view's edge label
    EndToEnd,
    /// Walk upstream until nothing feeds the vertex
    UltimateSource,
    /// Walk downstream until the vertex feeds nothing
    UltimateDestination,
    /// Semantic assignment and term-to-term edges
    Glossary,
}

impl Scope {
    pub const ALL: [Scope; 5] = [
        Scope::SourceAndDestination,
        Scope::EndToEnd,
        Scope::UltimateSource,
        Scope::UltimateDestination,
        Scope::Glossary,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Scope::SourceAndDestination => "source_and_destination",
            Scope::EndToEnd => "end_to_end",
            Scope::UltimateSource => "ultimate_source",
            Scope::UltimateDestination => "ultimate_destination",
            Scope::Glossary => "glossary",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|scope| scope.as_str() == name)
    }
}

/// Granularity of the data-flow edges followed by a query.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    TableLevel,
    ColumnLevel,
}

impl View {
    pub const ALL: [View; 2] = [View::TableLevel, View::ColumnLevel];

    pub const fn as_str(self) -> &'static str {
        match self {
            View::TableLevel => "table_level",
            View::ColumnLevel => "column_level",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|view| view.as_str() == name)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct LineageVertex {
    pub id: String,
    pub display_name: String,
    pub type_label: String,
    #[serde(default)]
    pub is_process: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash, JsonSchema)]
pub struct LineageEdge {
    pub id: String,
    pub source: String,
    pub destination: String,
    pub label: String,
}

fn default_include_processes() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct LineageRequest {
    pub scope: Scope,
    #[serde(default)]
    pub view: View,
    pub guid: String,
    /// Keep only vertices whose display name contains this text (empty = no filter)
    #[serde(default)]
    pub display_name_must_contain: String,
    #[serde(default = "default_include_processes")]
    pub include_processes: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, JsonSchema)]
pub struct LineageResponse {
    pub vertices: Vec<LineageVertex>,
    pub edges: Vec<LineageEdge>,
    /// Terminal vertex ids for the ultimate source/destination scopes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terminals: Vec<String>,
}

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct AssetContextRequest {
    #[serde(default = "default_user_id")]
    pub user_id: String,
    pub guid: String,
    pub type_name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ContextNode {
    pub guid: String,
    pub type_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ContextEdge {
    /// Relationship guid
    pub guid: String,
    pub type_name: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct AssetContextResponse {
    pub seed: String,
    pub nodes: Vec<ContextNode>,
    pub edges: Vec<ContextEdge>,
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    pub details: Option<Value>,
    pub hint: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct CapabilitiesServer {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct Capabilities {
    pub schema_version: u32,
    pub server: CapabilitiesServer,
    pub scopes: Vec<Scope>,
    pub views: Vec<View>,
    pub actions: Vec<String>,
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}
