use lineage_graph::GraphError;
use lineage_protocol::{AssetContextRequest, ErrorEnvelope, LineageRequest};
use lineage_query::{ExportFormat, LineageError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub action: CommandAction,
    #[serde(default = "empty_payload")]
    pub payload: Value,
}

fn empty_payload() -> Value {
    Value::Object(Default::default())
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandAction {
    AssetContext,
    Lineage,
    Export,
    Capabilities,
}

impl CommandAction {
    pub const ALL: [CommandAction; 4] = [
        CommandAction::AssetContext,
        CommandAction::Lineage,
        CommandAction::Export,
        CommandAction::Capabilities,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            CommandAction::AssetContext => "asset_context",
            CommandAction::Lineage => "lineage",
            CommandAction::Export => "export",
            CommandAction::Capabilities => "capabilities",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssetContextPayload {
    /// Repository fixture (JSON) to read entities from
    pub repository: PathBuf,
    /// One context graph is built per seed
    pub seeds: Vec<AssetContextRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LineagePayload {
    /// Lineage store document (JSON)
    pub store: PathBuf,
    #[serde(flatten)]
    pub request: LineageRequest,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormatName {
    #[default]
    Json,
    Graphml,
}

impl From<ExportFormatName> for ExportFormat {
    fn from(value: ExportFormatName) -> Self {
        match value {
            ExportFormatName::Json => ExportFormat::Json,
            ExportFormatName::Graphml => ExportFormat::GraphMl,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportPayload {
    pub store: PathBuf,
    #[serde(default)]
    pub format: ExportFormatName,
}

#[derive(Debug, Serialize)]
pub struct ExportOutput {
    pub format: ExportFormatName,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub status: CommandStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub meta: ResponseMeta,
}

impl CommandResponse {
    pub fn is_error(&self) -> bool {
        matches!(self.status, CommandStatus::Error)
    }

    pub fn from_error(err: &anyhow::Error, meta: ResponseMeta) -> Self {
        let message = format!("{err:#}");
        let error = classify_error(err, &message);
        CommandResponse {
            status: CommandStatus::Error,
            message: Some(message),
            error: Some(error),
            data: Value::Null,
            meta,
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_nodes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_edges: Option<usize>,
}

/// Successful result of one action, before the envelope is attached
pub struct CommandOutcome {
    pub data: Value,
    pub meta: ResponseMeta,
}

impl CommandOutcome {
    pub fn from_data<T: Serialize>(data: T) -> anyhow::Result<Self> {
        Ok(Self {
            data: serde_json::to_value(data)?,
            meta: ResponseMeta::default(),
        })
    }
}

/// Map an error chain to a stable error code and an optional hint
pub fn classify_error(err: &anyhow::Error, message: &str) -> ErrorEnvelope {
    let mut code = "internal";
    let mut hint = None;

    for cause in err.chain() {
        if let Some(graph_err) = cause.downcast_ref::<GraphError>() {
            code = graph_err.code();
            if let GraphError::EntityNotFound(_) = graph_err {
                hint = Some(
                    "Check the seed guid and that type_name is its type or one of its supertypes"
                        .to_string(),
                );
            }
            break;
        }
        if let Some(lineage_err) = cause.downcast_ref::<LineageError>() {
            code = lineage_err.code();
            if let LineageError::NodeNotFound(_) = lineage_err {
                hint = Some("No vertex in the lineage store has this guid".to_string());
            }
            break;
        }
        if cause.downcast_ref::<serde_json::Error>().is_some()
            || cause.downcast_ref::<toml::de::Error>().is_some()
        {
            code = "invalid_request";
            break;
        }
        if cause.downcast_ref::<std::io::Error>().is_some() {
            code = "io_error";
            hint = Some("Check that the referenced file exists and is readable".to_string());
            break;
        }
    }

    ErrorEnvelope {
        code: code.to_string(),
        message: message.to_string(),
        details: None,
        hint,
    }
}
