pub mod domain;
mod services;

pub use domain::{
    AssetContextPayload, CommandAction, CommandRequest, CommandResponse, ExportFormatName,
    ExportPayload, LineagePayload,
};

use crate::config::LoadedConfig;
use domain::{CommandOutcome, CommandStatus, ResponseMeta};
use services::Services;
use std::time::Instant;

pub struct CommandHandler {
    services: Services,
    config_path: Option<String>,
}

impl CommandHandler {
    pub fn new(loaded: LoadedConfig) -> Self {
        let config_path = loaded.path.as_ref().map(|p| p.display().to_string());
        Self {
            services: Services::new(loaded.config),
            config_path,
        }
    }

    pub async fn execute(&self, request: CommandRequest) -> CommandResponse {
        let started = Instant::now();
        let CommandRequest { action, payload } = request;
        log::debug!("Executing action {}", action.as_str());

        let outcome: anyhow::Result<CommandOutcome> = self.services.route(action, payload).await;
        let duration_ms = Some(started.elapsed().as_millis() as u64);

        match outcome {
            Ok(outcome) => CommandResponse {
                status: CommandStatus::Ok,
                message: None,
                error: None,
                data: outcome.data,
                meta: ResponseMeta {
                    config_path: self.config_path.clone(),
                    duration_ms,
                    ..outcome.meta
                },
            },
            Err(err) => {
                log::warn!("Action {} failed: {err:#}", action.as_str());
                CommandResponse::from_error(
                    &err,
                    ResponseMeta {
                        config_path: self.config_path.clone(),
                        duration_ms,
                        ..Default::default()
                    },
                )
            }
        }
    }

    /// Parse and run a raw JSON request; malformed requests become error responses
    pub async fn execute_raw(&self, raw: &str) -> CommandResponse {
        match serde_json::from_str::<CommandRequest>(raw) {
            Ok(request) => self.execute(request).await,
            Err(err) => {
                let err = anyhow::Error::from(err).context("Invalid command request");
                CommandResponse::from_error(&err, ResponseMeta::default())
            }
        }
    }
}
