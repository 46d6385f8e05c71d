use anyhow::{Context, Result};
use lineage_graph::BuilderConfig;
use lineage_query::QueryConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "LINEAGE_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LineageConfig {
    pub builder: BuilderConfig,
    pub query: QueryConfig,
}

/// Configuration together with the file it came from (`None` for built-in defaults)
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: LineageConfig,
    pub path: Option<PathBuf>,
}

impl LineageConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: LineageConfig = toml::from_str(raw).context("Invalid lineage config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.query.validate()?;
        Ok(())
    }
}

/// `--config`, then `LINEAGE_CONFIG`, then defaults
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    std::env::var_os(CONFIG_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

pub async fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let Some(path) = resolve_config_path(explicit) else {
        log::debug!("No config file given, using defaults");
        return Ok(LoadedConfig::default());
    };

    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = LineageConfig::from_toml_str(&raw)
        .with_context(|| format!("Failed to load config {}", path.display()))?;
    log::debug!("Loaded config from {}", path.display());

    Ok(LoadedConfig {
        config,
        path: Some(path),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_graph::CandidatePolicy;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(LineageConfig::from_toml_str("").unwrap(), LineageConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = LineageConfig::from_toml_str(
            r#"
            [builder]
            candidate_policy = "all"

            [query]
            display_name_case_sensitive = true
            "#,
        )
        .unwrap();
        assert_eq!(config.builder.candidate_policy, CandidatePolicy::All);
        assert!(config.query.display_name_case_sensitive);
        assert_eq!(config.query.table_level_label, "table_data_flow");
    }

    #[test]
    fn empty_glossary_labels_are_rejected() {
        let err = LineageConfig::from_toml_str("[query]\nglossary_labels = []\n").unwrap_err();
        assert!(format!("{err:#}").contains("glossary_labels"));
    }

    #[test]
    fn unknown_sections_are_rejected() {
        assert!(LineageConfig::from_toml_str("[server]\nport = 1\n").is_err());
    }

    #[test]
    fn explicit_path_wins() {
        let path = Path::new("/tmp/lineage.toml");
        assert_eq!(resolve_config_path(Some(path)), Some(path.to_path_buf()));
    }
}
