use crate::error::{LineageError, Result};
use lineage_protocol::View;
use serde::{Deserialize, Serialize};

/// Edge labels and filter behaviour of the query engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub table_level_label: String,
    pub column_level_label: String,
    /// Labels followed by the glossary scope
    pub glossary_labels: Vec<String>,
    pub display_name_case_sensitive: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            table_level_label: "table_data_flow".to_string(),
            column_level_label: "column_data_flow".to_string(),
            glossary_labels: vec![
                "semantic_assignment".to_string(),
                "related_term".to_string(),
            ],
            display_name_case_sensitive: false,
        }
    }
}

impl QueryConfig {
    /// Data-flow edge label followed for `view`
    pub fn edge_label(&self, view: View) -> &str {
        match view {
            View::TableLevel => &self.table_level_label,
            View::ColumnLevel => &self.column_level_label,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.table_level_label.trim().is_empty() {
            return Err(LineageError::InvalidParameter(
                "query.table_level_label must not be empty".to_string(),
            ));
        }
        if self.column_level_label.trim().is_empty() {
            return Err(LineageError::InvalidParameter(
                "query.column_level_label must not be empty".to_string(),
            ));
        }
        if self.glossary_labels.is_empty() {
            return Err(LineageError::InvalidParameter(
                "query.glossary_labels must list at least one label".to_string(),
            ));
        }
        if self.glossary_labels.iter().any(|l| l.trim().is_empty()) {
            return Err(LineageError::InvalidParameter(
                "query.glossary_labels must not contain empty labels".to_string(),
            ));
        }
        Ok(())
    }
}
