use crate::error::{HistoryError, HistoryResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PLACEHOLDER_STEP_NAME: &str = "step";
pub const DEFAULT_STRIPPED_QUERY_PARAMS: &[&str] = &["fnId", "stepId"];

/// Tunables for name and URL normalization.
///
/// Loaded from TOML, e.g.
/// ```toml
/// placeholder_step_name = "step"
/// stripped_query_params = ["fnId", "stepId"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Step name the SDK reports before the real step identity is known.
    pub placeholder_step_name: String,
    /// Query parameters the invocation transport adds to address a function/step.
    pub stripped_query_params: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            placeholder_step_name: DEFAULT_PLACEHOLDER_STEP_NAME.to_string(),
            stripped_query_params: DEFAULT_STRIPPED_QUERY_PARAMS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl ParserConfig {
    pub fn from_toml_str(raw: &str) -> HistoryResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> HistoryResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| HistoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub(crate) fn is_stripped_param(&self, key: &str) -> bool {
        self.stripped_query_params.iter().any(|p| p == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = ParserConfig::from_toml_str("").unwrap();
        assert_eq!(config, ParserConfig::default());
        assert_eq!(config.placeholder_step_name, "step");
        assert!(config.is_stripped_param("fnId"));
        assert!(config.is_stripped_param("stepId"));
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let config = ParserConfig::from_toml_str(r#"placeholder_step_name = "$step""#).unwrap();
        assert_eq!(config.placeholder_step_name, "$step");
        assert_eq!(config.stripped_query_params, vec!["fnId", "stepId"]);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = ParserConfig::from_toml_str("stripped_query_params = 3").unwrap_err();
        assert!(matches!(err, HistoryError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"stripped_query_params = ["fnId"]"#).unwrap();

        let config = ParserConfig::load(file.path()).unwrap();
        assert!(config.is_stripped_param("fnId"));
        assert!(!config.is_stripped_param("stepId"));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = ParserConfig::load("/nonexistent/runhistory.toml").unwrap_err();
        assert!(matches!(err, HistoryError::Io { .. }));
    }
}
