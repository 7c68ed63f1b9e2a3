use crate::config::{ApiConfig, SurveyConfig, DEFAULT_FILTER, DEFAULT_OUTPUT, DEFAULT_PLACE_ID};
use crate::utils::error::{Result, SurveyError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional settings file; every key may be omitted.
///
/// ```toml
/// place_id = 51347
/// output = "inat_species_summary.csv"
/// filter = "species_filter.csv"
///
/// [api]
/// base_url = "https://api.inaturalist.org/v1"
/// calls_per_minute = 60
/// api_token = "${INAT_API_TOKEN}"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub place_id: Option<u64>,
    pub output: Option<String>,
    pub filter: Option<String>,
    #[serde(default)]
    pub api: ApiConfig,
}

impl FileConfig {
    /// Loads and parses the file at `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            SurveyError::config(format!(
                "cannot read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SurveyError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables become empty.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| SurveyError::config(format!("bad substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!("Environment variable {} is not set", var_name);
                String::new()
            })
        });

        Ok(result.into_owned())
    }

    pub fn into_survey_config(self) -> SurveyConfig {
        SurveyConfig {
            place_id: self.place_id.unwrap_or(DEFAULT_PLACE_ID),
            output: self.output.unwrap_or_else(|| DEFAULT_OUTPUT.to_string()),
            filter: Some(self.filter.unwrap_or_else(|| DEFAULT_FILTER.to_string())),
            api: self.api,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = FileConfig::from_toml_str("").unwrap().into_survey_config();
        assert_eq!(config, SurveyConfig::default());
    }

    #[test]
    fn test_partial_api_table_keeps_other_defaults() {
        let config = FileConfig::from_toml_str(
            r#"
place_id = 97394

[api]
quality_grade = "any"
timeout_seconds = 5
"#,
        )
        .unwrap()
        .into_survey_config();

        assert_eq!(config.place_id, 97394);
        assert_eq!(config.api.timeout_seconds, 5);
        assert_eq!(config.api.quality_grade(), None);
        assert_eq!(config.api.calls_per_minute, 60);
        assert_eq!(config.output, DEFAULT_OUTPUT);
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("INAT_SPECIES_TEST_TOKEN", "secret-token");
        let config = FileConfig::from_toml_str(
            r#"
[api]
api_token = "${INAT_SPECIES_TEST_TOKEN}"
"#,
        )
        .unwrap();
        assert_eq!(config.api.api_token(), Some("secret-token"));

        let config = FileConfig::from_toml_str(
            r#"
[api]
api_token = "${INAT_SPECIES_TEST_UNSET_VARIABLE}"
"#,
        )
        .unwrap();
        assert_eq!(config.api.api_token(), None);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = FileConfig::from_toml_str("plce_id = 3").unwrap_err();
        assert!(matches!(err, SurveyError::ConfigError { .. }));
    }
}
