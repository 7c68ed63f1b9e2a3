pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::model::PlaceId;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_OUTPUT: &str = "inat_species_summary.csv";
pub const DEFAULT_PLACE_ID: u64 = 51347;
pub const DEFAULT_FILTER: &str = "species_filter.csv";
pub const DEFAULT_API_URL: &str = "https://api.inaturalist.org/v1";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_MAX_PAGES: u32 = 100;
/// Largest page sizes the API serves.
pub const MAX_SPECIES_PER_PAGE: u32 = 500;
pub const MAX_OBSERVATIONS_PER_PAGE: u32 = 200;

/// Remote API settings, the `[api]` table of the TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub calls_per_minute: u32,
    /// Empty or `any` disables the quality filter.
    pub quality_grade: String,
    pub max_pages: u32,
    pub species_per_page: u32,
    pub observations_per_page: u32,
    pub user_agent: String,
    pub api_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            calls_per_minute: crate::core::rate_limiter::DEFAULT_CALLS_PER_MINUTE,
            quality_grade: "research".to_string(),
            max_pages: DEFAULT_MAX_PAGES,
            species_per_page: MAX_SPECIES_PER_PAGE,
            observations_per_page: MAX_OBSERVATIONS_PER_PAGE,
            user_agent: concat!("inat-species/", env!("CARGO_PKG_VERSION")).to_string(),
            api_token: None,
        }
    }
}

impl ApiConfig {
    pub fn quality_grade(&self) -> Option<&str> {
        match self.quality_grade.trim() {
            "" | "any" => None,
            grade => Some(grade),
        }
    }

    pub fn api_token(&self) -> Option<&str> {
        self.api_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyConfig {
    pub place_id: u64,
    pub output: String,
    pub filter: Option<String>,
    pub api: ApiConfig,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            place_id: DEFAULT_PLACE_ID,
            output: DEFAULT_OUTPUT.to_string(),
            filter: Some(DEFAULT_FILTER.to_string()),
            api: ApiConfig::default(),
        }
    }
}

impl ConfigProvider for SurveyConfig {
    fn place_id(&self) -> PlaceId {
        PlaceId(self.place_id)
    }

    fn output_path(&self) -> &str {
        &self.output
    }

    fn filter_path(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    fn max_pages(&self) -> u32 {
        self.api.max_pages
    }
}

impl Validate for SurveyConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_positive_number("place_id", self.place_id, 1)?;
        validation::validate_path("output", &self.output)?;
        if let Some(filter) = &self.filter {
            validation::validate_path("filter", filter)?;
        }
        self.api.validate()
    }
}

impl Validate for ApiConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.base_url)?;
        validation::validate_positive_number("api.timeout_seconds", self.timeout_seconds, 1)?;
        validation::validate_positive_number(
            "api.calls_per_minute",
            u64::from(self.calls_per_minute),
            1,
        )?;
        validation::validate_positive_number("api.max_pages", u64::from(self.max_pages), 1)?;
        validation::validate_range(
            "api.species_per_page",
            self.species_per_page,
            1,
            MAX_SPECIES_PER_PAGE,
        )?;
        validation::validate_range(
            "api.observations_per_page",
            self.observations_per_page,
            1,
            MAX_OBSERVATIONS_PER_PAGE,
        )?;
        validation::validate_non_empty_string("api.user_agent", &self.user_agent)
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "inat-species")]
#[command(about = "Summarise iNaturalist observations per species for a place")]
pub struct CliConfig {
    /// Destination CSV file [default: inat_species_summary.csv]
    #[arg(long)]
    pub output: Option<String>,

    /// Place to survey [default: 51347]
    #[arg(long = "place_id")]
    pub place_id: Option<u64>,

    /// Species id allow-list, ignored when the file does not exist [default: species_filter.csv]
    #[arg(long)]
    pub filter: Option<String>,

    /// TOML file with defaults for every other option
    #[arg(long)]
    pub config: Option<String>,

    /// Base URL of the observation API
    #[arg(long = "api_url")]
    pub api_url: Option<String>,

    /// Ceiling on API calls per minute [default: 60]
    #[arg(long = "calls_per_minute")]
    pub calls_per_minute: Option<u32>,

    /// Per-request timeout [default: 30]
    #[arg(long = "timeout_seconds")]
    pub timeout_seconds: Option<u64>,

    /// Safety cap on pages per paginated listing [default: 100]
    #[arg(long = "max_pages")]
    pub max_pages: Option<u32>,

    /// Observation quality grade, `any` to include all [default: research]
    #[arg(long = "quality_grade")]
    pub quality_grade: Option<String>,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long = "json_logs")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Layers command line flags over the TOML file over built-in defaults.
    pub fn resolve(&self) -> Result<SurveyConfig> {
        let mut config = match &self.config {
            Some(path) => toml_config::FileConfig::from_file(path)?.into_survey_config(),
            None => SurveyConfig::default(),
        };

        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(place_id) = self.place_id {
            config.place_id = place_id;
        }
        if let Some(filter) = &self.filter {
            config.filter = Some(filter.clone());
        }
        if let Some(api_url) = &self.api_url {
            config.api.base_url = api_url.clone();
        }
        if let Some(calls) = self.calls_per_minute {
            config.api.calls_per_minute = calls;
        }
        if let Some(timeout) = self.timeout_seconds {
            config.api.timeout_seconds = timeout;
        }
        if let Some(max_pages) = self.max_pages {
            config.api.max_pages = max_pages;
        }
        if let Some(grade) = &self.quality_grade {
            config.api.quality_grade = grade.clone();
        }

        Ok(config)
    }
}
