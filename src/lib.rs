pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::inat::InatClient;
pub use config::{cli::LocalStorage, ApiConfig, SurveyConfig};
pub use core::{etl::EtlEngine, pipeline::SurveyPipeline};
pub use utils::error::{Result, SurveyError};
