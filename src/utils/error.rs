use thiserror::Error;

#[derive(Error, Debug)]
pub enum SurveyError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned HTTP {status} for {url}")]
    ApiStatusError { status: u16, url: String },

    #[error("Malformed API response: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Pagination for {what} did not terminate within {max_pages} pages")]
    PaginationLimitError { what: String, max_pages: u32 },

    #[error("Species listing failed: {0}")]
    ListingError(#[source] Box<SurveyError>),

    #[error("Writing the report failed: {0}")]
    OutputError(#[source] Box<SurveyError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SurveyError {
    pub fn config(message: impl Into<String>) -> Self {
        SurveyError::ConfigError {
            message: message.into(),
        }
    }

    /// Tags an error as having happened while building the species catalog.
    pub fn listing(self) -> Self {
        match self {
            SurveyError::ListingError(_) => self,
            other => SurveyError::ListingError(Box::new(other)),
        }
    }

    /// Tags an error as having happened while writing the report.
    pub fn output(self) -> Self {
        match self {
            SurveyError::OutputError(_) => self,
            other => SurveyError::OutputError(Box::new(other)),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SurveyError::ConfigError { .. } | SurveyError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            SurveyError::ApiError(_)
            | SurveyError::ApiStatusError { .. }
            | SurveyError::ListingError(_) => ErrorCategory::Network,
            SurveyError::SerializationError(_)
            | SurveyError::ProcessingError { .. }
            | SurveyError::PaginationLimitError { .. } => ErrorCategory::Data,
            SurveyError::CsvError(_) | SurveyError::IoError(_) | SurveyError::OutputError(_) => {
                ErrorCategory::Output
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SurveyError::ApiError(_)
            | SurveyError::ApiStatusError { .. }
            | SurveyError::SerializationError(_)
            | SurveyError::PaginationLimitError { .. } => ErrorSeverity::Low,
            SurveyError::ListingError(_) => ErrorSeverity::Medium,
            SurveyError::ConfigError { .. }
            | SurveyError::InvalidConfigValueError { .. }
            | SurveyError::ProcessingError { .. }
            | SurveyError::CsvError(_) => ErrorSeverity::High,
            SurveyError::IoError(_) | SurveyError::OutputError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => 1,
            ErrorCategory::Network | ErrorCategory::Data => 2,
            ErrorCategory::Output => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SurveyError::ConfigError { .. } | SurveyError::InvalidConfigValueError { .. } => {
                format!("Configuration stage failed: {}", self)
            }
            SurveyError::ListingError(inner) => {
                format!("Species listing stage failed: {}", inner)
            }
            SurveyError::OutputError(inner) => format!("Report writing stage failed: {}", inner),
            other => format!("Observation fetch stage failed: {}", other),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SurveyError::ConfigError { .. } | SurveyError::InvalidConfigValueError { .. } => {
                "Check the command line flags, the TOML config file and the species filter file"
            }
            SurveyError::ListingError(_) => {
                "Check network connectivity and the --api_url / --place_id values, then rerun"
            }
            SurveyError::OutputError(_) | SurveyError::IoError(_) | SurveyError::CsvError(_) => {
                "Check that the output directory exists, is writable and has free space"
            }
            SurveyError::PaginationLimitError { .. } => {
                "Raise --max_pages if the place really has that many records"
            }
            _ => "Retry later; the remote API may be rate limiting or temporarily unavailable",
        }
    }
}

pub type Result<T> = std::result::Result<T, SurveyError>;
