use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub assessment: AssessmentConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let page_size = match env::var("ASSESSMENT_PAGE_SIZE") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or(ConfigError::InvalidPageSize)?,
            Err(_) => DEFAULT_PAGE_SIZE,
        };

        let resume_policy = match env::var("ASSESSMENT_RESUME") {
            Ok(raw) => ResumePolicy::parse(&raw).ok_or(ConfigError::InvalidResumePolicy(raw))?,
            Err(_) => ResumePolicy::default(),
        };

        let max_merge_attempts = match env::var("ASSESSMENT_MERGE_ATTEMPTS") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|attempts| *attempts > 0)
                .ok_or(ConfigError::InvalidMergeAttempts)?,
            Err(_) => DEFAULT_MERGE_ATTEMPTS,
        };

        let formula_path = env::var("ASSESSMENT_FORMULA_PATH")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            assessment: AssessmentConfig {
                page_size,
                resume_policy,
                max_merge_attempts,
                formula_path,
            },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

pub const DEFAULT_PAGE_SIZE: usize = 5;
pub const DEFAULT_MERGE_ATTEMPTS: u32 = 3;

/// Session and scoring settings shared by every assessment session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentConfig {
    pub page_size: usize,
    pub resume_policy: ResumePolicy,
    /// Read-merge-write rounds attempted before a revision conflict is surfaced.
    pub max_merge_attempts: u32,
    /// Alternative formula table; the built-in table is used when absent.
    pub formula_path: Option<PathBuf>,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            resume_policy: ResumePolicy::default(),
            max_merge_attempts: DEFAULT_MERGE_ATTEMPTS,
            formula_path: None,
        }
    }
}

/// Which page a reopened session lands on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResumePolicy {
    /// Always reopen at page 0 with prior answers pre-filled.
    #[default]
    FirstPage,
    /// Reopen at the first page holding an unanswered question.
    FirstUnanswered,
}

impl ResumePolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "first_page" | "first-page" => Some(Self::FirstPage),
            "first_unanswered" | "first-unanswered" => Some(Self::FirstUnanswered),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPageSize,
    InvalidResumePolicy(String),
    InvalidMergeAttempts,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPageSize => {
                write!(f, "ASSESSMENT_PAGE_SIZE must be a positive integer")
            }
            ConfigError::InvalidResumePolicy(value) => write!(
                f,
                "ASSESSMENT_RESUME must be 'first_page' or 'first_unanswered' (got '{}')",
                value
            ),
            ConfigError::InvalidMergeAttempts => {
                write!(f, "ASSESSMENT_MERGE_ATTEMPTS must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
