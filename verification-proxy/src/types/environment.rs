//! Environment configuration for different deployment stages

use std::env;

use tracing::Level;

use crate::humanity_api::HumanityApiConfig;

/// Default port the proxy listens on when `PORT` is not set
pub const DEFAULT_PORT: u16 = 3002;

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Base URL of the Humanity Protocol API, `None` when unset or blank
    #[must_use]
    pub fn hp_api_url(&self) -> Option<String> {
        non_empty_var("HP_API_URL")
    }

    /// API key for the Humanity Protocol API, `None` when unset or blank
    #[must_use]
    pub fn hp_api_key(&self) -> Option<String> {
        non_empty_var("HP_API_KEY")
    }

    /// Snapshot of the upstream API configuration
    ///
    /// Missing values are not an error here: the verify route reports them per request.
    #[must_use]
    pub fn humanity_api_config(&self) -> HumanityApiConfig {
        HumanityApiConfig {
            api_url: self.hp_api_url(),
            api_key: self.hp_api_key(),
        }
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development | Self::Staging)
    }

    /// Whether logs should be emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development => Level::DEBUG,
            })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
