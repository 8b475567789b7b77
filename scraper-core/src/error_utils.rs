use crate::error::*;
use std::fmt;
use tracing::{error, info};

/// User-facing classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Authentication,
    Permission,
    NotFound,
    RateLimit,
    UpstreamUnavailable,
    Transport,
    Unexpected,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Permission => "permission",
            ErrorCategory::NotFound => "not-found",
            ErrorCategory::RateLimit => "rate-limit",
            ErrorCategory::UpstreamUnavailable => "upstream-unavailable",
            ErrorCategory::Transport => "transport",
            ErrorCategory::Unexpected => "unexpected",
        };
        f.write_str(name)
    }
}

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn category(&self) -> ErrorCategory;
    fn user_friendly_message(&self) -> String;
    fn hint(&self) -> Option<&'static str>;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::RedditApi(e) => {
                error!("Reddit API error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn category(&self) -> ErrorCategory {
        match self {
            CoreError::RedditApi(e) => e.category(),
            CoreError::Config(e) => e.category(),
            CoreError::Network(_) => ErrorCategory::Transport,
            CoreError::Io(_) | CoreError::Serialization(_) | CoreError::Internal { .. } => {
                ErrorCategory::Unexpected
            }
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::RedditApi(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(e) if e.is_timeout() => {
                "Request timed out. Please try again later.".to_string()
            }
            CoreError::Network(e) if e.is_connect() => {
                "Network connection error. Please check your internet connection and try again."
                    .to_string()
            }
            CoreError::Network(_) => {
                "Network error occurred. Please check your connection and try again.".to_string()
            }
            _ => format!("An unexpected error occurred: {}", self),
        }
    }

    fn hint(&self) -> Option<&'static str> {
        match self {
            CoreError::RedditApi(e) => e.hint(),
            CoreError::Config(e) => e.hint(),
            _ => None,
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::RedditApi(_) => "REDDIT_API".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
        }
    }
}

impl ErrorExt for RedditApiError {
    fn log_error(&self) -> &Self {
        error!("RedditApiError: {}", self);
        self
    }

    fn category(&self) -> ErrorCategory {
        match self {
            RedditApiError::AuthenticationFailed { .. } | RedditApiError::InvalidToken => {
                ErrorCategory::Authentication
            }
            RedditApiError::Forbidden { .. } => ErrorCategory::Permission,
            RedditApiError::NotFound { .. } => ErrorCategory::NotFound,
            RedditApiError::RateLimitExceeded { .. } => ErrorCategory::RateLimit,
            RedditApiError::ServerError { .. } => ErrorCategory::UpstreamUnavailable,
            RedditApiError::RequestTimeout => ErrorCategory::Transport,
            RedditApiError::UnexpectedStatus { .. } | RedditApiError::InvalidResponse { .. } => {
                ErrorCategory::Unexpected
            }
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } | RedditApiError::InvalidToken => {
                "Invalid Reddit API credentials. Please check the credentials in your .env file."
                    .to_string()
            }
            RedditApiError::Forbidden { .. } => {
                "Access forbidden. Your Reddit app may not have the required permissions."
                    .to_string()
            }
            RedditApiError::NotFound { .. } => {
                "The requested subreddit or resource was not found. Please verify the subreddit name."
                    .to_string()
            }
            RedditApiError::RateLimitExceeded { retry_after } => format!(
                "Rate limit exceeded. Please wait {} seconds before making more requests.",
                retry_after
            ),
            RedditApiError::ServerError { .. } => {
                "Reddit servers are experiencing issues. Please try again later.".to_string()
            }
            RedditApiError::RequestTimeout => {
                "Request timed out. Please try again later.".to_string()
            }
            RedditApiError::UnexpectedStatus { status_code, .. } => format!(
                "Reddit API request failed with status code {}. Please check your search parameters and try again.",
                status_code
            ),
            RedditApiError::InvalidResponse { details } => {
                format!("An unexpected error occurred: {}", details)
            }
        }
    }

    fn hint(&self) -> Option<&'static str> {
        match self {
            RedditApiError::AuthenticationFailed { .. } | RedditApiError::InvalidToken => Some(
                "Make sure you have created a Reddit app and are using its Client ID and Secret.",
            ),
            RedditApiError::RateLimitExceeded { .. } => Some(
                "Consider reducing the frequency of your requests or narrowing the timeframe.",
            ),
            RedditApiError::NotFound { .. } => {
                Some("Double-check the subreddit name spelling and ensure it exists.")
            }
            _ => None,
        }
    }

    fn error_code(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => "REDDIT_AUTH_FAILED".to_string(),
            RedditApiError::InvalidToken => "REDDIT_INVALID_TOKEN".to_string(),
            RedditApiError::RateLimitExceeded { .. } => "REDDIT_RATE_LIMIT".to_string(),
            RedditApiError::Forbidden { .. } => "REDDIT_FORBIDDEN".to_string(),
            RedditApiError::NotFound { .. } => "REDDIT_NOT_FOUND".to_string(),
            RedditApiError::ServerError { .. } => "REDDIT_SERVER_ERROR".to_string(),
            RedditApiError::RequestTimeout => "REDDIT_TIMEOUT".to_string(),
            RedditApiError::UnexpectedStatus { .. } => "REDDIT_UNEXPECTED_STATUS".to_string(),
            RedditApiError::InvalidResponse { .. } => "REDDIT_INVALID_RESPONSE".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::MissingCredentials { .. } => self.to_string(),
            ConfigError::InvalidValue { field, value } => {
                format!("Invalid value '{}' for '{}'.", value, field)
            }
            ConfigError::ValidationFailed { reason } => reason.clone(),
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' not found.", path)
            }
            ConfigError::Parse(e) => format!("Configuration file could not be parsed: {}", e),
        }
    }

    fn hint(&self) -> Option<&'static str> {
        match self {
            ConfigError::MissingCredentials { .. } => Some(
                "Set REDDIT_CLIENT_ID, REDDIT_CLIENT_SECRET and REDDIT_USER_AGENT in the environment or a .env file.",
            ),
            _ => None,
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::MissingCredentials { .. } => "CONFIG_MISSING_CREDENTIALS".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::ValidationFailed { .. } => "CONFIG_VALIDATION_FAILED".to_string(),
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report_error(&self, error: &CoreError) {
        error.log_error();
        info!("Error code: {} ({})", error.error_code(), error.category());
        info!("User message: {}", error.user_friendly_message());
    }

    /// Renders the message shown to the user, with the hint on its own line.
    pub fn render(&self, error: &CoreError) -> String {
        match error.hint() {
            Some(hint) => format!("Error: {}\n{}", error.user_friendly_message(), hint),
            None => format!("Error: {}", error.user_friendly_message()),
        }
    }
}
