use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

pub const CLIENT_ID_VAR: &str = "REDDIT_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "REDDIT_CLIENT_SECRET";
pub const USER_AGENT_VAR: &str = "REDDIT_USER_AGENT";

/// Script-app credentials for the Reddit API.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the three credentials through `lookup`, reporting every missing one at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let client_id = read(CLIENT_ID_VAR);
        let client_secret = read(CLIENT_SECRET_VAR);
        let user_agent = read(USER_AGENT_VAR);

        match (client_id, client_secret, user_agent) {
            (Some(client_id), Some(client_secret), Some(user_agent)) => Ok(Self {
                client_id,
                client_secret,
                user_agent,
            }),
            (client_id, client_secret, user_agent) => {
                let names = [
                    (client_id.is_none(), CLIENT_ID_VAR),
                    (client_secret.is_none(), CLIENT_SECRET_VAR),
                    (user_agent.is_none(), USER_AGENT_VAR),
                ]
                .into_iter()
                .filter(|(missing, _)| *missing)
                .map(|(_, name)| name.to_string())
                .collect();
                Err(ConfigError::MissingCredentials { names })
            }
        }
    }
}

/// Thresholds used while collecting a post's comments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CollectorLimits {
    pub max_depth: usize,
    pub max_comments: usize,
    pub max_expansions: usize,
    pub min_body_chars: usize,
    pub min_score: i64,
}

impl Default for CollectorLimits {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_comments: 150,
            max_expansions: 5,
            min_body_chars: 20,
            min_score: -5,
        }
    }
}

/// Request pacing for the HTTP client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub requests_per_minute: u32,
    pub burst: u32,
    pub timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            requests_per_minute: 100, // Reddit OAuth quota
            burst: 10,
            timeout_secs: 30,
        }
    }
}

/// Optional settings file contents; every section falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub collector: CollectorLimits,
    pub client: ClientSettings,
}

impl Settings {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.collector.max_comments == 0 {
            return Err(ConfigError::InvalidValue {
                field: "collector.max_comments".to_string(),
                value: "0".to_string(),
            });
        }
        if self.client.requests_per_minute == 0 || self.client.burst == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "client pacing needs a positive rate and burst".to_string(),
            });
        }
        Ok(())
    }
}

/// Everything the pipeline entry point needs besides the search criteria.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub credentials: Credentials,
    pub settings: Settings,
}
