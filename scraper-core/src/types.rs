use crate::error::ConfigError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const ALL_SUBREDDITS: &str = "all";
pub const DEFAULT_TIMEFRAME_DAYS: i64 = 365;
pub const MAX_TIMEFRAME_DAYS: i64 = 3650;

/// What to look for and how far back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    pub subreddit: String,
    pub title_term: Option<String>,
    pub content_term: Option<String>,
    /// Earliest `created_utc` a retained post may have.
    pub cutoff_timestamp: i64,
    pub max_results: Option<u32>,
}

impl SearchCriteria {
    /// Builds criteria covering the last `timeframe_days` days before `now`.
    pub fn from_timeframe(
        subreddit: &str,
        title_term: Option<String>,
        content_term: Option<String>,
        timeframe_days: i64,
        max_results: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<Self, ConfigError> {
        if !(1..=MAX_TIMEFRAME_DAYS).contains(&timeframe_days) {
            return Err(ConfigError::InvalidValue {
                field: "timeframe".to_string(),
                value: format!("{} (expected 1 to {} days)", timeframe_days, MAX_TIMEFRAME_DAYS),
            });
        }

        let cutoff = now - Duration::days(timeframe_days);
        let criteria = Self {
            subreddit: normalize_subreddit(subreddit),
            title_term: non_blank(title_term),
            content_term: non_blank(content_term),
            cutoff_timestamp: cutoff.timestamp(),
            max_results,
        };
        criteria.validate()?;
        Ok(criteria)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subreddit.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "subreddit".to_string(),
                value: String::new(),
            });
        }
        if self.max_results == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "limit".to_string(),
                value: "0 (must be at least 1)".to_string(),
            });
        }
        if self.is_all_subreddits() && !self.has_search_terms() {
            return Err(ConfigError::ValidationFailed {
                reason: "Searching all of Reddit requires a title or content term.".to_string(),
            });
        }
        Ok(())
    }

    pub fn is_all_subreddits(&self) -> bool {
        self.subreddit.eq_ignore_ascii_case(ALL_SUBREDDITS)
    }

    pub fn has_search_terms(&self) -> bool {
        self.title_term.is_some() || self.content_term.is_some()
    }
}

fn normalize_subreddit(name: &str) -> String {
    let name = name.trim();
    let name = name.strip_prefix('/').unwrap_or(name);
    let name = name
        .strip_prefix("r/")
        .or_else(|| name.strip_prefix("R/"))
        .unwrap_or(name);
    name.trim_end_matches('/').to_string()
}

fn non_blank(term: Option<String>) -> Option<String> {
    term.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// A post as delivered by the upstream API.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPost {
    pub id: String,
    pub subreddit: String,
    pub title: String,
    pub url: String,
    pub created_utc: i64,
    pub author: String,
    pub score: i64,
    pub upvote_ratio: f64,
    pub num_comments: u64,
    pub selftext: String,
    pub permalink: String,
}

/// A comment and its already-resolved replies.
#[derive(Debug, Clone, PartialEq)]
pub struct RawComment {
    pub id: String,
    pub author: String,
    pub body: Option<String>,
    pub created_utc: i64,
    pub score: i64,
    pub replies: Vec<RawComment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedComment {
    pub id: String,
    pub author: String,
    pub body: String,
    pub created_date: String,
    pub score: i64,
    pub word_count: usize,
    pub char_count: usize,
    pub replies: Vec<CleanedComment>,
}

impl CleanedComment {
    /// Number of nodes in this subtree, including `self`.
    pub fn tree_size(&self) -> usize {
        1 + self.replies.iter().map(CleanedComment::tree_size).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,
    pub subreddit: String,
    pub title: String,
    pub url: String,
    pub created_utc: i64,
    pub created_date: String,
    pub author: String,
    pub score: i64,
    pub upvote_ratio: f64,
    pub num_comments: u64,
    pub selftext: String,
    pub permalink: String,
    pub comments: Vec<CleanedComment>,
    pub processed_comment_count: usize,
}

pub type ResultSet = Vec<PostRecord>;
