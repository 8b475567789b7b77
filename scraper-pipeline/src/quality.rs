use crate::cleaner::is_deleted_marker;
use scraper_core::{CollectorLimits, RawComment};

/// Cheap pre-cleaning check that a comment is worth keeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityFilter {
    pub min_body_chars: usize,
    pub min_score: i64,
}

impl Default for QualityFilter {
    fn default() -> Self {
        Self::from_limits(&CollectorLimits::default())
    }
}

impl QualityFilter {
    pub fn from_limits(limits: &CollectorLimits) -> Self {
        Self {
            min_body_chars: limits.min_body_chars,
            min_score: limits.min_score,
        }
    }

    pub fn is_quality(&self, comment: &RawComment) -> bool {
        let Some(body) = comment.body.as_deref() else {
            return false;
        };

        !is_deleted_marker(body)
            && body.chars().count() >= self.min_body_chars
            && comment.score >= self.min_score
    }
}
