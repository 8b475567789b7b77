use crate::assembler::iso_date;
use crate::cleaner::TextCleaner;
use crate::quality::QualityFilter;
use scraper_core::{
    CleanedComment, CollectorLimits, CoreError, RawComment, RawPost, RedditSource,
};
use tracing::debug;

/// Turns a post's raw comment forest into a bounded tree of cleaned comments.
#[derive(Debug, Clone)]
pub struct CommentTreeCollector {
    filter: QualityFilter,
    cleaner: TextCleaner,
    max_depth: usize,
    max_comments: usize,
    max_expansions: usize,
}

impl Default for CommentTreeCollector {
    fn default() -> Self {
        Self::new(&CollectorLimits::default())
    }
}

impl CommentTreeCollector {
    pub fn new(limits: &CollectorLimits) -> Self {
        Self {
            filter: QualityFilter::from_limits(limits),
            cleaner: TextCleaner::new(),
            max_depth: limits.max_depth,
            max_comments: limits.max_comments,
            max_expansions: limits.max_expansions,
        }
    }

    /// Fetches the post's comments (with bounded "load more" expansion) and collects them.
    pub async fn collect<S: RedditSource + ?Sized>(
        &self,
        source: &S,
        post: &RawPost,
    ) -> Result<Vec<CleanedComment>, CoreError> {
        let forest = source.fetch_comments(post, self.max_expansions).await?;
        let collected = self.collect_forest(forest);
        debug!(
            "Post {}: kept {} top-level comments",
            post.id,
            collected.len()
        );
        Ok(collected)
    }

    /// Highest-scored top-level comments first, at most `max_comments` of them.
    pub fn collect_forest(&self, mut forest: Vec<RawComment>) -> Vec<CleanedComment> {
        // stable: equal scores keep retrieval order
        forest.sort_by(|a, b| b.score.cmp(&a.score));

        let mut collected = Vec::new();
        for comment in forest {
            if collected.len() >= self.max_comments {
                break;
            }
            if let Some(cleaned) = self.build(comment, 0) {
                collected.push(cleaned);
            }
        }
        collected
    }

    fn build(&self, comment: RawComment, depth: usize) -> Option<CleanedComment> {
        if depth > self.max_depth || !self.filter.is_quality(&comment) {
            return None;
        }
        let body = self.cleaner.clean(comment.body.as_deref()?)?;

        let replies = comment
            .replies
            .into_iter()
            .filter_map(|reply| self.build(reply, depth + 1))
            .collect();

        Some(CleanedComment {
            id: comment.id,
            author: comment.author,
            word_count: body.split_whitespace().count(),
            char_count: body.chars().count(),
            body,
            created_date: iso_date(comment.created_utc),
            score: comment.score,
            replies,
        })
    }
}
