use crate::assembler::assemble_post;
use crate::collector::CommentTreeCollector;
use crate::scanner::TimeWindowedScanner;
use crate::writer::write_results;
use scraper_core::{CollectorLimits, CoreError, RedditSource, ResultSet, SearchCriteria};
use std::path::Path;
use tracing::info;

/// Scans, collects and assembles posts one at a time from a single source.
pub struct Pipeline<'a, S: RedditSource + ?Sized> {
    source: &'a S,
    collector: CommentTreeCollector,
}

impl<'a, S: RedditSource + ?Sized> Pipeline<'a, S> {
    pub fn new(source: &'a S, limits: &CollectorLimits) -> Self {
        Self {
            source,
            collector: CommentTreeCollector::new(limits),
        }
    }

    /// Every post inside the window with its cleaned comments, newest first.
    pub async fn run(&self, criteria: &SearchCriteria) -> Result<ResultSet, CoreError> {
        criteria.validate()?;
        log_criteria(criteria);

        let mut scanner = TimeWindowedScanner::new(self.source, criteria);
        let mut records = ResultSet::new();

        while let Some(post) = scanner.next().await? {
            let comments = self.collector.collect(self.source, &post).await?;
            info!("Fetched post: {}", post.title);
            records.push(assemble_post(post, comments));
        }

        info!("Total posts collected: {}", records.len());
        Ok(records)
    }

    /// Runs the scan and writes the results only if the whole scan succeeded.
    pub async fn run_to_file(
        &self,
        criteria: &SearchCriteria,
        output: &Path,
    ) -> Result<ResultSet, CoreError> {
        let records = self.run(criteria).await?;
        write_results(&records, output)?;
        Ok(records)
    }
}

fn log_criteria(criteria: &SearchCriteria) {
    info!(
        "Searching r/{} for posts matching criteria:",
        criteria.subreddit
    );
    if let Some(title) = &criteria.title_term {
        info!("- Title contains: {}", title);
    }
    if let Some(content) = &criteria.content_term {
        info!("- Content contains: {}", content);
    }
    if let Some(limit) = criteria.max_results {
        info!("- At most {} posts", limit);
    }
}
