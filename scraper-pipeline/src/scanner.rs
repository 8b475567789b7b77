use scraper_core::{CoreError, ListingRequest, RawPost, RedditSource, SearchCriteria};
use std::collections::VecDeque;
use tracing::{debug, info};

use crate::query::SearchQuery;

const PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// No page requested yet.
    Start,
    /// More pages may follow `cursor`.
    Paging,
    /// The listing has no further pages; drain the buffer.
    LastPage,
    Done,
}

/// Pulls posts from a newest-first listing until one predates the cutoff or
/// the result limit is reached.
///
/// The scan is forward-only: once `next` has returned `Ok(None)` it never
/// touches the source again. Start a new scanner to scan again.
pub struct TimeWindowedScanner<'a, S: RedditSource + ?Sized> {
    source: &'a S,
    request: ListingRequest,
    cutoff_timestamp: i64,
    max_results: Option<u32>,
    buffer: VecDeque<RawPost>,
    cursor: Option<String>,
    yielded: u32,
    pages: u32,
    state: ScanState,
}

impl<'a, S: RedditSource + ?Sized> TimeWindowedScanner<'a, S> {
    pub fn new(source: &'a S, criteria: &SearchCriteria) -> Self {
        let request = SearchQuery::from_criteria(criteria).into_request(&criteria.subreddit);
        Self::with_request(source, request, criteria.cutoff_timestamp, criteria.max_results)
    }

    pub fn with_request(
        source: &'a S,
        request: ListingRequest,
        cutoff_timestamp: i64,
        max_results: Option<u32>,
    ) -> Self {
        Self {
            source,
            request,
            cutoff_timestamp,
            max_results,
            buffer: VecDeque::new(),
            cursor: None,
            yielded: 0,
            pages: 0,
            state: ScanState::Start,
        }
    }

    /// Next post inside the window, or `None` once the scan has ended.
    pub async fn next(&mut self) -> Result<Option<RawPost>, CoreError> {
        if self.state == ScanState::Done {
            return Ok(None);
        }
        if self.limit_reached() {
            debug!("Result limit of {} posts reached", self.yielded);
            return Ok(self.finish());
        }

        let post = match self.buffer.pop_front() {
            Some(post) => post,
            None => match self.fill_buffer().await? {
                Some(post) => post,
                None => return Ok(self.finish()),
            },
        };

        if post.created_utc < self.cutoff_timestamp {
            info!(
                "Reached post {} older than the cutoff, stopping scan",
                post.id
            );
            return Ok(self.finish());
        }

        self.yielded += 1;
        Ok(Some(post))
    }

    fn limit_reached(&self) -> bool {
        self.max_results.is_some_and(|max| self.yielded >= max)
    }

    fn finish(&mut self) -> Option<RawPost> {
        self.state = ScanState::Done;
        self.buffer.clear();
        None
    }

    /// Requests pages until one yields a post; `None` when the listing is exhausted.
    async fn fill_buffer(&mut self) -> Result<Option<RawPost>, CoreError> {
        loop {
            if self.state == ScanState::LastPage {
                return Ok(None);
            }

            let limit = match self.max_results {
                Some(max) => (max - self.yielded).min(PAGE_SIZE),
                None => PAGE_SIZE,
            };
            let page = self
                .source
                .fetch_page(&self.request, self.cursor.as_deref(), limit)
                .await?;
            self.pages += 1;
            debug!(
                "Page {} of r/{}: {} posts",
                self.pages,
                self.request.subreddit(),
                page.posts.len()
            );

            self.state = if page.after.is_some() {
                ScanState::Paging
            } else {
                ScanState::LastPage
            };
            // a repeated cursor would page forever
            if page.after.is_some() && page.after == self.cursor {
                self.state = ScanState::LastPage;
            }
            self.cursor = page.after;
            self.buffer.extend(page.posts);

            if let Some(post) = self.buffer.pop_front() {
                return Ok(Some(post));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scraper_core::{PostPage, RawComment};
    use std::sync::Mutex;

    /// Serves a fixed newest-first list in pages of `page_size`, counting requests.
    struct PagedSource {
        timestamps: Vec<i64>,
        page_size: usize,
        requests: Mutex<Vec<(Option<String>, u32)>>,
    }

    impl PagedSource {
        fn new(timestamps: &[i64], page_size: usize) -> Self {
            Self {
                timestamps: timestamps.to_vec(),
                page_size,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    fn post(index: usize, created_utc: i64) -> RawPost {
        RawPost {
            id: format!("p{}", index),
            subreddit: "test".to_string(),
            title: format!("Post {}", index),
            url: String::new(),
            created_utc,
            author: "author".to_string(),
            score: 1,
            upvote_ratio: 1.0,
            num_comments: 0,
            selftext: String::new(),
            permalink: format!("/r/test/comments/p{}/", index),
        }
    }

    #[async_trait]
    impl RedditSource for PagedSource {
        async fn fetch_page(
            &self,
            _request: &ListingRequest,
            after: Option<&str>,
            limit: u32,
        ) -> Result<PostPage, CoreError> {
            self.requests
                .lock()
                .unwrap()
                .push((after.map(str::to_string), limit));

            let start = after
                .map(|a| a.trim_start_matches('p').parse::<usize>().unwrap() + 1)
                .unwrap_or(0);
            let end = (start + self.page_size).min(self.timestamps.len());
            let posts: Vec<RawPost> = (start..end)
                .map(|i| post(i, self.timestamps[i]))
                .collect();
            let after = if end < self.timestamps.len() {
                Some(format!("p{}", end - 1))
            } else {
                None
            };
            Ok(PostPage { posts, after })
        }

        async fn fetch_comments(
            &self,
            _post: &RawPost,
            _max_expansions: usize,
        ) -> Result<Vec<RawComment>, CoreError> {
            Ok(Vec::new())
        }
    }

    fn newest(
        source: &PagedSource,
        cutoff: i64,
        max: Option<u32>,
    ) -> TimeWindowedScanner<'_, PagedSource> {
        TimeWindowedScanner::with_request(
            source,
            ListingRequest::Newest {
                subreddit: "test".to_string(),
            },
            cutoff,
            max,
        )
    }

    async fn drain(mut scanner: TimeWindowedScanner<'_, PagedSource>) -> Vec<RawPost> {
        let mut posts = Vec::new();
        while let Some(post) = scanner.next().await.unwrap() {
            posts.push(post);
        }
        posts
    }

    #[tokio::test]
    async fn test_stops_at_first_post_before_cutoff() {
        let source = PagedSource::new(&[100, 90, 80, 70], 1);
        let mut scanner = newest(&source, 85, None);

        assert_eq!(scanner.next().await.unwrap().unwrap().created_utc, 100);
        assert_eq!(scanner.next().await.unwrap().unwrap().created_utc, 90);
        assert!(scanner.next().await.unwrap().is_none());
        assert_eq!(scanner.state, ScanState::Done);

        // the third page revealed the old post; nothing after it is requested
        assert_eq!(source.request_count(), 3);
        assert!(scanner.next().await.unwrap().is_none());
        assert_eq!(source.request_count(), 3);
    }

    #[tokio::test]
    async fn test_older_post_is_a_hard_stop() {
        // a newer post after an old one is never reached
        let source = PagedSource::new(&[100, 80, 95], 10);
        let posts = drain(newest(&source, 85, None)).await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].created_utc, 100);
    }

    #[tokio::test]
    async fn test_max_results_caps_output() {
        let source = PagedSource::new(&[100, 90, 80], 1);
        let mut scanner = newest(&source, 85, Some(1));

        assert_eq!(scanner.next().await.unwrap().unwrap().id, "p0");
        assert!(scanner.next().await.unwrap().is_none());
        assert_eq!(source.request_count(), 1);
        assert_eq!(scanner.yielded, 1);
    }

    #[tokio::test]
    async fn test_page_size_follows_remaining_limit() {
        let timestamps: Vec<i64> = (0..300).map(|i| 10_000 - i).collect();
        let source = PagedSource::new(&timestamps, 100);
        let posts = drain(newest(&source, 0, Some(150))).await;

        assert_eq!(posts.len(), 150);
        let requests = source.requests.lock().unwrap().clone();
        assert_eq!(requests[0], (None, 100));
        assert_eq!(requests[1], (Some("p99".to_string()), 50));
        assert_eq!(requests.len(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_listing_ends_scan() {
        let source = PagedSource::new(&[100, 90], 5);
        let mut scanner = newest(&source, 0, None);
        let mut seen = 0;
        while scanner.next().await.unwrap().is_some() {
            seen += 1;
        }
        assert_eq!(seen, 2);
        assert_eq!(source.request_count(), 1);
        assert_eq!(scanner.pages, 1);
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let source = PagedSource::new(&[], 5);
        let posts = drain(newest(&source, 0, None)).await;
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_search_criteria_choose_request() {
        let source = PagedSource::new(&[], 5);
        let criteria = SearchCriteria {
            subreddit: "all".to_string(),
            title_term: Some("padel".to_string()),
            content_term: None,
            cutoff_timestamp: 0,
            max_results: None,
        };
        let scanner = TimeWindowedScanner::new(&source, &criteria);
        assert_eq!(
            &scanner.request,
            &ListingRequest::Search {
                subreddit: "all".to_string(),
                query: "title:\"padel\"".to_string(),
            }
        );
    }
}
