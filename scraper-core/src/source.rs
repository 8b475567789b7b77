//! The seam between the scraping pipeline and whatever serves Reddit data.

use crate::error::CoreError;
use crate::types::{RawComment, RawPost};
use async_trait::async_trait;

/// How a page of posts should be requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingRequest {
    /// Newest posts of a subreddit.
    Newest { subreddit: String },
    /// Posts matching `query`, newest first.
    Search { subreddit: String, query: String },
}

impl ListingRequest {
    pub fn subreddit(&self) -> &str {
        match self {
            ListingRequest::Newest { subreddit } | ListingRequest::Search { subreddit, .. } => {
                subreddit
            }
        }
    }
}

/// One page of a newest-first listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostPage {
    pub posts: Vec<RawPost>,
    /// Cursor for the following page; `None` when the listing is exhausted.
    pub after: Option<String>,
}

#[async_trait]
pub trait RedditSource: Send + Sync {
    /// Fetches up to `limit` posts following the `after` cursor.
    async fn fetch_page(
        &self,
        request: &ListingRequest,
        after: Option<&str>,
        limit: u32,
    ) -> Result<PostPage, CoreError>;

    /// Fetches a post's top-level comments with replies attached, resolving at
    /// most `max_expansions` "load more" placeholders.
    async fn fetch_comments(
        &self,
        post: &RawPost,
        max_expansions: usize,
    ) -> Result<Vec<RawComment>, CoreError>;
}
