use async_trait::async_trait;
use scraper_core::{
    CoreError, ListingRequest, PostPage, RawComment, RawPost, RedditApiError, RedditSource,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory stand-in for the Reddit API.
///
/// Serves `posts` newest-first in pages of `page_size`; the cursor is the
/// index of the last post served. Every call is recorded.
pub struct MockSource {
    pub posts: Vec<RawPost>,
    pub comments: HashMap<String, Vec<RawComment>>,
    pub page_size: usize,
    /// Fail `fetch_comments` for this post id with a 503.
    pub fail_comments_for: Option<String>,
    pub page_requests: Mutex<Vec<(ListingRequest, Option<String>, u32)>>,
    pub comment_requests: Mutex<Vec<(String, usize)>>,
}

impl MockSource {
    pub fn new(posts: Vec<RawPost>, page_size: usize) -> Self {
        Self {
            posts,
            comments: HashMap::new(),
            page_size,
            fail_comments_for: None,
            page_requests: Mutex::new(Vec::new()),
            comment_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_comments(mut self, post_id: &str, comments: Vec<RawComment>) -> Self {
        self.comments.insert(post_id.to_string(), comments);
        self
    }

    pub fn page_request_count(&self) -> usize {
        self.page_requests.lock().unwrap().len()
    }

    pub fn comment_request_count(&self) -> usize {
        self.comment_requests.lock().unwrap().len()
    }
}

#[async_trait]
impl RedditSource for MockSource {
    async fn fetch_page(
        &self,
        request: &ListingRequest,
        after: Option<&str>,
        limit: u32,
    ) -> Result<PostPage, CoreError> {
        self.page_requests
            .lock()
            .unwrap()
            .push((request.clone(), after.map(str::to_string), limit));

        let start = match after {
            Some(cursor) => cursor.parse::<usize>().unwrap() + 1,
            None => 0,
        };
        let end = (start + self.page_size).min(self.posts.len());
        let after = if end < self.posts.len() {
            Some((end - 1).to_string())
        } else {
            None
        };

        Ok(PostPage {
            posts: self.posts[start..end].to_vec(),
            after,
        })
    }

    async fn fetch_comments(
        &self,
        post: &RawPost,
        max_expansions: usize,
    ) -> Result<Vec<RawComment>, CoreError> {
        self.comment_requests
            .lock()
            .unwrap()
            .push((post.id.clone(), max_expansions));

        if self.fail_comments_for.as_deref() == Some(post.id.as_str()) {
            return Err(CoreError::RedditApi(RedditApiError::ServerError {
                status_code: 503,
            }));
        }
        Ok(self.comments.get(&post.id).cloned().unwrap_or_default())
    }
}

pub fn post(id: &str, created_utc: i64) -> RawPost {
    RawPost {
        id: id.to_string(),
        subreddit: "padel".to_string(),
        title: format!("Post {} about pádel", id),
        url: format!("https://www.reddit.com/r/padel/comments/{}/", id),
        created_utc,
        author: "alice".to_string(),
        score: 10,
        upvote_ratio: 0.9,
        num_comments: 2,
        selftext: "Anyone tried the new courts?".to_string(),
        permalink: format!("/r/padel/comments/{}/post/", id),
    }
}

pub fn comment(id: &str, body: &str, score: i64, replies: Vec<RawComment>) -> RawComment {
    RawComment {
        id: id.to_string(),
        author: "bob".to_string(),
        body: Some(body.to_string()),
        created_utc: 1_700_000_500,
        score,
        replies,
    }
}
