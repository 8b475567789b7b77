use crate::rate_limiter::RateLimiter;
use reqwest::{Client, Method, Response};
use scraper_core::{ClientSettings, CoreError, RawPost, RedditApiError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const REDDIT_API_BASE: &str = "https://oauth.reddit.com";

/// Upper bound Reddit accepts for `limit` on listings.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Upper bound of ids per `/api/morechildren` call.
pub const MAX_MORE_CHILDREN: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<T>,
    pub after: Option<String>,
    pub before: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default = "deleted_author")]
    pub author: String,
    pub subreddit: String,
    #[serde(default)]
    pub url: String,
    pub permalink: String,
    pub created_utc: f64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: u64,
    pub upvote_ratio: Option<f64>,
}

/// An entry of a comment listing: a comment or a "load more" placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum CommentThing {
    #[serde(rename = "t1")]
    Comment(RedditCommentData),
    #[serde(rename = "more")]
    More(RedditMoreData),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditCommentData {
    pub id: String,
    #[serde(default = "deleted_author")]
    pub author: String,
    pub body: Option<String>,
    pub created_utc: f64,
    #[serde(default)]
    pub score: i64,
    pub parent_id: String,
    /// Reddit sends an empty string instead of a listing when there are no replies.
    #[serde(default, deserialize_with = "deserialize_replies")]
    pub replies: Option<RedditListing<CommentThing>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditMoreData {
    pub id: String,
    pub parent_id: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub children: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenResponse {
    json: MoreChildrenJson,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenJson {
    #[serde(default)]
    errors: Vec<serde_json::Value>,
    data: Option<MoreChildrenData>,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenData {
    #[serde(default)]
    things: Vec<CommentThing>,
}

fn deleted_author() -> String {
    "[deleted]".to_string()
}

fn deserialize_replies<'de, D>(
    deserializer: D,
) -> Result<Option<RedditListing<CommentThing>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Replies {
        Listing(RedditListing<CommentThing>),
        Other(serde_json::Value),
    }

    Ok(match Replies::deserialize(deserializer)? {
        Replies::Listing(listing) => Some(listing),
        Replies::Other(_) => None,
    })
}

#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    rate_limiter: RateLimiter,
    user_agent: String,
}

impl RedditApiClient {
    pub fn new(user_agent: String, settings: &ClientSettings) -> Result<Self, CoreError> {
        let http_client = build_http_client(&user_agent, settings)?;

        Ok(Self {
            http_client,
            rate_limiter: RateLimiter::new(settings.requests_per_minute, settings.burst),
            user_agent,
        })
    }

    pub fn http_client(&self) -> &Client {
        &self.http_client
    }

    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query_params: &[(&str, &str)],
    ) -> Result<Response, CoreError> {
        let url = format!("{}{}", REDDIT_API_BASE, endpoint);

        self.rate_limiter.acquire().await;

        let request_builder = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(access_token)
            .header("User-Agent", &self.user_agent)
            .query(query_params);

        debug!("Making Reddit API request: {} {} {:?}", method, endpoint, query_params);
        let response = match request_builder.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Network error for {} {}: {}", method, endpoint, e);
                if e.is_timeout() {
                    return Err(CoreError::RedditApi(RedditApiError::RequestTimeout));
                }
                return Err(CoreError::Network(e));
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!("Request successful: {} {}", status, endpoint);
            return Ok(response);
        }

        error!("Request failed with status: {} for {}", status, endpoint);
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());
        if status.as_u16() == 429 {
            warn!("Rate limited, retry after {:?} seconds", retry_after);
        }

        Err(CoreError::RedditApi(RedditApiError::from_status(
            status.as_u16(),
            endpoint,
            retry_after,
        )))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        access_token: &str,
        query_params: &[(&str, &str)],
    ) -> Result<T, CoreError> {
        let response = self
            .make_request(Method::GET, endpoint, access_token, query_params)
            .await?;

        response.json::<T>().await.map_err(|e| {
            error!("Failed to parse response from {}: {}", endpoint, e);
            if e.is_timeout() {
                CoreError::RedditApi(RedditApiError::RequestTimeout)
            } else {
                CoreError::RedditApi(RedditApiError::InvalidResponse {
                    details: format!("Failed to parse response from {}", endpoint),
                })
            }
        })
    }

    /// Newest posts of `subreddit`.
    pub async fn get_new_posts(
        &self,
        access_token: &str,
        subreddit: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<RedditListing<RedditListingChild<RedditPostData>>, CoreError> {
        let endpoint = format!("/r/{}/new", subreddit);
        let limit_str = limit.min(MAX_PAGE_SIZE).to_string();
        let mut params = vec![("limit", limit_str.as_str())];
        if let Some(after_val) = after {
            params.push(("after", after_val));
        }

        let listing: RedditListing<RedditListingChild<RedditPostData>> =
            self.get_json(&endpoint, access_token, &params).await?;

        info!(
            "Retrieved {} newest posts from r/{}",
            listing.data.children.len(),
            subreddit
        );
        Ok(listing)
    }

    /// Posts of `subreddit` matching `query`, newest first.
    pub async fn search_posts(
        &self,
        access_token: &str,
        subreddit: &str,
        query: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<RedditListing<RedditListingChild<RedditPostData>>, CoreError> {
        let endpoint = format!("/r/{}/search", subreddit);
        let limit_str = limit.min(MAX_PAGE_SIZE).to_string();
        let restrict_sr = if subreddit.eq_ignore_ascii_case("all") {
            "false"
        } else {
            "true"
        };
        let mut params = vec![
            ("q", query),
            ("sort", "new"),
            ("syntax", "lucene"),
            ("t", "all"),
            ("type", "link"),
            ("restrict_sr", restrict_sr),
            ("limit", limit_str.as_str()),
        ];
        if let Some(after_val) = after {
            params.push(("after", after_val));
        }

        let listing: RedditListing<RedditListingChild<RedditPostData>> =
            self.get_json(&endpoint, access_token, &params).await?;

        info!(
            "Search in r/{} returned {} posts",
            subreddit,
            listing.data.children.len()
        );
        Ok(listing)
    }

    /// The comment listing of a post, as Reddit first serves it.
    pub async fn get_comments(
        &self,
        access_token: &str,
        post_id: &str,
    ) -> Result<Vec<CommentThing>, CoreError> {
        let endpoint = format!("/comments/{}", post_id);
        let params = [("limit", "500"), ("sort", "confidence")];

        let (_post, comments): (
            RedditListing<serde_json::Value>,
            RedditListing<CommentThing>,
        ) = self.get_json(&endpoint, access_token, &params).await?;

        debug!(
            "Retrieved {} top-level entries for post {}",
            comments.data.children.len(),
            post_id
        );
        Ok(comments.data.children)
    }

    /// Resolves the comment ids behind one "load more" placeholder.
    pub async fn get_more_children(
        &self,
        access_token: &str,
        link_id: &str,
        children: &[String],
    ) -> Result<Vec<CommentThing>, CoreError> {
        let ids = children.join(",");
        let params = [
            ("api_type", "json"),
            ("link_id", link_id),
            ("children", ids.as_str()),
            ("limit_children", "false"),
        ];

        let response: MoreChildrenResponse = self
            .get_json("/api/morechildren", access_token, &params)
            .await?;

        if !response.json.errors.is_empty() {
            return Err(CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("morechildren returned errors: {:?}", response.json.errors),
            }));
        }

        Ok(response
            .json
            .data
            .map(|data| data.things)
            .unwrap_or_default())
    }
}

fn build_http_client(user_agent: &str, settings: &ClientSettings) -> Result<Client, CoreError> {
    Ok(Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()?)
}

impl From<RedditPostData> for RawPost {
    fn from(post_data: RedditPostData) -> Self {
        Self {
            id: post_data.id,
            subreddit: post_data.subreddit,
            title: post_data.title,
            url: post_data.url,
            created_utc: post_data.created_utc as i64,
            author: post_data.author,
            score: post_data.score,
            upvote_ratio: post_data.upvote_ratio.unwrap_or(0.0),
            num_comments: post_data.num_comments,
            selftext: post_data.selftext,
            permalink: post_data.permalink,
        }
    }
}
