pub mod api;
pub mod comments;
pub mod rate_limiter;


use api::RedditApiClient;
use async_trait::async_trait;
use comments::CommentArena;
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, RequestTokenError, TokenResponse,
    TokenUrl,
};
use reqwest::Client;
use scraper_core::{
    ClientSettings, CoreError, Credentials, ListingRequest, PostPage, RawComment, RawPost,
    RedditApiError, RedditSource,
};
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

const AUTH_URL: &str = "https://www.reddit.com/api/v1/authorize";
const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Refresh this long before Reddit's stated expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: SystemTime,
}

impl RedditToken {
    pub fn is_expired(&self) -> bool {
        SystemTime::now() + EXPIRY_MARGIN >= self.expires_at
    }
}

/// Application-only (client credentials) session against the Reddit API.
pub struct RedditClient {
    oauth_client: BasicClient,
    api: RedditApiClient,
    token: Mutex<Option<RedditToken>>,
}

impl RedditClient {
    pub fn new(credentials: Credentials, settings: &ClientSettings) -> Result<Self, CoreError> {
        let oauth_client = BasicClient::new(
            ClientId::new(credentials.client_id),
            Some(ClientSecret::new(credentials.client_secret)),
            AuthUrl::new(AUTH_URL.to_string()).map_err(|e| CoreError::Internal {
                message: format!("Invalid auth URL: {}", e),
            })?,
            Some(
                TokenUrl::new(TOKEN_URL.to_string()).map_err(|e| CoreError::Internal {
                    message: format!("Invalid token URL: {}", e),
                })?,
            ),
        );
        let api = RedditApiClient::new(credentials.user_agent, settings)?;

        Ok(Self {
            oauth_client,
            api,
            token: Mutex::new(None),
        })
    }

    /// Builds the client and exchanges the credentials for a first token, so
    /// bad credentials fail before any scraping starts.
    pub async fn connect(
        credentials: Credentials,
        settings: &ClientSettings,
    ) -> Result<Self, CoreError> {
        let client = Self::new(credentials, settings)?;
        client.access_token().await?;
        Ok(client)
    }

    /// Returns a valid bearer token, requesting a new one when missing or expired.
    pub async fn access_token(&self) -> Result<String, CoreError> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            if !token.is_expired() {
                return Ok(token.access_token.clone());
            }
            debug!("Access token expired, requesting a new one");
        }

        let token = self.request_token().await?;
        let access_token = token.access_token.clone();
        *guard = Some(token);
        Ok(access_token)
    }

    async fn request_token(&self) -> Result<RedditToken, CoreError> {
        info!("Requesting application-only Reddit access token");
        let http_client = self.api.http_client();

        let response = self
            .oauth_client
            .exchange_client_credentials()
            .request_async(|request| send_token_request(http_client, request))
            .await
            .map_err(|e| match e {
                RequestTokenError::Request(inner) => inner,
                RequestTokenError::ServerResponse(response) => {
                    error!("Token request rejected: {:?}", response);
                    CoreError::RedditApi(RedditApiError::AuthenticationFailed {
                        reason: response.error().to_string(),
                    })
                }
                RequestTokenError::Parse(err, _) => {
                    error!("Unreadable token response: {}", err);
                    CoreError::RedditApi(RedditApiError::AuthenticationFailed {
                        reason: format!("unreadable token response: {}", err),
                    })
                }
                RequestTokenError::Other(reason) => {
                    CoreError::RedditApi(RedditApiError::AuthenticationFailed { reason })
                }
            })?;

        let lifetime = response
            .expires_in()
            .unwrap_or_else(|| Duration::from_secs(3600));

        info!("Authenticated with Reddit, token valid for {:?}", lifetime);
        Ok(RedditToken {
            access_token: response.access_token().secret().clone(),
            expires_at: SystemTime::now() + lifetime,
        })
    }
}

/// Runs an OAuth2 token request through the client's own reqwest client so
/// the configured user agent is sent; Reddit throttles anonymous agents.
async fn send_token_request(
    http_client: &Client,
    request: HttpRequest,
) -> Result<HttpResponse, CoreError> {
    let response = http_client
        .request(request.method, request.url.as_str())
        .headers(request.headers)
        .body(request.body)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                CoreError::RedditApi(RedditApiError::RequestTimeout)
            } else {
                CoreError::Network(e)
            }
        })?;

    let status_code = response.status();
    if status_code.as_u16() == 401 {
        return Err(CoreError::RedditApi(
            RedditApiError::AuthenticationFailed {
                reason: "Reddit rejected the client id or secret".to_string(),
            },
        ));
    }
    if status_code.as_u16() != 400 && !status_code.is_success() {
        return Err(CoreError::RedditApi(RedditApiError::from_status(
            status_code.as_u16(),
            "/api/v1/access_token",
            None,
        )));
    }

    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();
    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}

#[async_trait]
impl RedditSource for RedditClient {
    async fn fetch_page(
        &self,
        request: &ListingRequest,
        after: Option<&str>,
        limit: u32,
    ) -> Result<PostPage, CoreError> {
        let token = self.access_token().await?;
        let listing = match request {
            ListingRequest::Newest { subreddit } => {
                self.api.get_new_posts(&token, subreddit, limit, after).await?
            }
            ListingRequest::Search { subreddit, query } => {
                self.api
                    .search_posts(&token, subreddit, query, limit, after)
                    .await?
            }
        };

        Ok(PostPage {
            posts: listing
                .data
                .children
                .into_iter()
                .map(|child| RawPost::from(child.data))
                .collect(),
            after: listing.data.after,
        })
    }

    async fn fetch_comments(
        &self,
        post: &RawPost,
        max_expansions: usize,
    ) -> Result<Vec<RawComment>, CoreError> {
        let token = self.access_token().await?;
        let mut arena = CommentArena::new(&post.id);
        arena.ingest(self.api.get_comments(&token, &post.id).await?);

        let mut expansions = 0;
        while expansions < max_expansions {
            let Some(placeholder) = arena.next_placeholder() else {
                break;
            };
            let token = self.access_token().await?;
            let things = self
                .api
                .get_more_children(&token, arena.link_id(), &placeholder.children)
                .await?;
            debug!(
                "Expanded {} hidden comments under {}",
                things.len(),
                placeholder.parent_id
            );
            arena.ingest(things);
            expansions += 1;
        }

        if arena.pending_placeholders() > 0 {
            warn!(
                "Post {}: leaving {} 'load more' placeholders unexpanded",
                post.id,
                arena.pending_placeholders()
            );
        }

        debug!("Post {}: {} raw comments retrieved", post.id, arena.len());
        Ok(arena.into_forest())
    }
}
