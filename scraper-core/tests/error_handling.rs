use scraper_core::{ConfigError, CoreError, ErrorCategory, ErrorExt, ErrorReporter, RedditApiError};

#[test]
fn test_error_codes() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    assert_eq!(reddit_error.error_code(), "REDDIT_API");

    let config_error = CoreError::Config(ConfigError::MissingCredentials {
        names: vec!["REDDIT_CLIENT_ID".to_string()],
    });
    assert_eq!(config_error.error_code(), "CONFIG");

    let internal = CoreError::Internal {
        message: "boom".to_string(),
    };
    assert_eq!(internal.error_code(), "INTERNAL");
}

#[test]
fn test_status_classification() {
    let cases = [
        (401, ErrorCategory::Authentication),
        (403, ErrorCategory::Permission),
        (404, ErrorCategory::NotFound),
        (429, ErrorCategory::RateLimit),
        (500, ErrorCategory::UpstreamUnavailable),
        (502, ErrorCategory::UpstreamUnavailable),
        (503, ErrorCategory::UpstreamUnavailable),
        (418, ErrorCategory::Unexpected),
        (400, ErrorCategory::Unexpected),
    ];

    for (status, expected) in cases {
        let error = CoreError::from(RedditApiError::from_status(status, "/r/rust/new", None));
        assert_eq!(error.category(), expected, "status {}", status);
    }
}

#[test]
fn test_transport_category() {
    let timeout = CoreError::RedditApi(RedditApiError::RequestTimeout);
    assert_eq!(timeout.category(), ErrorCategory::Transport);
    assert_eq!(
        timeout.user_friendly_message(),
        "Request timed out. Please try again later."
    );
    assert_eq!(timeout.error_code(), "REDDIT_API");

    let request_error = reqwest::Client::new()
        .get("not a url")
        .build()
        .unwrap_err();
    let network = CoreError::Network(request_error);
    assert_eq!(network.category(), ErrorCategory::Transport);
    assert_eq!(network.error_code(), "NETWORK");
    assert!(network.user_friendly_message().starts_with("Network error occurred"));
}

#[test]
fn test_rate_limit_uses_retry_after_header() {
    let error = RedditApiError::from_status(429, "/r/rust/new", Some(12));
    assert!(matches!(
        error,
        RedditApiError::RateLimitExceeded { retry_after: 12 }
    ));

    let defaulted = RedditApiError::from_status(429, "/r/rust/new", None);
    assert!(matches!(
        defaulted,
        RedditApiError::RateLimitExceeded { retry_after: 60 }
    ));
}

#[test]
fn test_configuration_category() {
    let error = CoreError::Config(ConfigError::ValidationFailed {
        reason: "Searching all of Reddit requires a title or content term.".to_string(),
    });
    assert_eq!(error.category(), ErrorCategory::Configuration);
    assert!(error.user_friendly_message().contains("requires a title"));
}

#[test]
fn test_user_friendly_messages() {
    let auth = CoreError::RedditApi(RedditApiError::InvalidToken);
    assert!(auth.user_friendly_message().contains("Invalid Reddit API credentials"));
    assert!(auth.hint().unwrap().contains("Client ID"));

    let unexpected = CoreError::RedditApi(RedditApiError::from_status(400, "/search", None));
    assert!(unexpected.user_friendly_message().contains("status code 400"));
    assert!(unexpected.hint().is_none());

    let missing = CoreError::Config(ConfigError::MissingCredentials {
        names: vec![
            "REDDIT_CLIENT_ID".to_string(),
            "REDDIT_USER_AGENT".to_string(),
        ],
    });
    assert_eq!(
        missing.user_friendly_message(),
        "Missing required Reddit API credentials: REDDIT_CLIENT_ID, REDDIT_USER_AGENT"
    );

    let io = CoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
    assert_eq!(io.category(), ErrorCategory::Unexpected);
    assert!(io.user_friendly_message().contains("disk full"));
}

#[test]
fn test_error_reporter() {
    let reporter = ErrorReporter::new();
    let error = CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after: 30 });

    // Logging only; must not panic
    reporter.report_error(&error);

    let rendered = reporter.render(&error);
    assert!(rendered.starts_with("Error: Rate limit exceeded"));
    assert!(rendered.lines().count() == 2);
}
