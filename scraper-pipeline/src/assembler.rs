use chrono::{DateTime, SecondsFormat, Utc};
use scraper_core::{CleanedComment, PostRecord, RawPost};

/// RFC 3339 UTC date for an epoch timestamp, e.g. `2023-11-14T22:13:20+00:00`.
pub fn iso_date(epoch_seconds: i64) -> String {
    DateTime::<Utc>::from_timestamp(epoch_seconds, 0)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}

pub fn assemble_post(post: RawPost, comments: Vec<CleanedComment>) -> PostRecord {
    let processed_comment_count = comments.iter().map(CleanedComment::tree_size).sum();

    PostRecord {
        created_date: iso_date(post.created_utc),
        id: post.id,
        subreddit: post.subreddit,
        title: post.title,
        url: post.url,
        created_utc: post.created_utc,
        author: post.author,
        score: post.score,
        upvote_ratio: post.upvote_ratio,
        num_comments: post.num_comments,
        selftext: post.selftext,
        permalink: post.permalink,
        comments,
        processed_comment_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_post() -> RawPost {
        RawPost {
            id: "abc".to_string(),
            subreddit: "padel".to_string(),
            title: "Best court shoes?".to_string(),
            url: "https://www.reddit.com/r/padel/comments/abc/".to_string(),
            created_utc: 1_700_000_000,
            author: "alice".to_string(),
            score: 7,
            upvote_ratio: 0.88,
            num_comments: 3,
            selftext: "Looking for advice".to_string(),
            permalink: "/r/padel/comments/abc/best_court_shoes/".to_string(),
        }
    }

    fn cleaned(id: &str, replies: Vec<CleanedComment>) -> CleanedComment {
        CleanedComment {
            id: id.to_string(),
            author: "bob".to_string(),
            body: "some words here".to_string(),
            created_date: iso_date(1_700_000_100),
            score: 1,
            word_count: 3,
            char_count: 15,
            replies,
        }
    }

    #[test]
    fn test_iso_date_format() {
        assert_eq!(iso_date(1_700_000_000), "2023-11-14T22:13:20+00:00");
        assert_eq!(iso_date(0), "1970-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_assemble_copies_fields() {
        let record = assemble_post(raw_post(), vec![]);
        assert_eq!(record.id, "abc");
        assert_eq!(record.created_utc, 1_700_000_000);
        assert_eq!(record.created_date, "2023-11-14T22:13:20+00:00");
        assert_eq!(record.upvote_ratio, 0.88);
        assert_eq!(record.permalink, "/r/padel/comments/abc/best_court_shoes/");
        assert_eq!(record.processed_comment_count, 0);
    }

    #[test]
    fn test_processed_count_includes_replies() {
        let comments = vec![
            cleaned("a", vec![cleaned("a1", vec![cleaned("a2", vec![])])]),
            cleaned("b", vec![]),
        ];
        let record = assemble_post(raw_post(), comments);
        assert_eq!(record.comments.len(), 2);
        assert_eq!(record.processed_comment_count, 4);
    }
}
