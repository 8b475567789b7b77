use scraper_core::{ListingRequest, SearchCriteria};

/// A query string in Reddit's search syntax and whether searching is needed at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub is_search: bool,
}

impl SearchQuery {
    pub fn from_criteria(criteria: &SearchCriteria) -> Self {
        build_query(
            criteria.title_term.as_deref(),
            criteria.content_term.as_deref(),
        )
    }

    /// Newest listing when there is nothing to search for, a search otherwise.
    pub fn into_request(self, subreddit: &str) -> ListingRequest {
        if self.is_search {
            ListingRequest::Search {
                subreddit: subreddit.to_string(),
                query: self.query,
            }
        } else {
            ListingRequest::Newest {
                subreddit: subreddit.to_string(),
            }
        }
    }
}

/// Field-scoped exact-phrase clauses joined with `AND`. Quotes inside a term
/// are passed through untouched.
pub fn build_query(title_term: Option<&str>, content_term: Option<&str>) -> SearchQuery {
    let clauses: Vec<String> = [("title", title_term), ("selftext", content_term)]
        .into_iter()
        .filter_map(|(field, term)| term.map(|t| format!("{}:\"{}\"", field, t)))
        .collect();

    SearchQuery {
        is_search: !clauses.is_empty(),
        query: clauses.join(" AND "),
    }
}
