//! Assembles a post's comment forest from Reddit's nested listings and the
//! flat `/api/morechildren` results.
//!
//! Everything is first recorded as a flat, ordered list of (parent, comment)
//! entries. The owned tree is built once at the end, children before parents.

use crate::api::{CommentThing, RedditCommentData, RedditMoreData, MAX_MORE_CHILDREN};
use scraper_core::RawComment;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug)]
struct FlatComment {
    parent_id: String,
    comment: RawComment,
}

#[derive(Debug)]
pub struct CommentArena {
    link_id: String,
    entries: Vec<FlatComment>,
    pending: Vec<RedditMoreData>,
}

impl CommentArena {
    /// `post_id` is the bare id; the arena roots the forest at its `t3_` fullname.
    pub fn new(post_id: &str) -> Self {
        Self {
            link_id: format!("t3_{}", post_id),
            entries: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn link_id(&self) -> &str {
        &self.link_id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending_placeholders(&self) -> usize {
        self.pending.len()
    }

    /// Records comments (with their nested replies) and placeholders in listing order.
    pub fn ingest(&mut self, things: Vec<CommentThing>) {
        for thing in things {
            match thing {
                CommentThing::Comment(data) => self.ingest_comment(data),
                CommentThing::More(more) => {
                    // "continue this thread" links carry no ids and cannot be expanded
                    if more.children.is_empty() {
                        debug!("Skipping thread continuation under {}", more.parent_id);
                    } else {
                        self.pending.push(more);
                    }
                }
            }
        }
    }

    fn ingest_comment(&mut self, data: RedditCommentData) {
        let RedditCommentData {
            id,
            author,
            body,
            created_utc,
            score,
            parent_id,
            replies,
        } = data;

        self.entries.push(FlatComment {
            parent_id,
            comment: RawComment {
                id,
                author,
                body,
                created_utc: created_utc as i64,
                score,
                replies: Vec::new(),
            },
        });

        if let Some(listing) = replies {
            self.ingest(listing.data.children);
        }
    }

    /// Takes the placeholder hiding the most comments (earliest on ties), at
    /// most `MAX_MORE_CHILDREN` ids of it. Any remainder stays queued in its place.
    pub fn next_placeholder(&mut self) -> Option<RedditMoreData> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .max_by(|(i, a), (j, b)| a.count.cmp(&b.count).then(j.cmp(i)))
            .map(|(i, _)| i)?;
        let mut more = self.pending.remove(index);
        if more.children.len() > MAX_MORE_CHILDREN {
            let rest = more.children.split_off(MAX_MORE_CHILDREN);
            let count = more.count.saturating_sub(MAX_MORE_CHILDREN as u64);
            let remainder = RedditMoreData {
                id: more.id.clone(),
                parent_id: more.parent_id.clone(),
                count: count.max(rest.len() as u64),
                children: rest,
            };
            self.pending.insert(index, remainder);
        }
        Some(more)
    }

    /// Builds the owned forest of top-level comments. Unresolved placeholders are dropped.
    pub fn into_forest(self) -> Vec<RawComment> {
        let mut children: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, entry) in self.entries.iter().enumerate() {
            children
                .entry(entry.parent_id.clone())
                .or_default()
                .push(index);
        }

        let mut slots: Vec<Option<RawComment>> =
            self.entries.into_iter().map(|e| Some(e.comment)).collect();

        build_children(&self.link_id, &children, &mut slots)
    }
}

fn build_children(
    parent_id: &str,
    children: &HashMap<String, Vec<usize>>,
    slots: &mut [Option<RawComment>],
) -> Vec<RawComment> {
    let Some(indices) = children.get(parent_id) else {
        return Vec::new();
    };

    let mut built = Vec::with_capacity(indices.len());
    for &index in indices {
        // each slot is taken once, so malformed parent links cannot loop
        let Some(mut comment) = slots[index].take() else {
            continue;
        };
        let fullname = format!("t1_{}", comment.id);
        comment.replies = build_children(&fullname, children, slots);
        built.push(comment);
    }
    built
}
