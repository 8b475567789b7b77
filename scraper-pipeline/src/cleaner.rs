use html_escape::decode_html_entities;
use regex::Regex;
use std::sync::LazyLock;

pub const DELETED_MARKER: &str = "[deleted]";
pub const REMOVED_MARKER: &str = "[removed]";

static RE_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/?\b[ur]/[A-Za-z0-9_-]+").unwrap());
static RE_INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`\n]*)`").unwrap());
static RE_BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*\n]+?)\*\*|__([^_\n]+?)__").unwrap());
static RE_STRIKE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"~~([^~\n]+?)~~").unwrap());
// emphasis only when the delimiters hug the text, so `3 * 4 * 5` is left alone
static RE_ITALIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*([^*\s](?:[^*\n]*?[^*\s])?)\*|\b_([^_\n]+?)_\b").unwrap()
});
// `^word` only at the start of a word; `2^10` is not markup
static RE_SUPERSCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\^\(([^)\n]*)\)|(^|\s)\^").unwrap());
static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalizes comment bodies for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCleaner;

impl TextCleaner {
    pub fn new() -> Self {
        Self
    }

    /// Cleaned body, or `None` when nothing worth keeping is left.
    pub fn clean(&self, raw_body: &str) -> Option<String> {
        if is_deleted_marker(raw_body) {
            return None;
        }

        let text = RE_MENTION.replace_all(raw_body, "");
        let text = strip_markdown(&text);
        let text = drop_quoted_lines(&text);
        let text = decode_entities(&text);
        let text = RE_WHITESPACE.replace_all(&text, " ");

        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }
}

pub fn is_deleted_marker(body: &str) -> bool {
    let body = body.trim();
    body == DELETED_MARKER || body == REMOVED_MARKER
}

fn strip_markdown(text: &str) -> String {
    let text = RE_INLINE_CODE.replace_all(text, "${1}");
    let text = RE_BOLD.replace_all(&text, "${1}${2}");
    let text = RE_STRIKE.replace_all(&text, "${1}");
    let text = RE_ITALIC.replace_all(&text, "${1}${2}");
    RE_SUPERSCRIPT.replace_all(&text, "${1}${2}").into_owned()
}

/// Bodies arrive HTML-escaped, so a quote marker may be `>` or `&gt;`.
fn drop_quoted_lines(text: &str) -> String {
    text.lines()
        .filter(|line| {
            let line = line.trim_start();
            !(line.starts_with('>') || line.starts_with("&gt;"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    decode_html_entities(text).into_owned()
}
