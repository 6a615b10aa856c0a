//! Note content to HTML markup.
//!
//! # Responsibility
//! - Escape raw note text before any markup is introduced.
//! - Render the card summary and the markdown-lite detail body.
//!
//! # Invariants
//! - Raw `<`, `>` and `&` from note content never reach the output unescaped.
//! - Summary truncation counts characters of the escaped string.
//! - Per-line transforms run before list regrouping.

use once_cell::sync::Lazy;
use regex::Regex;

/// Escaped summary length before the ellipsis is appended.
pub const SUMMARY_MAX_CHARS: usize = 200;
const ELLIPSIS: &str = "...";

static PARAGRAPH_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{2,}").expect("valid paragraph regex"));
static BOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold regex"));
static ITALIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").expect("valid italic regex"));
static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`(.*?)`").expect("valid code regex"));
static ORDERED_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\. (.*)$").expect("valid ordered item regex"));

const HEADING_PREFIXES: [(&str, u8); 3] = [("### ", 3), ("## ", 2), ("# ", 1)];
const QUOTE_PREFIX: &str = "&gt; ";
const BULLET_PREFIX: &str = "- ";

/// Escapes text the way a DOM text node serializes it.
///
/// Quotes are left alone; only `&`, `<`, `>` and no-break space are replaced.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Card summary: escaped, newlines as `<br>`, capped at 200 characters.
///
/// The cap applies to the escaped markup, so a cut may land inside an
/// entity or a `<br>` tag.
pub fn format_summary(content: &str) -> String {
    let formatted = escape_html(content).replace('\n', "<br>");
    match formatted.char_indices().nth(SUMMARY_MAX_CHARS) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &formatted[..cut]),
        None => formatted,
    }
}

/// Detail body: paragraphs, line breaks, and markdown-lite markup.
///
/// Supported per line: `#`/`##`/`###` headings, `**bold**`, `*italic*`,
/// `` `code` ``, `> ` quotes, `- ` bullets and `N. ` numbered items.
/// Consecutive items of one kind are grouped into `<ul>` or `<ol>`.
pub fn format_detail(content: &str) -> String {
    let escaped = escape_html(content);
    PARAGRAPH_BREAK_RE
        .split(&escaped)
        .map(|paragraph| {
            let blocks = paragraph.split('\n').map(render_line).collect::<Vec<_>>();
            format!("<p>{}</p>", group_blocks(blocks).join("<br>"))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            Self::Unordered => "ul",
            Self::Ordered => "ol",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Block {
    Line(String),
    Item(ListKind, String),
}

fn render_line(line: &str) -> Block {
    for (prefix, level) in HEADING_PREFIXES {
        if let Some(text) = line.strip_prefix(prefix) {
            return Block::Line(format!("<h{level}>{}</h{level}>", render_inline(text)));
        }
    }

    let html = render_inline(line);
    if let Some(text) = html.strip_prefix(QUOTE_PREFIX) {
        return Block::Line(format!("<blockquote>{text}</blockquote>"));
    }
    if let Some(text) = html.strip_prefix(BULLET_PREFIX) {
        return Block::Item(ListKind::Unordered, format!("<li>{text}</li>"));
    }
    if let Some(caps) = ORDERED_ITEM_RE.captures(&html) {
        return Block::Item(ListKind::Ordered, format!("<li>{}</li>", &caps[1]));
    }
    Block::Line(html)
}

fn render_inline(text: &str) -> String {
    let bold = BOLD_RE.replace_all(text, "<strong>$1</strong>");
    let italic = ITALIC_RE.replace_all(&bold, "<em>$1</em>");
    CODE_RE.replace_all(&italic, "<code>$1</code>").into_owned()
}

/// Greedily merges runs of same-kind list items into one container.
fn group_blocks(blocks: Vec<Block>) -> Vec<String> {
    let mut segments = Vec::with_capacity(blocks.len());
    let mut open: Option<(ListKind, String)> = None;

    for block in blocks {
        match block {
            Block::Item(kind, item) => {
                if let Some((open_kind, items)) = open.as_mut() {
                    if *open_kind == kind {
                        items.push_str(&item);
                        continue;
                    }
                }
                if let Some(run) = open.replace((kind, item)) {
                    segments.push(close_list(run));
                }
            }
            Block::Line(line) => {
                if let Some(run) = open.take() {
                    segments.push(close_list(run));
                }
                segments.push(line);
            }
        }
    }
    if let Some(run) = open {
        segments.push(close_list(run));
    }
    segments
}

fn close_list((kind, items): (ListKind, String)) -> String {
    let tag = kind.tag();
    format!("<{tag}>{items}</{tag}>")
}
