//! Result-block extraction from the search page HTML.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

/// At most this many result blocks are summarized.
pub const MAX_SUMMARIES: usize = 3;

static RESULT_BLOCK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".view_wrap.api_ani_send").expect("valid selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".title_link").expect("valid selector"));
static DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".api_txt_lines.dsc_txt").expect("valid selector"));

/// Title and description of one search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub title: String,
    pub description: String,
}

impl Summary {
    /// Display form: pin marker, title, newline, description.
    pub fn display(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "📌 {}\n{}", self.title, self.description)
    }
}

/// Summaries of the first [`MAX_SUMMARIES`] result blocks, in document order.
///
/// Blocks where both title and description are empty are dropped after the
/// cut, so fewer than three may come back.
pub fn parse_summaries(html: &str) -> Vec<Summary> {
    let doc = Html::parse_document(html);

    doc.select(&RESULT_BLOCK)
        .take(MAX_SUMMARIES)
        .filter_map(|block| {
            let title = joined_text(block, &TITLE);
            let description = joined_text(block, &DESCRIPTION);
            if title.is_empty() && description.is_empty() {
                None
            } else {
                Some(Summary { title, description })
            }
        })
        .collect()
}

/// Text of every descendant matching `selector`, concatenated in document
/// order and trimmed. Empty when nothing matches.
fn joined_text(block: ElementRef<'_>, selector: &Selector) -> String {
    block
        .select(selector)
        .flat_map(|el| el.text())
        .collect::<String>()
        .trim()
        .to_string()
}
