use crate::domain::symbol::Symbol;
use serde::{Deserialize, Serialize};

const SYMBOL_SUMMARY_MAX_CHARS: usize = 200;
const GENERAL_SUMMARY_MAX_CHARS: usize = 150;

/// An article as the provider returns it. Any field may be missing or null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub datetime: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub related: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArticleOrigin {
    Symbol { symbol: Symbol, round: usize },
    General { ordinal: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedArticle {
    pub id: i64,
    pub headline: String,
    pub summary: String,
    pub source: String,
    pub url: String,
    pub datetime: i64,
    pub category: String,
    pub related: String,
    pub image: Option<String>,
    pub origin: ArticleOrigin,
}

impl RawArticle {
    /// Headline, summary, source and url must be non-blank and the timestamp positive.
    pub fn is_valid(&self) -> bool {
        non_blank(&self.headline)
            && non_blank(&self.summary)
            && non_blank(&self.source)
            && non_blank(&self.url)
            && self.datetime.is_some_and(|t| t > 0)
    }

    /// Returns `None` when the article fails [`RawArticle::is_valid`].
    pub fn format(&self, origin: ArticleOrigin) -> Option<FormattedArticle> {
        if !self.is_valid() {
            return None;
        }

        let headline = trimmed(&self.headline)?;
        let source = trimmed(&self.source)?;
        let url = trimmed(&self.url)?;
        let summary = trimmed(&self.summary)?;
        let datetime = self.datetime?;

        let (summary_limit, category, related) = match &origin {
            ArticleOrigin::Symbol { symbol, .. } => (
                SYMBOL_SUMMARY_MAX_CHARS,
                "company".to_string(),
                symbol.to_string(),
            ),
            ArticleOrigin::General { .. } => (
                GENERAL_SUMMARY_MAX_CHARS,
                trimmed(&self.category).unwrap_or_else(|| "general".to_string()),
                trimmed(&self.related).unwrap_or_default(),
            ),
        };

        Some(FormattedArticle {
            id: self.id.unwrap_or_default(),
            headline,
            summary: truncate_chars(&summary, summary_limit),
            source,
            url,
            datetime,
            category,
            related,
            image: trimmed(&self.image),
            origin,
        })
    }
}

impl FormattedArticle {
    pub fn is_valid(&self) -> bool {
        !self.headline.trim().is_empty()
            && !self.summary.trim().is_empty()
            && !self.source.trim().is_empty()
            && !self.url.trim().is_empty()
            && self.datetime > 0
    }
}

/// Keeps only articles passing the validity predicate.
pub fn retain_valid(articles: Vec<RawArticle>) -> Vec<RawArticle> {
    articles.into_iter().filter(RawArticle::is_valid).collect()
}

fn non_blank(v: &Option<String>) -> bool {
    v.as_deref().is_some_and(|s| !s.trim().is_empty())
}

fn trimmed(v: &Option<String>) -> Option<String> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", s[..byte_idx].trim_end()),
        None => s.to_string(),
    }
}
