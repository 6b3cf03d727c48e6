use crate::domain::news::FormattedArticle;
use crate::domain::user::UserPreferences;
use crate::llm::error::log_llm_failure;
use crate::llm::{GenerateInput, LlmClient};
use anyhow::Context;

pub const NO_NEWS_FALLBACK: &str = "No market news available today.";
pub const WELCOME_FALLBACK: &str =
    "Thanks for joining Signalist. You now have the tools to track markets and make smarter moves!";

const NEWS_SUMMARY_TEMPLATE: &str = "\
Summarise the following market news for a daily email.

Write an HTML fragment with up to three sections (<h3> headings) grouping related stories.
For each story give a one-sentence plain-English takeaway in a <li>, then a link to the article
using its url. Keep the whole summary under 250 words. If the list is empty, reply with a single
<p> saying there is no notable market news today.

News items (JSON):
{{newsItems}}";

const WELCOME_TEMPLATE: &str = "\
Write a personalised two-sentence welcome intro for a new user of a stock watchlist app.
Reference their profile naturally, do not list it back verbatim. Return a single <p> element.

User name: {{userName}}
User profile:
{{userProfile}}";

pub fn news_summary_prompt(news: &[FormattedArticle]) -> anyhow::Result<String> {
    let items = serde_json::to_string_pretty(news).context("failed to serialize news items")?;
    Ok(NEWS_SUMMARY_TEMPLATE.replace("{{newsItems}}", &items))
}

pub fn welcome_prompt(name: &str, prefs: Option<&UserPreferences>) -> String {
    let profile = prefs
        .map(UserPreferences::profile_lines)
        .unwrap_or_else(|| "- No preferences provided".to_string());
    WELCOME_TEMPLATE
        .replace("{{userName}}", name.trim())
        .replace("{{userProfile}}", &profile)
}

/// Errors propagate so the caller can decide whether to skip the email.
pub async fn summarize_news(
    llm: &dyn LlmClient,
    news: &[FormattedArticle],
) -> anyhow::Result<String> {
    let prompt = news_summary_prompt(news)?;
    let text = llm
        .generate_text(GenerateInput {
            purpose: "news-summary",
            prompt,
        })
        .await?;
    Ok(non_blank_or(text, NO_NEWS_FALLBACK))
}

/// Always produces an intro; model failures fall back to a stock sentence.
pub async fn welcome_intro(
    llm: &dyn LlmClient,
    name: &str,
    prefs: Option<&UserPreferences>,
) -> String {
    let input = GenerateInput {
        purpose: "welcome-intro",
        prompt: welcome_prompt(name, prefs),
    };
    match llm.generate_text(input).await {
        Ok(text) => non_blank_or(text, WELCOME_FALLBACK),
        Err(err) => {
            log_llm_failure(&err, "welcome-intro", "welcome intro generation failed; using fallback");
            WELCOME_FALLBACK.to_string()
        }
    }
}

fn non_blank_or(text: String, fallback: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        fallback.to_string()
    } else {
        text.to_string()
    }
}
