pub mod domain;
pub mod llm;
pub mod mail;
pub mod market;
pub mod news;
pub mod search;
pub mod storage;
pub mod time;
pub mod watchlist;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub finnhub_base_url: Option<String>,
        pub finnhub_api_key: Option<String>,
        pub anthropic_api_key: Option<String>,
        pub mail_api_url: Option<String>,
        pub mail_api_key: Option<String>,
        pub mail_from: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                database_url: non_empty_var("DATABASE_URL"),
                finnhub_base_url: non_empty_var("FINNHUB_BASE_URL"),
                finnhub_api_key: non_empty_var("FINNHUB_API_KEY"),
                anthropic_api_key: non_empty_var("ANTHROPIC_API_KEY"),
                mail_api_url: non_empty_var("MAIL_API_URL"),
                mail_api_key: non_empty_var("MAIL_API_KEY"),
                mail_from: non_empty_var("MAIL_FROM"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }

        pub fn require_anthropic_api_key(&self) -> anyhow::Result<&str> {
            self.anthropic_api_key
                .as_deref()
                .context("ANTHROPIC_API_KEY is required")
        }

        pub fn require_mail_api_url(&self) -> anyhow::Result<&str> {
            self.mail_api_url
                .as_deref()
                .context("MAIL_API_URL is required")
        }

        pub fn finnhub_base_url(&self) -> &str {
            self.finnhub_base_url
                .as_deref()
                .unwrap_or(DEFAULT_FINNHUB_BASE_URL)
        }
    }

    // Blank values in .env files count as unset.
    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
