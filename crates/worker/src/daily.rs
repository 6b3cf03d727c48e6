use chrono::NaiveDate;
use futures::future::join_all;

use signalist_core::domain::news::FormattedArticle;
use signalist_core::domain::user::NewsRecipient;
use signalist_core::llm::error::log_llm_failure;
use signalist_core::llm::prompts::summarize_news;
use signalist_core::llm::LlmClient;
use signalist_core::mail::templates::news_summary_email;
use signalist_core::mail::{Mailer, OutgoingEmail};
use signalist_core::market::MarketDataClient;
use signalist_core::news::{get_news, MAX_ARTICLES};
use signalist_core::storage::{self, runs::RunStatus, Database};
use signalist_core::time::window::format_long_date;

pub struct DailyJob<'a> {
    pub db: &'a Database,
    pub market: &'a dyn MarketDataClient,
    pub llm: &'a dyn LlmClient,
    /// `None` in dry-run mode.
    pub mailer: Option<&'a dyn Mailer>,
}

#[derive(Debug)]
pub struct UserDigest {
    pub recipient: NewsRecipient,
    pub news: Vec<FormattedArticle>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunCounts {
    pub recipients: usize,
    pub emails_sent: usize,
}

impl DailyJob<'_> {
    pub async fn run(&self, run_date: NaiveDate) -> anyhow::Result<()> {
        let dry_run = self.mailer.is_none();

        let mut conn = self.db.pool().acquire().await?;
        let acquired = storage::lock::try_acquire_run_date_lock(&mut *conn, run_date).await?;
        if !acquired {
            tracing::warn!(%run_date, "run_date lock not acquired; another run in progress");
            return Ok(());
        }

        let result = self.send_summaries(run_date).await;
        let recorded = self.record(run_date, &result, dry_run).await;

        if let Err(err) = storage::lock::release_run_date_lock(&mut *conn, run_date).await {
            tracing::warn!(%run_date, error = %format!("{err:#}"), "failed to release run_date lock");
        }
        recorded
    }

    async fn record(
        &self,
        run_date: NaiveDate,
        result: &anyhow::Result<RunCounts>,
        dry_run: bool,
    ) -> anyhow::Result<()> {
        let (status, counts, error) = match result {
            Ok(counts) => {
                tracing::info!(
                    %run_date,
                    dry_run,
                    recipients = counts.recipients,
                    emails_sent = counts.emails_sent,
                    "daily news summary finished"
                );
                (
                    RunStatus::from_counts(counts.recipients, counts.emails_sent),
                    *counts,
                    None,
                )
            }
            Err(err) => {
                sentry_anyhow::capture_anyhow(err);
                tracing::error!(%run_date, error = %format!("{err:#}"), "daily news summary failed");
                (RunStatus::Error, RunCounts::default(), Some(format!("{err:#}")))
            }
        };

        if dry_run {
            return Ok(());
        }

        let run_id = storage::runs::record_news_summary_run(
            self.db.pool(),
            run_date,
            status,
            counts.recipients,
            counts.emails_sent,
            error.as_deref(),
        )
        .await?;
        tracing::info!(%run_date, %run_id, status = status.as_str(), "recorded news summary run");
        Ok(())
    }

    async fn send_summaries(&self, run_date: NaiveDate) -> anyhow::Result<RunCounts> {
        let recipients = storage::users::news_recipients(self.db.pool()).await?;
        if recipients.is_empty() {
            tracing::info!(%run_date, "no users found for news summary");
            return Ok(RunCounts::default());
        }

        let digests = self.gather_news(recipients, run_date).await;
        let recipients = digests.len();

        let date_label = format_long_date(run_date);
        let emails = compose_emails(self.llm, digests, &date_label).await;

        let emails_sent = match self.mailer {
            Some(mailer) => send_all(mailer, emails).await,
            None => {
                for email in &emails {
                    tracing::info!(to = %email.to, subject = %email.subject, "dry-run: email not sent");
                }
                0
            }
        };

        Ok(RunCounts {
            recipients,
            emails_sent,
        })
    }

    async fn gather_news(
        &self,
        recipients: Vec<NewsRecipient>,
        today: NaiveDate,
    ) -> Vec<UserDigest> {
        join_all(recipients.into_iter().map(|recipient| async move {
            let symbols = storage::watchlist::symbols_by_email(self.db.pool(), &recipient.email).await;
            let news = match get_news(self.market, &symbols, today).await {
                Ok(mut news) => {
                    news.truncate(MAX_ARTICLES);
                    news
                }
                Err(err) => {
                    tracing::warn!(
                        email = %recipient.email,
                        error = %format!("{err:#}"),
                        "news fetch failed for user; summarising empty list"
                    );
                    Vec::new()
                }
            };
            UserDigest { recipient, news }
        }))
        .await
    }
}

/// Summaries run one user at a time to stay inside model rate limits.
/// A user whose summary fails gets no email.
pub async fn compose_emails(
    llm: &dyn LlmClient,
    digests: Vec<UserDigest>,
    date_label: &str,
) -> Vec<OutgoingEmail> {
    let mut emails = Vec::with_capacity(digests.len());
    for digest in digests {
        match summarize_news(llm, &digest.news).await {
            Ok(summary) => emails.push(news_summary_email(
                &digest.recipient.email,
                date_label,
                &summary,
            )),
            Err(err) => {
                tracing::warn!(
                    email = %digest.recipient.email,
                    provider = ?llm.provider(),
                    "no summary for user; skipping email"
                );
                log_llm_failure(&err, "news-summary", "news summary generation failed");
            }
        }
    }
    emails
}

/// Returns how many emails the relay accepted.
pub async fn send_all(mailer: &dyn Mailer, emails: Vec<OutgoingEmail>) -> usize {
    let results = join_all(emails.into_iter().map(|email| async move {
        let to = email.to.clone();
        mailer.send(email).await.map_err(|err| (to, err))
    }))
    .await;

    results
        .into_iter()
        .filter(|res| match res {
            Ok(()) => true,
            Err((to, err)) => {
                tracing::error!(%to, error = %format!("{err:#}"), "news summary email failed");
                false
            }
        })
        .count()
}
