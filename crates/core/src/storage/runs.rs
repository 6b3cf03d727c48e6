use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Partial,
    Error,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Partial => "partial",
            RunStatus::Error => "error",
        }
    }

    /// `Partial` when some recipients did not get an email.
    pub fn from_counts(recipients: usize, emails_sent: usize) -> Self {
        if emails_sent >= recipients {
            RunStatus::Success
        } else {
            RunStatus::Partial
        }
    }
}

pub async fn record_news_summary_run(
    pool: &sqlx::PgPool,
    run_date: NaiveDate,
    status: RunStatus,
    recipients: usize,
    emails_sent: usize,
    error: Option<&str>,
) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    let generated_at: DateTime<Utc> = Utc::now();

    sqlx::query(
        "INSERT INTO news_summary_runs (id, run_date, generated_at, status, recipients, emails_sent, error) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .persistent(false)
    .bind(id)
    .bind(run_date)
    .bind(generated_at)
    .bind(status.as_str())
    .bind(i32::try_from(recipients).unwrap_or(i32::MAX))
    .bind(i32::try_from(emails_sent).unwrap_or(i32::MAX))
    .bind(error)
    .execute(pool)
    .await
    .context("insert news_summary_runs failed")?;

    Ok(id)
}
