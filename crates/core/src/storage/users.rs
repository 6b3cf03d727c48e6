use crate::domain::user::{NewsRecipient, UserPreferences};
use anyhow::Context;

pub async fn find_user_id_by_email(
    pool: &sqlx::PgPool,
    email: &str,
) -> anyhow::Result<Option<String>> {
    let id: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE lower(email) = lower($1)")
        .bind(email.trim())
        .fetch_optional(pool)
        .await
        .context("select users by email failed")?;
    Ok(id)
}

pub async fn require_user_id_by_email(pool: &sqlx::PgPool, email: &str) -> anyhow::Result<String> {
    find_user_id_by_email(pool, email)
        .await?
        .with_context(|| format!("no user found with email {email}"))
}

/// Users that can receive the daily summary: both email and name present.
pub async fn news_recipients(pool: &sqlx::PgPool) -> anyhow::Result<Vec<NewsRecipient>> {
    let rows = sqlx::query_as::<_, (String, String, Option<String>)>(
        "SELECT id, email, name FROM users ORDER BY created_at ASC",
    )
    .fetch_all(pool)
    .await
    .context("select news recipients failed")?;

    Ok(rows
        .into_iter()
        .filter_map(|(id, email, name)| recipient_from_row(id, email, name))
        .collect())
}

fn recipient_from_row(id: String, email: String, name: Option<String>) -> Option<NewsRecipient> {
    let email = email.trim().to_string();
    let name = name.map(|n| n.trim().to_string()).unwrap_or_default();
    if email.is_empty() || name.is_empty() {
        return None;
    }
    Some(NewsRecipient { id, email, name })
}

pub async fn upsert_preferences(
    pool: &sqlx::PgPool,
    email: &str,
    prefs: &UserPreferences,
) -> anyhow::Result<()> {
    let user_id = require_user_id_by_email(pool, email).await?;

    sqlx::query(
        "INSERT INTO user_preferences (user_id, country, investment_goals, risk_tolerance, preferred_industry, updated_at) \
         VALUES ($1, $2, $3, $4, $5, now()) \
         ON CONFLICT (user_id) DO UPDATE \
           SET country = EXCLUDED.country, investment_goals = EXCLUDED.investment_goals, \
               risk_tolerance = EXCLUDED.risk_tolerance, preferred_industry = EXCLUDED.preferred_industry, \
               updated_at = EXCLUDED.updated_at",
    )
    .bind(&user_id)
    .bind(prefs.country.trim())
    .bind(prefs.investment_goals.trim())
    .bind(prefs.risk_tolerance.trim())
    .bind(prefs.preferred_industry.trim())
    .execute(pool)
    .await
    .context("upsert user_preferences failed")?;

    Ok(())
}

/// Returns the display name alongside the stored preferences.
pub async fn preferences_by_email(
    pool: &sqlx::PgPool,
    email: &str,
) -> anyhow::Result<Option<(NewsRecipient, Option<UserPreferences>)>> {
    let row = sqlx::query_as::<
        _,
        (
            String,
            String,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
        ),
    >(
        "SELECT u.id, u.email, u.name, p.country, p.investment_goals, p.risk_tolerance, p.preferred_industry \
         FROM users u \
         LEFT JOIN user_preferences p ON p.user_id = u.id \
         WHERE lower(u.email) = lower($1)",
    )
    .bind(email.trim())
    .fetch_optional(pool)
    .await
    .context("select user_preferences failed")?;

    let Some((id, email, name, country, goals, risk, industry)) = row else {
        return Ok(None);
    };

    let prefs = match (country, goals, risk, industry) {
        (Some(country), Some(investment_goals), Some(risk_tolerance), Some(preferred_industry)) => {
            Some(UserPreferences {
                country,
                investment_goals,
                risk_tolerance,
                preferred_industry,
            })
        }
        _ => None,
    };

    let user = NewsRecipient {
        id,
        email,
        name: name.unwrap_or_default(),
    };
    Ok(Some((user, prefs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipients_need_email_and_name() {
        assert!(recipient_from_row("1".into(), "a@b.c".into(), None).is_none());
        assert!(recipient_from_row("1".into(), " ".into(), Some("Ann".into())).is_none());
        assert!(recipient_from_row("1".into(), "a@b.c".into(), Some("  ".into())).is_none());

        let r = recipient_from_row("1".into(), " a@b.c ".into(), Some("Ann".into())).unwrap();
        assert_eq!(r.email, "a@b.c");
        assert_eq!(r.name, "Ann");
    }
}
