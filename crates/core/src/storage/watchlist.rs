use crate::domain::stock::{WatchlistChange, WatchlistItem};
use crate::domain::symbol::Symbol;
use crate::storage::users::{find_user_id_by_email, require_user_id_by_email};
use anyhow::Context;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Symbols followed by the user with this email. Unknown users and database errors are
/// logged and yield an empty list.
pub async fn symbols_by_email(pool: &sqlx::PgPool, email: &str) -> Vec<Symbol> {
    match try_symbols_by_email(pool, email).await {
        Ok(symbols) => symbols,
        Err(err) => {
            tracing::error!(email, error = %format!("{err:#}"), "failed to load watchlist symbols");
            Vec::new()
        }
    }
}

async fn try_symbols_by_email(pool: &sqlx::PgPool, email: &str) -> anyhow::Result<Vec<Symbol>> {
    let Some(user_id) = find_user_id_by_email(pool, email).await? else {
        tracing::info!(email, "no user found for watchlist lookup");
        return Ok(Vec::new());
    };

    let rows: Vec<String> = sqlx::query_scalar(
        "SELECT symbol FROM watchlist_items WHERE user_id = $1 ORDER BY added_at DESC",
    )
    .bind(&user_id)
    .fetch_all(pool)
    .await
    .context("select watchlist symbols failed")?;

    Ok(rows.iter().filter_map(|s| Symbol::parse(s)).collect())
}

pub async fn items_by_email(
    pool: &sqlx::PgPool,
    email: &str,
) -> anyhow::Result<Vec<WatchlistItem>> {
    let user_id = require_user_id_by_email(pool, email).await?;

    let rows = sqlx::query_as::<_, (String, String, DateTime<Utc>)>(
        "SELECT symbol, company, added_at FROM watchlist_items \
         WHERE user_id = $1 \
         ORDER BY added_at DESC",
    )
    .bind(&user_id)
    .fetch_all(pool)
    .await
    .context("select watchlist_items failed")?;

    Ok(rows
        .into_iter()
        .filter_map(|(symbol, company, added_at)| {
            Some(WatchlistItem {
                user_id: user_id.clone(),
                symbol: Symbol::parse(&symbol)?,
                company,
                added_at,
            })
        })
        .collect())
}

pub async fn add(
    pool: &sqlx::PgPool,
    email: &str,
    symbol: &Symbol,
    company: &str,
) -> anyhow::Result<WatchlistChange> {
    let user_id = require_user_id_by_email(pool, email).await?;
    let company = match company.trim() {
        "" => symbol.as_str(),
        c => c,
    };

    let res = sqlx::query(
        "INSERT INTO watchlist_items (id, user_id, symbol, company, added_at) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (user_id, symbol) DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind(&user_id)
    .bind(symbol.as_str())
    .bind(company)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("insert watchlist_items failed")?;

    Ok(if res.rows_affected() == 0 {
        WatchlistChange::AlreadyPresent
    } else {
        WatchlistChange::Added
    })
}

pub async fn remove(
    pool: &sqlx::PgPool,
    email: &str,
    symbol: &Symbol,
) -> anyhow::Result<WatchlistChange> {
    let user_id = require_user_id_by_email(pool, email).await?;

    let res = sqlx::query("DELETE FROM watchlist_items WHERE user_id = $1 AND symbol = $2")
        .bind(&user_id)
        .bind(symbol.as_str())
        .execute(pool)
        .await
        .context("delete watchlist_items failed")?;

    Ok(if res.rows_affected() == 0 {
        WatchlistChange::NotPresent
    } else {
        WatchlistChange::Removed
    })
}
