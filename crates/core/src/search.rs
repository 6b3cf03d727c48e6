use crate::domain::stock::{SearchCandidate, StockSearchResult};
use crate::domain::symbol::Symbol;
use crate::market::MarketDataClient;
use anyhow::Result;
use futures::future::join_all;
use std::collections::HashSet;

pub const MAX_RESULTS: usize = 15;
const POPULAR_LOOKUPS: usize = 10;
const DEFAULT_EXCHANGE: &str = "US";
const DEFAULT_KIND: &str = "Stock";

/// Shown when the search box is empty.
pub const POPULAR_STOCK_SYMBOLS: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA", "NFLX", "ORCL", "CRM", "ADBE",
    "INTC", "AMD", "PYPL", "UBER", "ZOOM", "SPOT", "SQ", "SHOP", "ROKU",
];

/// Never fails: provider or configuration problems are logged and yield an empty list.
/// `watchlist` marks results the caller already follows.
pub async fn search_stocks(
    client: &dyn MarketDataClient,
    query: Option<&str>,
    watchlist: &[Symbol],
) -> Vec<StockSearchResult> {
    if !client.has_credential() {
        tracing::error!(
            provider = client.provider_name(),
            "market data API key is not configured; stock search disabled"
        );
        return Vec::new();
    }

    let query = query.map(str::trim).unwrap_or_default();
    let candidates = if query.is_empty() {
        Ok(popular_candidates(client).await)
    } else {
        query_candidates(client, query).await
    };

    match candidates {
        Ok(candidates) => project(candidates, watchlist),
        Err(err) => {
            tracing::error!(query, error = %format!("{err:#}"), "stock search failed");
            Vec::new()
        }
    }
}

async fn popular_candidates(client: &dyn MarketDataClient) -> Vec<SearchCandidate> {
    let lookups = POPULAR_STOCK_SYMBOLS
        .iter()
        .take(POPULAR_LOOKUPS)
        .filter_map(|s| Symbol::parse(s))
        .map(|symbol| async move {
            match client.company_profile(&symbol).await {
                Ok(profile) => (symbol, profile),
                Err(err) => {
                    tracing::warn!(%symbol, error = %format!("{err:#}"), "profile lookup failed");
                    (symbol, None)
                }
            }
        });

    join_all(lookups)
        .await
        .into_iter()
        .filter_map(|(symbol, profile)| {
            let profile = profile?;
            let name = non_blank(profile.name).or_else(|| non_blank(profile.ticker))?;
            Some(SearchCandidate {
                symbol: symbol.to_string(),
                description: name,
                display_symbol: None,
                kind: Some("Common Stock".to_string()),
                profile_exchange: non_blank(profile.exchange),
            })
        })
        .collect()
}

async fn query_candidates(
    client: &dyn MarketDataClient,
    query: &str,
) -> Result<Vec<SearchCandidate>> {
    let matches = client.search_symbols(query).await?;
    Ok(matches
        .into_iter()
        .map(|m| SearchCandidate {
            symbol: m.symbol,
            description: m.description,
            display_symbol: m.display_symbol,
            kind: m.kind,
            profile_exchange: None,
        })
        .collect())
}

fn project(candidates: Vec<SearchCandidate>, watchlist: &[Symbol]) -> Vec<StockSearchResult> {
    let followed: HashSet<&str> = watchlist.iter().map(Symbol::as_str).collect();

    candidates
        .into_iter()
        .filter_map(|c| {
            let symbol = c.symbol.trim().to_uppercase();
            if symbol.is_empty() {
                return None;
            }
            let name = non_blank(Some(c.description)).unwrap_or_else(|| symbol.clone());
            let exchange = non_blank(c.display_symbol)
                .or(c.profile_exchange)
                .unwrap_or_else(|| DEFAULT_EXCHANGE.to_string());
            let kind = non_blank(c.kind).unwrap_or_else(|| DEFAULT_KIND.to_string());
            let is_in_watchlist = followed.contains(symbol.as_str());
            Some(StockSearchResult {
                symbol,
                name,
                exchange,
                kind,
                is_in_watchlist,
            })
        })
        .take(MAX_RESULTS)
        .collect()
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
