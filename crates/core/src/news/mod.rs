//! News aggregation over the market-data provider.
//!
//! With symbols, articles are drawn round-robin across the symbols (one per round) so a small
//! result budget still covers several tickers. Without symbols, one page of general market news
//! is deduplicated and trimmed to the same budget.

pub mod error;

use crate::domain::news::{retain_valid, ArticleOrigin, FormattedArticle, RawArticle};
use crate::domain::symbol::{normalize_symbols, Symbol};
use crate::market::MarketDataClient;
use crate::time::DateWindow;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

pub use error::NewsFetchError;

pub const MAX_ARTICLES: usize = 6;
const MAX_ROUNDS: usize = 6;
const WINDOW_DAYS: i64 = 5;

/// Returns at most [`MAX_ARTICLES`] valid articles, most recent first.
///
/// Blank entries in `symbols` are ignored; if nothing is left the general feed is used.
/// Per-symbol fetch failures only cost that round. Failure of the general feed fails the
/// whole call with [`NewsFetchError`].
pub async fn get_news<S: AsRef<str> + Sync>(
    client: &dyn MarketDataClient,
    symbols: &[S],
    today: NaiveDate,
) -> Result<Vec<FormattedArticle>> {
    let symbols = normalize_symbols(symbols);

    let res = if symbols.is_empty() {
        fetch_general_news(client).await
    } else {
        let window = DateWindow::trailing(today, WINDOW_DAYS);
        Ok(fetch_symbol_news(client, &symbols, window).await)
    };

    res.map_err(|cause| {
        tracing::error!(error = %format!("{cause:#}"), "news aggregation failed");
        NewsFetchError { cause }.into()
    })
}

async fn fetch_symbol_news(
    client: &dyn MarketDataClient,
    symbols: &[Symbol],
    window: DateWindow,
) -> Vec<FormattedArticle> {
    let mut articles_by_symbol: HashMap<&Symbol, Vec<RawArticle>> = HashMap::new();
    let mut offsets: HashMap<&Symbol, usize> = HashMap::new();
    let mut collected: Vec<FormattedArticle> = Vec::with_capacity(MAX_ARTICLES);

    for round in 0..MAX_ROUNDS {
        let symbol = &symbols[round % symbols.len()];

        if !articles_by_symbol.contains_key(symbol) {
            match client.company_news(symbol, window).await {
                Ok(articles) => {
                    articles_by_symbol.insert(symbol, retain_valid(articles));
                }
                Err(err) => {
                    tracing::warn!(
                        %symbol,
                        round,
                        error = %format!("{err:#}"),
                        "company news fetch failed; skipping round"
                    );
                    continue;
                }
            }
        }

        let Some(articles) = articles_by_symbol.get(symbol) else {
            continue;
        };
        let offset = offsets.entry(symbol).or_insert(0);
        if let Some(raw) = articles.get(*offset) {
            *offset += 1;
            let origin = ArticleOrigin::Symbol {
                symbol: symbol.clone(),
                round,
            };
            if let Some(article) = raw.format(origin) {
                collected.push(article);
            }
        }

        if collected.len() >= MAX_ARTICLES {
            break;
        }
    }

    // Stable: equal timestamps keep round-robin order.
    collected.sort_by(|a, b| b.datetime.cmp(&a.datetime));
    collected
}

async fn fetch_general_news(client: &dyn MarketDataClient) -> Result<Vec<FormattedArticle>> {
    let articles = client
        .general_news()
        .await
        .context("general news fetch failed")?;

    let mut seen: HashSet<(i64, String, String)> = HashSet::new();
    let mut unique: Vec<RawArticle> = Vec::with_capacity(MAX_ARTICLES);

    for article in articles {
        if !article.is_valid() {
            continue;
        }

        let key = (
            article.id.unwrap_or_default(),
            article.url.clone().unwrap_or_default(),
            article.headline.clone().unwrap_or_default(),
        );
        if seen.insert(key) {
            unique.push(article);
        }

        if unique.len() >= MAX_ARTICLES {
            break;
        }
    }

    // The feed is normally newest-first already; this only guards the ordering contract.
    unique.sort_by(|a, b| b.datetime.cmp(&a.datetime));

    Ok(unique
        .iter()
        .enumerate()
        .filter_map(|(ordinal, article)| article.format(ArticleOrigin::General { ordinal }))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::fake::{article, FakeMarket};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn symbol_of(a: &FormattedArticle) -> (String, usize) {
        match &a.origin {
            ArticleOrigin::Symbol { symbol, round } => (symbol.to_string(), *round),
            other => panic!("expected symbol origin, got {other:?}"),
        }
    }

    fn assert_sorted_desc(articles: &[FormattedArticle]) {
        for pair in articles.windows(2) {
            assert!(pair[0].datetime >= pair[1].datetime);
        }
    }

    #[tokio::test]
    async fn single_symbol_fills_every_round() {
        let mut market = FakeMarket::new();
        market.company_news.insert(
            "AAPL".to_string(),
            Ok((1..=8).map(|i| article(i, 1_000 + i)).collect()),
        );

        let out = get_news(&market, &["aapl", " "], today()).await.unwrap();

        assert_eq!(out.len(), 6);
        assert_sorted_desc(&out);
        let mut rounds: Vec<usize> = out.iter().map(|a| symbol_of(a).1).collect();
        rounds.sort_unstable();
        assert_eq!(rounds, vec![0, 1, 2, 3, 4, 5]);
        assert!(out.iter().all(|a| a.related == "AAPL" && a.is_valid()));
        assert_eq!(market.calls(), vec!["company_news:AAPL".to_string()]);
    }

    #[tokio::test]
    async fn two_symbols_alternate() {
        let mut market = FakeMarket::new();
        market.company_news.insert(
            "AAPL".to_string(),
            Ok((1..=4).map(|i| article(i, 100)).collect()),
        );
        market.company_news.insert(
            "MSFT".to_string(),
            Ok((11..=14).map(|i| article(i, 100)).collect()),
        );

        let out = get_news(&market, &["AAPL", "MSFT"], today()).await.unwrap();

        // Equal timestamps keep collection order.
        let picked: Vec<(String, usize)> = out.iter().map(symbol_of).collect();
        assert_eq!(
            picked,
            vec![
                ("AAPL".to_string(), 0),
                ("MSFT".to_string(), 1),
                ("AAPL".to_string(), 2),
                ("MSFT".to_string(), 3),
                ("AAPL".to_string(), 4),
                ("MSFT".to_string(), 5),
            ]
        );
        let ids: Vec<i64> = out.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 11, 2, 12, 3, 13]);
        assert_eq!(market.calls().len(), 2);
    }

    #[tokio::test]
    async fn exhausted_symbol_falls_through() {
        let mut market = FakeMarket::new();
        market
            .company_news
            .insert("AAPL".to_string(), Ok(vec![article(1, 50)]));
        market.company_news.insert(
            "MSFT".to_string(),
            Ok((11..=14).map(|i| article(i, 40 + i)).collect()),
        );

        let out = get_news(&market, &["AAPL", "MSFT"], today()).await.unwrap();

        // AAPL gives one article, MSFT gets rounds 1, 3, 5.
        assert_eq!(out.len(), 4);
        assert_sorted_desc(&out);
        assert_eq!(out.iter().filter(|a| a.related == "AAPL").count(), 1);
    }

    #[tokio::test]
    async fn invalid_company_articles_are_dropped_before_offsets() {
        let mut bad = article(2, 20);
        bad.url = None;
        let mut market = FakeMarket::new();
        market
            .company_news
            .insert("TSLA".to_string(), Ok(vec![article(1, 10), bad, article(3, 30)]));

        let out = get_news(&market, &["tsla"], today()).await.unwrap();

        let ids: Vec<i64> = out.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[tokio::test]
    async fn symbol_fetch_failure_only_skips_the_round() {
        let mut market = FakeMarket::new();
        market
            .company_news
            .insert("BAD".to_string(), Err("HTTP 500".to_string()));
        market.company_news.insert(
            "NVDA".to_string(),
            Ok((1..=5).map(|i| article(i, 10 * i)).collect()),
        );

        let out = get_news(&market, &["BAD", "NVDA"], today()).await.unwrap();

        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|a| a.related == "NVDA"));
        // Failed symbols are retried on their next round.
        let bad_calls = market
            .calls()
            .iter()
            .filter(|c| c.as_str() == "company_news:BAD")
            .count();
        assert_eq!(bad_calls, 3);
    }

    #[tokio::test]
    async fn all_symbol_fetches_failing_yields_empty_not_error() {
        let mut market = FakeMarket::new();
        market
            .company_news
            .insert("BAD".to_string(), Err("timeout".to_string()));

        let out = get_news(&market, &["bad"], today()).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn blank_symbols_use_general_feed() {
        let mut market = FakeMarket::new();
        market.general_news = Some(Ok(vec![article(1, 10)]));

        let none: [&str; 0] = [];
        let out = get_news(&market, &none, today()).await.unwrap();
        assert_eq!(out.len(), 1);

        let out = get_news(&market, &["  ", ""], today()).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(
            market.calls(),
            vec!["general_news".to_string(), "general_news".to_string()]
        );
    }

    #[tokio::test]
    async fn general_feed_is_deduplicated() {
        let mut articles: Vec<RawArticle> = (1..=10).map(|i| article(i, 1_000 - i)).collect();
        // #7 repeats #3.
        articles[6] = articles[2].clone();
        let mut market = FakeMarket::new();
        market.general_news = Some(Ok(articles));

        let none: [&str; 0] = [];
        let out = get_news(&market, &none, today()).await.unwrap();

        let ids: Vec<i64> = out.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);

        let mut keys = HashSet::new();
        for a in &out {
            assert!(keys.insert((a.id, a.url.clone(), a.headline.clone())));
        }
        let ordinals: Vec<ArticleOrigin> = out.iter().map(|a| a.origin.clone()).collect();
        assert_eq!(ordinals[0], ArticleOrigin::General { ordinal: 0 });
        assert_eq!(ordinals[5], ArticleOrigin::General { ordinal: 5 });
    }

    #[tokio::test]
    async fn out_of_order_general_feed_is_sorted_before_numbering() {
        let mut market = FakeMarket::new();
        market.general_news = Some(Ok(vec![article(1, 100), article(2, 300), article(3, 200)]));

        let none: [&str; 0] = [];
        let out = get_news(&market, &none, today()).await.unwrap();

        let ids: Vec<i64> = out.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        for (i, a) in out.iter().enumerate() {
            assert_eq!(a.origin, ArticleOrigin::General { ordinal: i });
        }
    }

    #[tokio::test]
    async fn general_duplicate_is_skipped_when_budget_needs_it() {
        let mut articles: Vec<RawArticle> = (1..=7).map(|i| article(i, 1_000 - i)).collect();
        articles[3] = articles[1].clone();
        let mut invalid = article(99, 999);
        invalid.headline = Some(String::new());
        articles.insert(0, invalid);
        let mut market = FakeMarket::new();
        market.general_news = Some(Ok(articles));

        let none: [&str; 0] = [];
        let out = get_news(&market, &none, today()).await.unwrap();

        let ids: Vec<i64> = out.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 5, 6, 7]);
        assert_sorted_desc(&out);
    }

    #[tokio::test]
    async fn general_feed_failure_is_total() {
        let mut market = FakeMarket::new();
        market.general_news = Some(Err("connection reset".to_string()));

        let none: [&str; 0] = [];
        let err = get_news(&market, &none, today()).await.unwrap_err();

        assert_eq!(err.to_string(), "failed to fetch news");
        let typed = err.downcast_ref::<NewsFetchError>().unwrap();
        assert!(format!("{:#}", typed.cause).contains("connection reset"));
    }
}
