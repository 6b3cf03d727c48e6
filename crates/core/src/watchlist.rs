use crate::domain::stock::{BasicFinancials, Quote, WatchlistItem, WatchlistRow};
use crate::market::MarketDataClient;
use futures::future::join_all;

/// Attaches live quote and valuation data to stored watchlist items.
/// Lookups run concurrently; a failed lookup leaves its fields empty.
pub async fn enrich_watchlist(
    client: &dyn MarketDataClient,
    items: Vec<WatchlistItem>,
) -> Vec<WatchlistRow> {
    join_all(items.into_iter().map(|item| enrich_one(client, item))).await
}

async fn enrich_one(client: &dyn MarketDataClient, item: WatchlistItem) -> WatchlistRow {
    let (quote, financials) = futures::join!(
        client.quote(&item.symbol),
        client.basic_financials(&item.symbol)
    );

    let quote = quote.unwrap_or_else(|err| {
        tracing::warn!(symbol = %item.symbol, error = %format!("{err:#}"), "quote lookup failed");
        Quote::default()
    });
    let financials = financials.unwrap_or_else(|err| {
        tracing::warn!(symbol = %item.symbol, error = %format!("{err:#}"), "metric lookup failed");
        BasicFinancials::default()
    });

    // Finnhub reports 0 for symbols it cannot price.
    let current_price = quote.current.filter(|p| *p > 0.0);
    let change_percent = current_price.and(quote.change_percent);

    WatchlistRow {
        symbol: item.symbol,
        company: item.company,
        added_at: item.added_at,
        current_price,
        change_percent,
        price_formatted: current_price.map(format_price),
        change_formatted: change_percent.map(format_change_percent),
        market_cap: financials.market_cap_millions.and_then(format_market_cap_millions),
        pe_ratio: financials
            .pe_ratio
            .filter(|pe| pe.is_finite() && *pe > 0.0)
            .map(|pe| format!("{pe:.1}")),
    }
}

/// `1234.5` → `$1,234.50`
pub fn format_price(price: f64) -> String {
    let cents = (price.abs() * 100.0).round() as u64;
    let whole = group_thousands(cents / 100);
    let sign = if price < 0.0 { "-" } else { "" };
    format!("{sign}${whole}.{:02}", cents % 100)
}

/// `1.234` → `+1.23%`
pub fn format_change_percent(change: f64) -> String {
    if change > 0.0 {
        format!("+{change:.2}%")
    } else {
        format!("{change:.2}%")
    }
}

/// Input is in millions. `2_950_000.0` → `$2.95T`
pub fn format_market_cap_millions(millions: f64) -> Option<String> {
    if !millions.is_finite() || millions <= 0.0 {
        return None;
    }
    let value = millions * 1_000_000.0;
    Some(if value >= 1e12 {
        format!("${:.2}T", value / 1e12)
    } else if value >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else {
        format!("${value:.2}")
    })
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::symbol::Symbol;
    use crate::market::fake::FakeMarket;
    use chrono::{TimeZone, Utc};

    #[test]
    fn formats_prices_with_grouping() {
        assert_eq!(format_price(1234.5), "$1,234.50");
        assert_eq!(format_price(0.994), "$0.99");
        assert_eq!(format_price(1_000_000.0), "$1,000,000.00");
    }

    #[test]
    fn formats_change_with_sign() {
        assert_eq!(format_change_percent(1.234), "+1.23%");
        assert_eq!(format_change_percent(-0.5), "-0.50%");
        assert_eq!(format_change_percent(0.0), "0.00%");
    }

    #[test]
    fn formats_market_cap_units() {
        assert_eq!(format_market_cap_millions(2_950_000.0).as_deref(), Some("$2.95T"));
        assert_eq!(format_market_cap_millions(12_500.0).as_deref(), Some("$12.50B"));
        assert_eq!(format_market_cap_millions(850.0).as_deref(), Some("$850.00M"));
        assert_eq!(format_market_cap_millions(0.0), None);
    }

    #[tokio::test]
    async fn failed_lookups_leave_fields_empty() {
        let mut market = FakeMarket::new();
        market.quotes.insert(
            "AAPL".to_string(),
            Quote {
                current: Some(190.5),
                change_percent: Some(-1.2),
            },
        );
        market.financials.insert(
            "AAPL".to_string(),
            BasicFinancials {
                pe_ratio: Some(29.44),
                market_cap_millions: Some(2_950_000.0),
            },
        );

        let added_at = Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap();
        let items = vec![
            WatchlistItem {
                user_id: "u1".to_string(),
                symbol: Symbol::parse("AAPL").unwrap(),
                company: "Apple Inc".to_string(),
                added_at,
            },
            WatchlistItem {
                user_id: "u1".to_string(),
                symbol: Symbol::parse("ZZZZ").unwrap(),
                company: "Unknown".to_string(),
                added_at,
            },
        ];

        let rows = enrich_watchlist(&market, items).await;

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].price_formatted.as_deref(), Some("$190.50"));
        assert_eq!(rows[0].change_formatted.as_deref(), Some("-1.20%"));
        assert_eq!(rows[0].market_cap.as_deref(), Some("$2.95T"));
        assert_eq!(rows[0].pe_ratio.as_deref(), Some("29.4"));
        assert_eq!(rows[1].symbol.as_str(), "ZZZZ");
        assert!(rows[1].current_price.is_none());
        assert!(rows[1].market_cap.is_none());
    }
}
