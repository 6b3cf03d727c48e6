use crate::domain::symbol::Symbol;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of a provider symbol search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolMatch {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "displaySymbol")]
    pub display_symbol: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Quote {
    /// Current price.
    #[serde(default, rename = "c")]
    pub current: Option<f64>,
    /// Percent change since previous close.
    #[serde(default, rename = "dp")]
    pub change_percent: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BasicFinancials {
    pub pe_ratio: Option<f64>,
    pub market_cap_millions: Option<f64>,
}

/// Intermediate record between a provider lookup and [`StockSearchResult`].
#[derive(Debug, Clone)]
pub struct SearchCandidate {
    pub symbol: String,
    pub description: String,
    pub display_symbol: Option<String>,
    pub kind: Option<String>,
    pub profile_exchange: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSearchResult {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_in_watchlist: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistItem {
    pub user_id: String,
    pub symbol: Symbol,
    pub company: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WatchlistRow {
    pub symbol: Symbol,
    pub company: String,
    pub added_at: DateTime<Utc>,
    pub current_price: Option<f64>,
    pub change_percent: Option<f64>,
    pub price_formatted: Option<String>,
    pub change_formatted: Option<String>,
    pub market_cap: Option<String>,
    pub pe_ratio: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchlistChange {
    Added,
    AlreadyPresent,
    Removed,
    NotPresent,
}
