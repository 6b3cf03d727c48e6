pub mod error;
#[cfg(test)]
pub(crate) mod fake;
pub mod finnhub;

use crate::domain::news::RawArticle;
use crate::domain::stock::{BasicFinancials, CompanyProfile, Quote, SymbolMatch};
use crate::domain::symbol::Symbol;
use crate::time::DateWindow;
use anyhow::Result;

/// Market-data endpoints the app consumes. One request per call; implementations do not retry.
#[async_trait::async_trait]
pub trait MarketDataClient: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Whether an API credential is configured.
    fn has_credential(&self) -> bool;

    async fn company_news(&self, symbol: &Symbol, window: DateWindow) -> Result<Vec<RawArticle>>;

    async fn general_news(&self) -> Result<Vec<RawArticle>>;

    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolMatch>>;

    /// `Ok(None)` when the provider knows nothing about the symbol.
    async fn company_profile(&self, symbol: &Symbol) -> Result<Option<CompanyProfile>>;

    async fn quote(&self, symbol: &Symbol) -> Result<Quote>;

    async fn basic_financials(&self, symbol: &Symbol) -> Result<BasicFinancials>;
}
