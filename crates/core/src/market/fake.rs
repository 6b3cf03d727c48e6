//! In-memory market data used by unit tests.

use crate::domain::news::RawArticle;
use crate::domain::stock::{BasicFinancials, CompanyProfile, Quote, SymbolMatch};
use crate::domain::symbol::Symbol;
use crate::market::MarketDataClient;
use crate::time::DateWindow;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeMarket {
    pub credential: bool,
    pub company_news: HashMap<String, Result<Vec<RawArticle>, String>>,
    pub general_news: Option<Result<Vec<RawArticle>, String>>,
    pub search: Option<Result<Vec<SymbolMatch>, String>>,
    pub profiles: HashMap<String, Result<Option<CompanyProfile>, String>>,
    pub quotes: HashMap<String, Quote>,
    pub financials: HashMap<String, BasicFinancials>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeMarket {
    pub fn new() -> Self {
        Self {
            credential: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn article(id: i64, datetime: i64) -> RawArticle {
    RawArticle {
        id: Some(id),
        headline: Some(format!("Headline {id}")),
        summary: Some(format!("Summary {id}")),
        source: Some("Newswire".to_string()),
        url: Some(format!("https://news.example.com/{id}")),
        datetime: Some(datetime),
        category: Some("top news".to_string()),
        related: None,
        image: None,
    }
}

#[async_trait::async_trait]
impl MarketDataClient for FakeMarket {
    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn has_credential(&self) -> bool {
        self.credential
    }

    async fn company_news(&self, symbol: &Symbol, _window: DateWindow) -> Result<Vec<RawArticle>> {
        self.record(format!("company_news:{symbol}"));
        match self.company_news.get(symbol.as_str()) {
            Some(Ok(v)) => Ok(v.clone()),
            Some(Err(e)) => Err(anyhow!(e.clone())),
            None => Ok(Vec::new()),
        }
    }

    async fn general_news(&self) -> Result<Vec<RawArticle>> {
        self.record("general_news".to_string());
        match &self.general_news {
            Some(Ok(v)) => Ok(v.clone()),
            Some(Err(e)) => Err(anyhow!(e.clone())),
            None => Ok(Vec::new()),
        }
    }

    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolMatch>> {
        self.record(format!("search:{query}"));
        match &self.search {
            Some(Ok(v)) => Ok(v.clone()),
            Some(Err(e)) => Err(anyhow!(e.clone())),
            None => Ok(Vec::new()),
        }
    }

    async fn company_profile(&self, symbol: &Symbol) -> Result<Option<CompanyProfile>> {
        self.record(format!("profile:{symbol}"));
        match self.profiles.get(symbol.as_str()) {
            Some(Ok(v)) => Ok(v.clone()),
            Some(Err(e)) => Err(anyhow!(e.clone())),
            None => Ok(None),
        }
    }

    async fn quote(&self, symbol: &Symbol) -> Result<Quote> {
        self.record(format!("quote:{symbol}"));
        self.quotes
            .get(symbol.as_str())
            .copied()
            .ok_or_else(|| anyhow!("no quote for {symbol}"))
    }

    async fn basic_financials(&self, symbol: &Symbol) -> Result<BasicFinancials> {
        self.record(format!("metric:{symbol}"));
        self.financials
            .get(symbol.as_str())
            .copied()
            .ok_or_else(|| anyhow!("no metrics for {symbol}"))
    }
}
