use crate::config::Settings;
use crate::domain::news::RawArticle;
use crate::domain::stock::{BasicFinancials, CompanyProfile, Quote, SymbolMatch};
use crate::domain::symbol::Symbol;
use crate::market::error::MarketDataHttpError;
use crate::market::MarketDataClient;
use crate::time::DateWindow;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct FinnhubClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<SymbolMatch>,
}

#[derive(Debug, Deserialize)]
struct MetricResponse {
    #[serde(default)]
    metric: HashMap<String, Value>,
}

impl FinnhubClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout_secs = std::env::var("FINNHUB_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::new(
            settings.finnhub_base_url(),
            settings.finnhub_api_key.clone(),
            Duration::from_secs(timeout_secs),
        )
    }

    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build finnhub http client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let mut req = self.http.get(self.url(endpoint)).query(query);
        if let Some(token) = &self.api_key {
            req = req.query(&[("token", token.as_str())]);
        }

        let res = req
            .send()
            .await
            .with_context(|| format!("finnhub request failed (endpoint={endpoint})"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .with_context(|| format!("failed to read finnhub response (endpoint={endpoint})"))?;

        if !status.is_success() {
            return Err(MarketDataHttpError {
                endpoint,
                status,
                body: text,
            }
            .into());
        }

        serde_json::from_str::<T>(&text)
            .with_context(|| format!("unexpected finnhub response shape (endpoint={endpoint}): {text}"))
    }
}

#[async_trait::async_trait]
impl MarketDataClient for FinnhubClient {
    fn provider_name(&self) -> &'static str {
        "finnhub"
    }

    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn company_news(&self, symbol: &Symbol, window: DateWindow) -> Result<Vec<RawArticle>> {
        let from = window.from_param();
        let to = window.to_param();
        self.get_json(
            "company-news",
            &[("symbol", symbol.as_str()), ("from", from.as_str()), ("to", to.as_str())],
        )
        .await
    }

    async fn general_news(&self) -> Result<Vec<RawArticle>> {
        self.get_json("news", &[("category", "general")]).await
    }

    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolMatch>> {
        let res: SearchResponse = self.get_json("search", &[("q", query)]).await?;
        Ok(res.result)
    }

    async fn company_profile(&self, symbol: &Symbol) -> Result<Option<CompanyProfile>> {
        // Unknown symbols come back as `{}`.
        let raw: Value = self
            .get_json("stock/profile2", &[("symbol", symbol.as_str())])
            .await?;
        if raw.as_object().map_or(true, |o| o.is_empty()) {
            return Ok(None);
        }
        let profile = serde_json::from_value::<CompanyProfile>(raw)
            .context("failed to decode finnhub profile")?;
        Ok(Some(profile))
    }

    async fn quote(&self, symbol: &Symbol) -> Result<Quote> {
        self.get_json("quote", &[("symbol", symbol.as_str())]).await
    }

    async fn basic_financials(&self, symbol: &Symbol) -> Result<BasicFinancials> {
        let res: MetricResponse = self
            .get_json("stock/metric", &[("symbol", symbol.as_str()), ("metric", "all")])
            .await?;
        Ok(financials_from_metric(&res.metric))
    }
}

fn financials_from_metric(metric: &HashMap<String, Value>) -> BasicFinancials {
    let number = |key: &str| metric.get(key).and_then(Value::as_f64);
    BasicFinancials {
        pe_ratio: number("peTTM").or_else(|| number("peBasicExclExtraTTM")),
        market_cap_millions: number("marketCapitalization"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metric_falls_back_to_basic_pe() {
        let metric: HashMap<String, Value> = serde_json::from_value(json!({
            "peBasicExclExtraTTM": 31.5,
            "marketCapitalization": 2_950_000.0,
            "52WeekHigh": "n/a",
        }))
        .unwrap();
        let f = financials_from_metric(&metric);
        assert_eq!(f.pe_ratio, Some(31.5));
        assert_eq!(f.market_cap_millions, Some(2_950_000.0));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let client =
            FinnhubClient::new("http://localhost:1/api/v1/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(client.url("/news"), "http://localhost:1/api/v1/news");
        assert!(!client.has_credential());
    }
}
