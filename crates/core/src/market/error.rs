use reqwest::StatusCode;
use std::fmt;

/// Non-2xx response from the market-data provider.
#[derive(Debug, Clone)]
pub struct MarketDataHttpError {
    pub endpoint: &'static str,
    pub status: StatusCode,
    pub body: String,
}

impl fmt::Display for MarketDataHttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "market data HTTP error (endpoint={}, status={})",
            self.endpoint, self.status
        )
    }
}

impl std::error::Error for MarketDataHttpError {}
