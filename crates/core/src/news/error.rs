use std::fmt;

/// Total failure of a news request. The message is fixed; the cause is kept for logs.
#[derive(Debug)]
pub struct NewsFetchError {
    pub cause: anyhow::Error,
}

impl fmt::Display for NewsFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("failed to fetch news")
    }
}

impl std::error::Error for NewsFetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.cause.as_ref())
    }
}
