use crate::llm::Provider;
use std::fmt;

const RAW_EXCERPT_CHARS: usize = 300;

/// Model call failure with enough of the provider's reply to debug it from logs.
#[derive(Debug, Clone)]
pub struct LlmDiagnosticsError {
    pub provider: Provider,
    pub stage: &'static str,
    pub detail: String,
    /// Provider response body, when one was received.
    pub raw_output: Option<String>,
}

impl LlmDiagnosticsError {
    /// First few hundred chars of the provider body, whitespace collapsed.
    pub fn raw_excerpt(&self) -> Option<String> {
        let raw = self.raw_output.as_deref()?;
        let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            return None;
        }
        if collapsed.chars().count() <= RAW_EXCERPT_CHARS {
            return Some(collapsed);
        }
        let mut excerpt: String = collapsed.chars().take(RAW_EXCERPT_CHARS).collect();
        excerpt.push_str("...");
        Some(excerpt)
    }
}

impl fmt::Display for LlmDiagnosticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {} failed: {}", self.provider, self.stage, self.detail)?;
        if let Some(excerpt) = self.raw_excerpt() {
            write!(f, " (response: {excerpt})")?;
        }
        Ok(())
    }
}

impl std::error::Error for LlmDiagnosticsError {}

/// Logs a failed model call, surfacing the provider stage and response excerpt when present.
pub fn log_llm_failure(err: &anyhow::Error, purpose: &'static str, message: &'static str) {
    match err.downcast_ref::<LlmDiagnosticsError>() {
        Some(diag) => {
            let excerpt = diag.raw_excerpt().unwrap_or_default();
            tracing::error!(
                purpose,
                provider = ?diag.provider,
                stage = diag.stage,
                detail = %diag.detail,
                raw_output = %excerpt,
                "{message}"
            );
        }
        None => tracing::error!(purpose, error = %format!("{err:#}"), "{message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(raw: Option<&str>) -> LlmDiagnosticsError {
        LlmDiagnosticsError {
            provider: Provider::Anthropic,
            stage: "http",
            detail: "status=529".to_string(),
            raw_output: raw.map(str::to_string),
        }
    }

    #[test]
    fn display_includes_response_excerpt() {
        let err = diag(Some("{\"type\":\"error\",\n  \"error\":{\"type\":\"overloaded_error\"}}"));
        assert_eq!(
            err.to_string(),
            "Anthropic http failed: status=529 (response: {\"type\":\"error\", \"error\":{\"type\":\"overloaded_error\"}})"
        );
        assert_eq!(diag(None).to_string(), "Anthropic http failed: status=529");
    }

    #[test]
    fn long_bodies_are_cut() {
        let body = "x".repeat(1_000);
        let excerpt = diag(Some(&body)).raw_excerpt().unwrap();
        assert_eq!(excerpt.chars().count(), RAW_EXCERPT_CHARS + 3);
        assert!(excerpt.ends_with("..."));
        assert!(diag(Some("  \n ")).raw_excerpt().is_none());
    }
}
