pub mod anthropic;
pub mod error;
pub mod prompts;
pub mod text;

#[derive(Debug, Clone)]
pub struct GenerateInput {
    /// Short label for logs and diagnostics, e.g. `news-summary`.
    pub purpose: &'static str,
    pub prompt: String,
}

#[derive(Debug, Clone)]
pub enum Provider {
    Anthropic,
}

#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> Provider;

    /// Plain text completion with Markdown fences stripped. May be empty.
    async fn generate_text(&self, input: GenerateInput) -> anyhow::Result<String>;
}
