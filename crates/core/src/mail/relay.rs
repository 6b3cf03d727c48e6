use crate::config::Settings;
use crate::mail::{Mailer, OutgoingEmail};
use anyhow::Context;
use serde::Serialize;
use std::time::Duration;

const DEFAULT_FROM: &str = "Signalist <no-reply@signalist.app>";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Hands messages to a transactional email relay over HTTP (`POST` JSON, bearer auth).
#[derive(Debug, Clone)]
pub struct HttpMailer {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
    from: String,
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl HttpMailer {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let url = settings.require_mail_api_url()?.to_string();
        let timeout_secs = std::env::var("MAIL_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build mail relay http client")?;

        Ok(Self {
            http,
            url,
            api_key: settings.mail_api_key.clone(),
            from: settings
                .mail_from
                .clone()
                .unwrap_or_else(|| DEFAULT_FROM.to_string()),
        })
    }
}

#[async_trait::async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: OutgoingEmail) -> anyhow::Result<()> {
        let body = RelayRequest {
            from: &self.from,
            to: [email.to.as_str()],
            subject: &email.subject,
            html: &email.html,
        };

        let mut req = self.http.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let res = req.send().await.context("mail relay request failed")?;
        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            anyhow::bail!("mail relay HTTP {status}: {text}");
        }

        tracing::debug!(to = %email.to, subject = %email.subject, "email handed to relay");
        Ok(())
    }
}
