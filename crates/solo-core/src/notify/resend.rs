//! Resend integration -- deliver notification emails over HTTP.

use reqwest::Client;
use serde_json::json;

use crate::storage::Config;

use super::emails;
use super::{Mailer, Notification};

const RESEND_API_URL: &str = "https://api.resend.com";

/// Mailer backed by the Resend email API.
///
/// Owns a private current-thread runtime so `deliver` can be called
/// from plain synchronous code; the dispatcher worker is the only
/// caller in practice.
pub struct ResendMailer {
    api_key: String,
    from: String,
    base_url: String,
    client: Client,
    runtime: tokio::runtime::Runtime,
}

impl ResendMailer {
    /// Build a mailer from RESEND_API_KEY and the configured sender.
    /// Returns `None` when no key is set; callers fall back to the
    /// simulated mailer.
    pub fn from_env(config: &Config) -> Option<Self> {
        let api_key = std::env::var("RESEND_API_KEY").ok()?;
        if api_key.is_empty() {
            return None;
        }
        Self::new(api_key, config.notifications.from_email.clone()).ok()
    }

    pub fn new(api_key: String, from: String) -> Result<Self, Box<dyn std::error::Error>> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            api_key,
            from,
            base_url: RESEND_API_URL.to_string(),
            client: Client::new(),
            runtime,
        })
    }

    /// Point the mailer at a different API host (for tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn post_email(
        &self,
        to: &str,
        subject: &str,
        html: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let url = format!("{}/emails", self.base_url);
        let body = json!({
            "from": self.from,
            "to": to,
            "subject": subject,
            "html": html,
        });

        let resp = self.runtime.block_on(
            self.client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send(),
        )?;

        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status();
            let text = self.runtime.block_on(resp.text()).unwrap_or_default();
            Err(format!("Resend API error (HTTP {status}): {text}").into())
        }
    }
}

impl Mailer for ResendMailer {
    fn deliver(&self, notification: &Notification) -> Result<(), Box<dyn std::error::Error>> {
        let rendered = emails::render(notification);
        self.post_email(notification.to(), &rendered.subject, &rendered.html)
    }
}
