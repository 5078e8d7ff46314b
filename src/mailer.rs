//! Outbound email transport.
//!
//! Delivery goes through an HTTP mail gateway (`MAIL_API_URL`); when no
//! gateway is configured the message is logged and dropped, which keeps
//! local development working without credentials.

use serde_json::json;

#[derive(Clone)]
pub struct Mailer {
    client: reqwest::Client,
    api_url: Option<String>,
    from: String,
}

impl Mailer {
    pub fn new(api_url: Option<String>, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            from,
        }
    }

    pub async fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<(), String> {
        let Some(api_url) = &self.api_url else {
            tracing::info!(
                "📭 No mail gateway configured, dropping email to {}: {}",
                recipient,
                subject
            );
            return Ok(());
        };

        let res = self
            .client
            .post(api_url)
            .json(&json!({
                "from": self.from,
                "to": recipient,
                "subject": subject,
                "text": body,
            }))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if res.status().is_success() {
            tracing::info!("✉️ Email sent to {}: {}", recipient, subject);
            Ok(())
        } else {
            Err(format!("mail gateway returned status {}", res.status()))
        }
    }
}
