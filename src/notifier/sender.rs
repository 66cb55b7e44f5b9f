//! Outbound email delivery through the Mailgun messages API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::MailgunConfig;

use super::message::{DeliveryOutcome, EmailMessage};

/// Delivery seam for the pipeline. The processor only sees outcomes,
/// so tests can substitute a recording double.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &EmailMessage) -> DeliveryOutcome;
}

/// Sends mail through Mailgun's form-encoded messages endpoint,
/// authenticated as `api:<key>`, with a bounded request timeout.
pub struct MailgunSender {
    http: Client,
    config: MailgunConfig,
}

impl MailgunSender {
    pub fn new(config: MailgunConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self { http, config })
    }

    pub fn default_from(&self) -> String {
        self.config.default_from()
    }
}

#[async_trait]
impl EmailSender for MailgunSender {
    async fn send(&self, email: &EmailMessage) -> DeliveryOutcome {
        let from = email
            .from
            .clone()
            .unwrap_or_else(|| self.config.default_from());

        // Absent optional fields are omitted from the form entirely.
        let mut form: Vec<(&str, &str)> = vec![
            ("from", from.as_str()),
            ("to", email.to.as_str()),
            ("subject", email.subject.as_str()),
            ("text", email.text.as_str()),
        ];
        if let Some(html) = &email.html {
            form.push(("html", html));
        }
        if let Some(cc) = &email.cc {
            form.push(("cc", cc));
        }
        if let Some(bcc) = &email.bcc {
            form.push(("bcc", bcc));
        }

        tracing::info!(
            to = %email.to,
            subject = %email.redacted_subject(),
            "Sending email notification"
        );

        let response = self
            .http
            .post(self.config.messages_url())
            .basic_auth("api", Some(&self.config.api_key))
            .form(&form)
            .send()
            .await;

        match response {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    DeliveryOutcome::Sent {
                        status: status.as_u16(),
                    }
                } else {
                    // Bounded summary only; the body may echo recipient content.
                    let mut detail = response.text().await.unwrap_or_default();
                    detail.truncate(200);
                    DeliveryOutcome::Failed {
                        status: status.as_u16(),
                        detail,
                    }
                }
            }
            Err(e) => DeliveryOutcome::TransientError {
                detail: e.to_string(),
            },
        }
    }
}
