//! Inbound queue payload and delivery outcome types.

use serde_json::Value;
use thiserror::Error;

/// A required field was absent from an otherwise well-formed payload.
///
/// Kept separate from a JSON decode failure so the two reject classes
/// stay distinguishable in logs and metrics.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Missing required field: {0}")]
pub struct MissingField(pub &'static str);

/// A normalized outbound email, extracted from a queue message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub from: Option<String>,
    pub html: Option<String>,
    pub cc: Option<String>,
    pub bcc: Option<String>,
}

impl EmailMessage {
    /// Extract from a decoded JSON object. `to`, `subject` and `text`
    /// are required; everything else passes through only when present.
    pub fn from_value(value: &Value) -> Result<Self, MissingField> {
        Ok(Self {
            to: required(value, "to")?,
            subject: required(value, "subject")?,
            text: required(value, "text")?,
            from: optional(value, "from"),
            html: optional(value, "html"),
            cc: optional(value, "cc"),
            bcc: optional(value, "bcc"),
        })
    }

    /// Correlation id carried by order events, used only for logs.
    pub fn booking_id(value: &Value) -> Option<String> {
        match value.get("bookingID") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Subject truncated for log lines; body text is never logged.
    pub fn redacted_subject(&self) -> String {
        let mut summary: String = self.subject.chars().take(50).collect();
        if self.subject.chars().count() > 50 {
            summary.push_str("...");
        }
        summary
    }
}

fn required(value: &Value, field: &'static str) -> Result<String, MissingField> {
    match value.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) if !other.is_null() => Ok(other.to_string()),
        _ => Err(MissingField(field)),
    }
}

fn optional(value: &Value, field: &str) -> Option<String> {
    match value.get(field) {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Outcome of one delivery attempt against the email provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Provider accepted the message (2xx).
    Sent { status: u16 },
    /// Provider answered with a non-2xx status.
    Failed { status: u16, detail: String },
    /// Provider was unreachable (timeout, connection refused, DNS).
    TransientError { detail: String },
}

impl DeliveryOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DeliveryOutcome::Sent { .. })
    }
}
