//! Message processing: decode, validate, deliver, decide acknowledgment.
//!
//! Decoupled from broker types so the decision table can be tested
//! without a connection.

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::metrics::{EMAILS_FAILED_TOTAL, EMAILS_SENT_TOTAL, MESSAGES_REJECTED_TOTAL};

use super::message::{DeliveryOutcome, EmailMessage};
use super::sender::EmailSender;

/// What the consumer should do with the delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Positive acknowledgment, exactly once, after the send completed.
    Ack,
    /// Negative acknowledgment without requeue. The queue's dead-letter
    /// exchange quarantines the message; redelivery would fail again.
    Reject,
}

pub struct MessageProcessor {
    sender: Arc<dyn EmailSender>,
}

impl MessageProcessor {
    pub fn new(sender: Arc<dyn EmailSender>) -> Self {
        Self { sender }
    }

    /// Process one queue delivery to a disposition.
    pub async fn process(&self, body: &[u8], routing_key: &str) -> Disposition {
        let delivery_id = Uuid::new_v4();

        // Undecodable bodies are poison: redelivery cannot fix a decode
        // error, so they are rejected permanently.
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(
                    delivery_id = %delivery_id,
                    routing_key = %routing_key,
                    error = %e,
                    "Failed to decode message body"
                );
                MESSAGES_REJECTED_TOTAL
                    .with_label_values(&["undecodable"])
                    .inc();
                return Disposition::Reject;
            }
        };

        let booking_id = EmailMessage::booking_id(&value);

        let email = match EmailMessage::from_value(&value) {
            Ok(email) => email,
            Err(e) => {
                tracing::error!(
                    delivery_id = %delivery_id,
                    routing_key = %routing_key,
                    booking_id = booking_id.as_deref().unwrap_or("unknown"),
                    error = %e,
                    "Message is missing required fields"
                );
                MESSAGES_REJECTED_TOTAL
                    .with_label_values(&["invalid"])
                    .inc();
                return Disposition::Reject;
            }
        };

        tracing::info!(
            delivery_id = %delivery_id,
            routing_key = %routing_key,
            booking_id = booking_id.as_deref().unwrap_or("unknown"),
            "Processing notification"
        );

        match self.sender.send(&email).await {
            DeliveryOutcome::Sent { status } => {
                tracing::info!(
                    delivery_id = %delivery_id,
                    booking_id = booking_id.as_deref().unwrap_or("unknown"),
                    status = status,
                    "Notification sent"
                );
                EMAILS_SENT_TOTAL.inc();
                Disposition::Ack
            }
            DeliveryOutcome::Failed { status, detail } => {
                tracing::error!(
                    delivery_id = %delivery_id,
                    booking_id = booking_id.as_deref().unwrap_or("unknown"),
                    status = status,
                    detail = %detail,
                    "Email provider rejected the message"
                );
                EMAILS_FAILED_TOTAL.with_label_values(&["api"]).inc();
                Disposition::Reject
            }
            DeliveryOutcome::TransientError { detail } => {
                tracing::error!(
                    delivery_id = %delivery_id,
                    booking_id = booking_id.as_deref().unwrap_or("unknown"),
                    detail = %detail,
                    "Email provider unreachable"
                );
                EMAILS_FAILED_TOTAL.with_label_values(&["network"]).inc();
                Disposition::Reject
            }
        }
    }
}
