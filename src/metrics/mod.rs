//! Prometheus metrics for the commerce services:
//! - Notification pipeline (emails sent/failed, rejected messages, reconnects)
//! - Payment adapter (orders created/executed)
//! - Credential store (users created)

use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "commerce";

lazy_static! {
    /// Emails accepted by the provider (2xx responses)
    pub static ref EMAILS_SENT_TOTAL: IntCounter = register_int_counter!(
        format!("{}_emails_sent_total", METRIC_PREFIX),
        "Emails accepted by the email provider"
    ).unwrap();

    /// Failed deliveries by reason: "api" (non-2xx), "network" (unreachable/timeout)
    pub static ref EMAILS_FAILED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_emails_failed_total", METRIC_PREFIX),
        "Email deliveries that did not result in a 2xx provider response",
        &["reason"]
    ).unwrap();

    /// Queue messages rejected without requeue, by reason:
    /// "undecodable" (poison body), "invalid" (missing required field)
    pub static ref MESSAGES_REJECTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_messages_rejected_total", METRIC_PREFIX),
        "Queue messages negatively acknowledged without requeue",
        &["reason"]
    ).unwrap();

    /// Broker connection attempts that failed and triggered the reconnect schedule
    pub static ref BROKER_RECONNECTS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_broker_reconnects_total", METRIC_PREFIX),
        "Broker connection failures that triggered a reconnect"
    ).unwrap();

    /// Orders created against the payment provider
    pub static ref ORDERS_CREATED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_orders_created_total", METRIC_PREFIX),
        "Orders created against the payment provider"
    ).unwrap();

    /// Orders finalized (charged) against the payment provider
    pub static ref ORDERS_EXECUTED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_orders_executed_total", METRIC_PREFIX),
        "Orders executed against the payment provider"
    ).unwrap();

    /// Successful registrations
    pub static ref USERS_CREATED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_users_created_total", METRIC_PREFIX),
        "Credential records created"
    ).unwrap();
}

/// Encode all registered metrics in the Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let before = EMAILS_SENT_TOTAL.get();
        EMAILS_SENT_TOTAL.inc();
        assert_eq!(EMAILS_SENT_TOTAL.get(), before + 1);
    }

    #[test]
    fn encode_produces_text_format() {
        EMAILS_FAILED_TOTAL.with_label_values(&["api"]).inc();
        let text = encode_metrics().unwrap();
        assert!(text.contains("commerce_emails_failed_total"));
    }
}
