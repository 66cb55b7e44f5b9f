//! End-to-end tests for the notification delivery pipeline against a
//! mocked email provider.

use std::sync::Arc;

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use commerce_services::config::MailgunConfig;
use commerce_services::notifier::{Disposition, MailgunSender, MessageProcessor};

fn mailgun_config(server: &MockServer) -> MailgunConfig {
    MailgunConfig {
        api_key: "test-key".to_string(),
        domain: "mg.example.com".to_string(),
        base_url: server.uri(),
        ..Default::default()
    }
}

fn processor_for(server: &MockServer) -> MessageProcessor {
    let sender = MailgunSender::new(mailgun_config(server)).expect("sender");
    MessageProcessor::new(Arc::new(sender))
}

#[tokio::test]
async fn valid_message_sends_one_email_and_acks() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mg.example.com/messages"))
        // `from` defaulted by the pipeline
        .and(body_string_contains("noreply%40mg.example.com"))
        .and(body_string_contains("to=a%40b.com"))
        .and(body_string_contains("subject=Order+%231"))
        .and(body_string_contains("text=Thanks"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let processor = processor_for(&server);
    let body = br#"{"to":"a@b.com","subject":"Order #1","text":"Thanks"}"#;

    let disposition = processor.process(body, "notification.order").await;
    assert_eq!(disposition, Disposition::Ack);
}

#[tokio::test]
async fn missing_required_field_never_calls_the_provider() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let processor = processor_for(&server);
    let body = br#"{"subject":"Order #1","text":"Thanks"}"#;

    let disposition = processor.process(body, "notification.order").await;
    assert_eq!(disposition, Disposition::Reject);
}

#[tokio::test]
async fn poison_body_never_calls_the_provider() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let processor = processor_for(&server);

    let disposition = processor.process(b"{{{{ not json", "notification.order").await;
    assert_eq!(disposition, Disposition::Reject);
}

#[tokio::test]
async fn provider_rejection_results_in_reject_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mg.example.com/messages"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let processor = processor_for(&server);
    let body = br#"{"to":"a@b.com","subject":"Order #1","text":"Thanks"}"#;

    let disposition = processor.process(body, "notification.order").await;
    assert_eq!(disposition, Disposition::Reject);
}

#[tokio::test]
async fn optional_fields_pass_through_when_present() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mg.example.com/messages"))
        .and(body_string_contains("html="))
        .and(body_string_contains("cc=ops%40b.com"))
        .and(body_string_contains("bcc=audit%40b.com"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let processor = processor_for(&server);
    let body = br#"{
        "to": "a@b.com",
        "subject": "Order #1",
        "text": "Thanks",
        "html": "<p>Thanks</p>",
        "cc": "ops@b.com",
        "bcc": "audit@b.com",
        "bookingID": "BK-42"
    }"#;

    let disposition = processor.process(body, "notification.booking").await;
    assert_eq!(disposition, Disposition::Ack);
}
