//! Asynchronous notification delivery pipeline.
//!
//! Consumes order events from a durable AMQP queue, maps each to an
//! outbound email, and acknowledges based on the delivery outcome.
//! At-least-once from the broker's point of view; messages that cannot
//! succeed (poison bodies, permanently failing sends) are rejected
//! without requeue and age out to the dead-letter exchange.

mod consumer;
mod message;
mod processor;
mod reconnect;
mod sender;

pub use consumer::NotificationConsumer;
pub use message::{DeliveryOutcome, EmailMessage, MissingField};
pub use processor::{Disposition, MessageProcessor};
pub use reconnect::{ReconnectPolicy, ReconnectSchedule};
pub use sender::{EmailSender, MailgunSender};
