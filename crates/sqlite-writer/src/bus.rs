//! NATS client for the request topic.
//!
//! The writer holds exactly one bus connection, opened at startup and
//! turned into a message stream once the topic is subscribed. Publishing
//! (used by the `publish` subcommand) goes through a separate short-lived
//! client.

use crate::error::WriterResult;
use async_nats::{Client, ConnectOptions, Subscriber};
use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Client name reported to the NATS server.
const CLIENT_NAME: &str = "sqlite-writer";

/// A message delivered on a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    /// The subject it arrived on.
    pub topic: String,
    /// Raw message body.
    pub payload: Vec<u8>,
}

impl BusMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

impl From<async_nats::Message> for BusMessage {
    fn from(msg: async_nats::Message) -> Self {
        Self {
            topic: msg.subject.to_string(),
            payload: msg.payload.to_vec(),
        }
    }
}

/// Anything that yields bus messages until it is closed.
#[async_trait]
pub trait MessageSource: Send {
    /// The next message, or `None` once no more will arrive.
    ///
    /// Must be cancel safe: dropping the future loses no message.
    async fn next_message(&mut self) -> Option<BusMessage>;
}

/// An open, not yet subscribed, bus connection.
pub struct BusConnection {
    client: Client,
}

impl BusConnection {
    /// Connect to the bus. Fails if the server cannot be reached.
    ///
    /// After the first successful connect the client reconnects on its
    /// own; a dropped server does not end the subscription.
    pub async fn connect(url: &str) -> WriterResult<Self> {
        let client = ConnectOptions::new().name(CLIENT_NAME).connect(url).await?;

        info!(nats_url = %redact_url(url), "Connected to NATS");
        Ok(Self { client })
    }

    /// Subscribe to `topic`, consuming the connection.
    pub async fn subscribe(self, topic: &str) -> WriterResult<Subscription> {
        let subscriber = self.client.subscribe(topic.to_string()).await?;
        info!(topic = %topic, "Subscribed to topic");

        Ok(Subscription {
            _client: self.client,
            subscriber,
        })
    }
}

/// Live subscription to a single topic.
pub struct Subscription {
    // Held so the connection outlives the subscriber.
    _client: Client,
    subscriber: Subscriber,
}

#[async_trait]
impl MessageSource for Subscription {
    async fn next_message(&mut self) -> Option<BusMessage> {
        let msg = self.subscriber.next().await?;
        let message = BusMessage::from(msg);
        debug!(
            topic = %message.topic,
            payload_len = message.payload.len(),
            "Received message"
        );
        Some(message)
    }
}

#[async_trait]
impl MessageSource for mpsc::Receiver<BusMessage> {
    async fn next_message(&mut self) -> Option<BusMessage> {
        self.recv().await
    }
}

#[async_trait]
impl MessageSource for mpsc::UnboundedReceiver<BusMessage> {
    async fn next_message(&mut self) -> Option<BusMessage> {
        self.recv().await
    }
}

/// Publish one payload to `topic` and wait until the server has it.
pub async fn publish(url: &str, topic: &str, payload: Vec<u8>) -> WriterResult<()> {
    let client = ConnectOptions::new().name(CLIENT_NAME).connect(url).await?;

    let payload_len = payload.len();
    client.publish(topic.to_string(), payload.into()).await?;
    client.flush().await?;

    debug!(topic = %topic, payload_len, "Published message");
    Ok(())
}

/// Hide the password part of a bus URL for logging.
pub fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    match rest.rsplit_once('@') {
        Some((credentials, host)) => {
            let user = credentials.split(':').next().unwrap_or_default();
            if credentials.contains(':') {
                format!("{scheme}://{user}:***@{host}")
            } else {
                format!("{scheme}://{user}@{host}")
            }
        }
        None => url.to_string(),
    }
}
