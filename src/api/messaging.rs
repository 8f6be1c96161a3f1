//! Cross-server messaging.

use reqwest::RequestBuilder;
use serde::Serialize;

use crate::error::Result;
use crate::transport::Transport;

#[derive(Debug, Serialize)]
struct PublishBody<'m> {
    message: &'m str,
}

#[derive(Clone, Copy)]
pub struct Messaging<'a> {
    transport: &'a Transport,
}

impl<'a> Messaging<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    fn publish_request(&self, topic: &str, message: &str) -> RequestBuilder {
        let path = format!(
            "messaging-service/v1/universes/{}/topics/{topic}",
            self.transport.config().universe_id
        );
        self.transport.post(&path).json(&PublishBody { message })
    }

    /// Publishes `message` to every live server subscribed to `topic`.
    ///
    /// Topics may only contain alphanumeric characters. That is left to the server to enforce.
    pub async fn publish(&self, topic: &str, message: &str) -> Result<()> {
        self.transport
            .send_empty(self.publish_request(topic, message))
            .await
    }
}
