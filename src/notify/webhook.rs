use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;

use super::{NotificationSink, PayloadStyle};
use crate::error::{MonitorError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn build_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()
}

/// A chat webhook reached with a single JSON POST.
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
    style: PayloadStyle,
    name: String,
}

impl WebhookSink {
    pub fn new(client: reqwest::Client, url: impl Into<String>, style: PayloadStyle) -> Self {
        Self {
            client,
            url: url.into(),
            style,
            name: style.to_string(),
        }
    }

    fn failure(&self, reason: impl Into<String>) -> MonitorError {
        MonitorError::DeliveryFailed {
            sink: self.name.clone(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self) -> bool {
        !self.url.trim().is_empty()
    }

    async fn deliver(&self, message: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(self.style.envelope(message))
            .send()
            .await
            .map_err(|e| self.failure(e.to_string()))?;

        let status = response.status();
        if status.as_u16() != self.style.expected_status() {
            return Err(self.failure(format!("unexpected response status {}", status)));
        }

        debug!("{} webhook answered {}", self.name, status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Dispatcher;
    use mockito::Matcher;
    use serde_json::json;
    use std::sync::Arc;

    fn sink(server: &mockito::ServerGuard, style: PayloadStyle) -> WebhookSink {
        WebhookSink::new(
            build_client().unwrap(),
            format!("{}/hook", server.url()),
            style,
        )
    }

    #[tokio::test]
    async fn discord_posts_content_and_expects_204() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({ "content": "New container started: x" })))
            .with_status(204)
            .expect(1)
            .create_async()
            .await;

        let result = sink(&server, PayloadStyle::Discord)
            .deliver("New container started: x")
            .await;

        assert!(result.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn google_chat_posts_text_and_expects_200() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_body(Matcher::Json(json!({ "text": "Removed container: y" })))
            .with_status(200)
            .create_async()
            .await;

        let result = sink(&server, PayloadStyle::GoogleChat)
            .deliver("Removed container: y")
            .await;

        assert!(result.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unexpected_status_is_a_delivery_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/hook")
            .with_status(200)
            .create_async()
            .await;

        let result = sink(&server, PayloadStyle::Discord).deliver("x").await;

        assert!(matches!(
            result,
            Err(MonitorError::DeliveryFailed { ref sink, .. }) if sink == "discord"
        ));
    }

    #[tokio::test]
    async fn escaped_message_reaches_the_endpoint_intact() {
        let name = r#"we"ird\name"#;
        let message = crate::format::escape(name);

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_body(Matcher::Json(json!({ "text": name })))
            .with_status(200)
            .create_async()
            .await;

        sink(&server, PayloadStyle::GoogleChat)
            .deliver(&message)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[test]
    fn empty_url_disables_sink() {
        let sink = WebhookSink::new(build_client().unwrap(), "", PayloadStyle::Discord);
        assert!(!sink.is_enabled());
    }

    #[tokio::test]
    async fn dispatcher_skips_empty_url_and_serves_the_rest() {
        let mut server = mockito::Server::new_async().await;
        let bad = server
            .mock("POST", "/broken")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;
        let good = server
            .mock("POST", "/hook")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let client = build_client().unwrap();
        let sinks: Vec<Arc<dyn NotificationSink>> = vec![
            Arc::new(WebhookSink::new(client.clone(), "", PayloadStyle::Discord)),
            Arc::new(WebhookSink::new(
                client.clone(),
                format!("{}/broken", server.url()),
                PayloadStyle::Discord,
            )),
            Arc::new(WebhookSink::new(
                client,
                format!("{}/hook", server.url()),
                PayloadStyle::GoogleChat,
            )),
        ];
        let dispatcher = Dispatcher::new(sinks);
        assert_eq!(dispatcher.sink_count(), 2);

        dispatcher.notify("hello".into()).await.unwrap();

        bad.assert_async().await;
        good.assert_async().await;
    }
}
