//! Webhook notification dispatch for alert events.
//!
//! POSTs each alert message as a Discord-style `{"content": ...}` JSON body
//! to every configured destination. Failures are reported per destination,
//! never retried.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use flightwatch_core::{Result, WatchError};

/// Result of delivering one message to one destination.
pub type DeliveryOutcome = Result<()>;

/// Outbound transport for alert messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message` to every destination. Returns one outcome per
    /// destination, in destination order.
    async fn deliver(&self, message: &str, destinations: &[String]) -> Vec<DeliveryOutcome>;
}

/// Body posted to a webhook.
pub fn webhook_payload(message: &str) -> serde_json::Value {
    serde_json::json!({ "content": message })
}

/// Per-destination limit; a stalled webhook is a failed delivery.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(15);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Dispatches alert messages to webhook URLs via HTTP POST.
#[derive(Clone)]
pub struct WebhookDispatcher {
    client: reqwest::Client,
}

impl WebhookDispatcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DELIVERY_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(|e| WatchError::Config(format!("could not build HTTP client: {e}")))?;
        Ok(WebhookDispatcher { client })
    }

    async fn post(&self, url: &str, payload: &serde_json::Value) -> DeliveryOutcome {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| WatchError::Delivery {
                destination: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(destination = url, status = status.as_u16(), "webhook delivered");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(WatchError::Delivery {
            destination: url.to_string(),
            reason: format!("HTTP {status}: {body}"),
        })
    }
}

#[async_trait]
impl Notifier for WebhookDispatcher {
    async fn deliver(&self, message: &str, destinations: &[String]) -> Vec<DeliveryOutcome> {
        let payload = webhook_payload(message);
        let mut outcomes = Vec::with_capacity(destinations.len());
        for url in destinations {
            outcomes.push(self.post(url, &payload).await);
        }
        outcomes
    }
}

/// Prints messages to stdout instead of posting them (`--dry-run`).
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn deliver(&self, message: &str, destinations: &[String]) -> Vec<DeliveryOutcome> {
        println!("{message}");
        destinations.iter().map(|_| Ok(())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_payload() {
        let payload = webhook_payload("FORTE10 has left the region");
        assert_eq!(payload["content"], "FORTE10 has left the region");
        assert_eq!(payload.as_object().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_console_notifier_reports_success_per_destination() {
        let destinations = vec!["a".to_string(), "b".to_string()];
        let outcomes = ConsoleNotifier.deliver("hello", &destinations).await;
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.is_ok()));
    }

    #[tokio::test]
    async fn test_unreachable_webhook_is_delivery_error() {
        let dispatcher = WebhookDispatcher::new().unwrap();
        let destinations = vec!["http://127.0.0.1:1/hook".to_string()];
        let outcomes = dispatcher.deliver("hello", &destinations).await;

        assert_eq!(outcomes.len(), 1);
        match &outcomes[0] {
            Err(WatchError::Delivery { destination, .. }) => {
                assert_eq!(destination, "http://127.0.0.1:1/hook")
            }
            other => panic!("expected delivery error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stalled_webhook_times_out_and_others_still_tried() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections and never answer
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let dispatcher = WebhookDispatcher::with_timeout(Duration::from_millis(300)).unwrap();
        let destinations = vec![
            format!("http://{addr}/hook"),
            "http://127.0.0.1:1/hook".to_string(),
        ];
        let outcomes = tokio::time::timeout(
            Duration::from_secs(10),
            dispatcher.deliver("hello", &destinations),
        )
        .await
        .expect("delivery should give up on its own");

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes
            .iter()
            .all(|o| matches!(o, Err(WatchError::Delivery { .. }))));
    }

    #[tokio::test]
    async fn test_invalid_url_is_delivery_error() {
        let outcomes = WebhookDispatcher::new()
            .unwrap()
            .deliver("hello", &["not a url".to_string()])
            .await;
        assert!(matches!(outcomes[0], Err(WatchError::Delivery { .. })));
    }
}
