//! Fire-and-forget analytics emission
//!
//! Analytics are a side channel: the flow reports which terminal path it
//! took, and nothing about the flow's result ever depends on whether the
//! event made it out.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::config::GatewayConfig;

const ANALYTICS_PATH: &str = "v1/tracking/batch/events";

/// The analytics collaborator.
///
/// Emission failures are logged and dropped — they are never propagated to
/// the caller of the flow.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn send_event(&self, tag: &str);
}

/// Posts analytics events to the gateway's tracking endpoint.
pub struct HttpAnalytics {
    client: Client,
    endpoint: Option<Url>,
    client_key: String,
}

impl HttpAnalytics {
    pub fn new(config: &GatewayConfig) -> Self {
        let endpoint = match config.base_url.join(ANALYTICS_PATH) {
            Ok(url) => Some(url),
            Err(e) => {
                // Analytics must never take the flow down, even at setup.
                warn!("analytics endpoint unavailable: {e}");
                None
            }
        };

        Self {
            client: Client::new(),
            endpoint,
            client_key: config.client_key.clone(),
        }
    }
}

#[async_trait]
impl AnalyticsSink for HttpAnalytics {
    async fn send_event(&self, tag: &str) {
        let Some(endpoint) = self.endpoint.clone() else {
            return;
        };

        let body = json!({
            "analytics": [{
                "kind": tag,
                "at": Utc::now().to_rfc3339(),
            }]
        });

        let request = self
            .client
            .post(endpoint)
            .header("client-key", &self.client_key)
            .json(&body);
        let tag = tag.to_string();

        // Detached so the flow's terminal result is never delayed by the
        // tracking endpoint.
        tokio::spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("analytics event sent: {tag}");
                }
                Ok(response) => {
                    warn!(
                        "analytics event {tag} rejected with status {}",
                        response.status()
                    );
                }
                Err(e) => {
                    warn!("failed to send analytics event {tag}: {e}");
                }
            }
        });
    }
}
