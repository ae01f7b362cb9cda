//! HTTP polling signaling transport
//!
//! Every request is a JSON `POST` to `base_url + endpoint`. Push
//! notifications are synthesized: after `subscribe`, a background task
//! posts `sync` on a fixed delay and hands each decoded roster to the
//! handler.

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::SignalingError;
use crate::roster::RosterSnapshot;
use crate::session::PeerId;

use super::config::HttpSignalingConfig;
use super::endpoint::Endpoint;
use super::message::SyncResponse;
use super::port::{decode, NotificationHandler, SignalingPort};

/// Signaling over HTTP POST with a `sync` poller for roster updates
pub struct HttpSignaling {
    config: HttpSignalingConfig,
    client: Client,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl HttpSignaling {
    pub fn new(config: HttpSignalingConfig) -> Result<Self, SignalingError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            config,
            client,
            poller: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &HttpSignalingConfig {
        &self.config
    }

    /// Whether a `sync` poller is running
    pub fn is_polling(&self) -> bool {
        self.lock_poller()
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    fn lock_poller(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.poller.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

async fn post(
    client: &Client,
    url: &str,
    endpoint: Endpoint,
    payload: &Value,
) -> Result<Value, SignalingError> {
    let response = client
        .post(url)
        .json(payload)
        .send()
        .await?
        .error_for_status()?;

    let body = response.bytes().await?;
    if body.is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_slice(&body).map_err(|e| SignalingError::Malformed {
        endpoint,
        reason: e.to_string(),
    })
}

#[async_trait]
impl SignalingPort for HttpSignaling {
    async fn request(&self, endpoint: Endpoint, payload: Value) -> Result<Value, SignalingError> {
        let url = self.config.url_for(endpoint.as_str());
        tracing::trace!(endpoint = %endpoint, "signaling request");

        post(&self.client, &url, endpoint, &payload).await
    }

    fn request_async(&self, endpoint: Endpoint, payload: Value) {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!(endpoint = %endpoint, "No runtime, dropping fire-and-forget request");
            return;
        };

        let client = self.client.clone();
        let url = self.config.url_for(endpoint.as_str());

        runtime.spawn(async move {
            if let Err(e) = post(&client, &url, endpoint, &payload).await {
                tracing::warn!(endpoint = %endpoint, error = %e, "Fire-and-forget request failed");
            }
        });
    }

    fn subscribe(
        &self,
        peer_id: &PeerId,
        handler: NotificationHandler,
    ) -> Result<(), SignalingError> {
        let runtime = Handle::try_current()
            .map_err(|e| SignalingError::Transport(format!("cannot start sync poller: {}", e)))?;

        let client = self.client.clone();
        let url = self.config.url_for(Endpoint::Sync.as_str());
        let interval = self.config.poll_interval;
        let payload = json!({ "peerId": peer_id });

        let task = runtime.spawn(async move {
            loop {
                let polled = post(&client, &url, Endpoint::Sync, &payload)
                    .await
                    .and_then(|reply| decode::<SyncResponse>(Endpoint::Sync, reply));

                match polled {
                    Ok(sync) => handler(RosterSnapshot::from(sync)),
                    Err(e) => tracing::warn!(error = %e, "Sync poll failed"),
                }

                tokio::time::sleep(interval).await;
            }
        });

        if let Some(previous) = self.lock_poller().replace(task) {
            previous.abort();
        }

        tracing::debug!(peer = %peer_id, interval_ms = interval.as_millis() as u64, "Sync poller started");
        Ok(())
    }

    fn unsubscribe(&self) {
        if let Some(task) = self.lock_poller().take() {
            task.abort();
            tracing::debug!("Sync poller stopped");
        }
    }
}

impl Drop for HttpSignaling {
    fn drop(&mut self) {
        if let Some(task) = self.lock_poller().take() {
            task.abort();
        }
    }
}
