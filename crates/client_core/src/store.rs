use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use shared::{
    domain::{Item, ItemId},
    error::ApiError,
    protocol::{is_truthy, TodoRequest, ADD_PATH, DELETE_PATH, EDIT_PATH, LIST_PATH},
};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::{ListFallback, StoreSettings},
    error::{ConfigError, StoreError},
};

/// Remote persistence for to-do items. One network call per operation.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Item>, StoreError>;
    /// Returns the store's copy of the created item, or `item` itself when
    /// the store only acknowledges.
    async fn add(&self, item: &Item) -> Result<Item, StoreError>;
    async fn remove(&self, id: &ItemId) -> Result<(), StoreError>;
    async fn update(&self, item: &Item) -> Result<(), StoreError>;
}

pub fn placeholder_items() -> Vec<Item> {
    vec![Item::new("test1", "test1", false)]
}

pub struct HttpItemStore {
    http: Client,
    base_url: Url,
    list_fallback: ListFallback,
}

impl HttpItemStore {
    pub fn new(settings: &StoreSettings) -> Result<Self, ConfigError> {
        let base_url = settings.base_url()?;
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ConfigError::HttpClient)?;
        Ok(Self {
            http,
            base_url,
            list_fallback: settings.list_fallback,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str, tail: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        // `base_url` comes from `StoreSettings::base_url`, which refuses
        // cannot-be-a-base URLs, so the segments are always available here.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(path.trim_start_matches('/').split('/'));
            if let Some(tail) = tail {
                segments.push(tail);
            }
        }
        url
    }

    async fn fetch_list(&self) -> Result<Vec<Item>, StoreError> {
        let response = self.http.post(self.endpoint(LIST_PATH, None)).send().await?;
        let payload = read_payload(response).await?;
        serde_json::from_value(payload).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

/// Splits a response into its JSON payload or a typed failure. Empty
/// success bodies read as `null`.
async fn read_payload(response: Response) -> Result<Value, StoreError> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Err(match ApiError::reason_from_body(&body) {
            Some(reason) => StoreError::Rejected { status, reason },
            None => StoreError::MalformedError { status },
        });
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&body).map_err(|e| StoreError::Decode(e.to_string()))
}

fn require_ack(payload: &Value) -> Result<(), StoreError> {
    if is_truthy(payload) {
        Ok(())
    } else {
        Err(StoreError::Unacknowledged)
    }
}

#[async_trait]
impl ItemStore for HttpItemStore {
    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        match self.fetch_list().await {
            Ok(items) => {
                info!(count = items.len(), "store: item list loaded");
                Ok(items)
            }
            Err(err) => match self.list_fallback {
                ListFallback::Propagate => {
                    warn!(error = %err, "store: item list failed");
                    Err(err)
                }
                ListFallback::Placeholder => {
                    warn!(error = %err, "store: item list failed; serving placeholder items");
                    Ok(placeholder_items())
                }
            },
        }
    }

    async fn add(&self, item: &Item) -> Result<Item, StoreError> {
        let response = self
            .http
            .post(self.endpoint(ADD_PATH, None))
            .json(&TodoRequest::new(item.clone()))
            .send()
            .await?;
        let payload = read_payload(response).await?;
        require_ack(&payload)?;
        debug!(uid = %item.uid, "store: item added");
        Ok(serde_json::from_value::<Item>(payload).unwrap_or_else(|_| item.clone()))
    }

    async fn remove(&self, id: &ItemId) -> Result<(), StoreError> {
        let response = self
            .http
            .delete(self.endpoint(DELETE_PATH, Some(id.as_str())))
            .send()
            .await?;
        require_ack(&read_payload(response).await?)?;
        debug!(uid = %id, "store: item deleted");
        Ok(())
    }

    async fn update(&self, item: &Item) -> Result<(), StoreError> {
        let response = self
            .http
            .put(self.endpoint(EDIT_PATH, None))
            .json(&TodoRequest::new(item.clone()))
            .send()
            .await?;
        require_ack(&read_payload(response).await?)?;
        debug!(uid = %item.uid, done = item.done, "store: item updated");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
