//! HTTP adapter for the remote item store.

use reqwest::StatusCode;

use super::{RemoteClient, RemoteError, MAX_BATCH_SIZE};
use crate::envelope::{ObjectType, SyncEnvelope};

/// Remote client backed by an HTTP item store.
///
/// Routes:
/// - `PUT/GET/DELETE {base}/items/{global_id}`
/// - `GET {base}/items?object_type=<name>` and `GET {base}/items`
/// - `POST {base}/items/batch` (at most [`MAX_BATCH_SIZE`] items per call)
///
/// Requests carry a bearer token when an API key is configured. No retry
/// or backoff: a failure is reported after a single attempt.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn item_url(&self, global_id: &str) -> String {
        format!("{}/items/{}", self.base_url, global_id)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, RemoteError> {
        let response = self
            .request(builder)
            .send()
            .await
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status(status.as_u16(), body));
        }
        Ok(response)
    }
}

impl RemoteClient for HttpRemote {
    async fn put_one(&self, item: &SyncEnvelope) -> Result<(), RemoteError> {
        let builder = self.client.put(self.item_url(&item.global_id)).json(item);
        self.send(builder).await?;
        Ok(())
    }

    async fn get_one(&self, global_id: &str) -> Result<Option<SyncEnvelope>, RemoteError> {
        let response = self
            .request(self.client.get(self.item_url(global_id)))
            .send()
            .await
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let item = response
                    .json::<SyncEnvelope>()
                    .await
                    .map_err(|e| RemoteError::Decode(e.to_string()))?;
                Ok(Some(item))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(RemoteError::Status(status.as_u16(), body))
            }
        }
    }

    async fn delete_one(&self, global_id: &str) -> Result<(), RemoteError> {
        self.send(self.client.delete(self.item_url(global_id)))
            .await?;
        Ok(())
    }

    async fn scan_by_type(
        &self,
        object_type: ObjectType,
    ) -> Result<Vec<SyncEnvelope>, RemoteError> {
        let url = format!("{}/items", self.base_url);
        let builder = self
            .client
            .get(url)
            .query(&[("object_type", object_type.name())]);
        let response = self.send(builder).await?;
        response
            .json::<Vec<SyncEnvelope>>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn scan_all(&self) -> Result<Vec<SyncEnvelope>, RemoteError> {
        let response = self.send(self.client.get(format!("{}/items", self.base_url))).await?;
        response
            .json::<Vec<SyncEnvelope>>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn batch_put(&self, items: &[SyncEnvelope]) -> Result<(), RemoteError> {
        let url = format!("{}/items/batch", self.base_url);
        let mut written = 0;

        for chunk in items.chunks(MAX_BATCH_SIZE) {
            let builder = self.client.post(&url).json(chunk);
            if let Err(e) = self.send(builder).await {
                return Err(RemoteError::BatchPartial {
                    written,
                    source: Box::new(e),
                });
            }
            written += chunk.len();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let remote = HttpRemote::new("http://localhost:9000/", None);
        assert_eq!(remote.base_url(), "http://localhost:9000");
        assert_eq!(remote.item_url("g-1"), "http://localhost:9000/items/g-1");
    }
}
