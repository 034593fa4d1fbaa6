use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    bounds::{BoundsBody, PheromoneBounds},
    error::Error,
    event::Event,
    history::EventSource,
    server::LinesBody,
    Result,
};

/// Reads events from a running line server. Every call is exactly one request.
#[derive(Debug, Clone)]
pub struct RemoteHistory {
    base_url: String,
    http: reqwest::Client,
}

impl RemoteHistory {
    /// Create a client for the server at `base_url`, eg. `http://127.0.0.1:4444`
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "fetching");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Remote {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl EventSource for RemoteHistory {
    async fn line_count(&self) -> Result<usize> {
        let body: LinesBody = self.get("/lines").await?;
        Ok(body.lines)
    }

    async fn bounds(&self) -> Result<Option<PheromoneBounds>> {
        let body: BoundsBody = self.get("/pheromones").await?;
        Ok(body.into())
    }

    async fn event_at(&self, line: usize) -> Result<Event> {
        self.get(&format!("/line/{}", line)).await
    }
}
