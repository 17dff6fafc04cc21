//! HTTP client for the broker API

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use std::time::Duration;

use crate::auth::{ConnectionInfo, Credentials};
use crate::error::{RemoteError, RemoteErrorKind};
use crate::path::VirtualPath;
use crate::storage::{MetadataApi, ObjectRecord};

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: String,
}

/// [`MetadataApi`] backed by a running broker.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` includes the `/api` prefix, e.g. `http://127.0.0.1:8000/api`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}/{}", self.base_url, route)
    }

    /// Maps non-success responses to their `detail` string.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorDetail>(&body)
            .map(|e| e.detail)
            .unwrap_or_else(|_| format!("HTTP {}", status));
        let kind = match status.as_u16() {
            404 => RemoteErrorKind::NotFound,
            400 | 401 | 403 => RemoteErrorKind::Rejected,
            _ => RemoteErrorKind::Protocol,
        };
        Err(RemoteError::new(kind, detail))
    }
}

#[async_trait]
impl MetadataApi for ApiClient {
    async fn connect(&self, credentials: &Credentials) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(self.endpoint("connect"))
            .json(&ConnectionInfo::from(credentials))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), RemoteError> {
        let response = self.client.post(self.endpoint("disconnect")).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn list(&self, path: &VirtualPath) -> Result<Vec<ObjectRecord>, RemoteError> {
        debug!("GET files path='{}'", path);
        let response = self
            .client
            .get(self.endpoint("files"))
            .query(&[("path", path.as_str())])
            .send()
            .await?;
        let records = Self::check(response).await?.json().await?;
        Ok(records)
    }

    async fn delete(&self, path: &VirtualPath) -> Result<(), RemoteError> {
        let response = self
            .client
            .delete(self.endpoint("delete"))
            .query(&[("path", path.as_str())])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn mkdir(&self, path: &VirtualPath) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(self.endpoint("create-directory"))
            .query(&[("path", path.as_str())])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
