//! Azure Blob Storage backend
//!
//! Talks to the Blob service REST API with a SAS token appended to every
//! request URL. Listings follow `NextMarker` pagination; payloads larger than
//! the configured block size go up as Put Block + Put Block List.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use log::{debug, info};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::{Credentials, SasToken};
use crate::config::StorageConfig;
use crate::error::{RemoteError, RemoteErrorKind};
use crate::storage::{
    BlobContent, Connector, ContainerClient, DEFAULT_CONTENT_TYPE, ObjectRecord, ProgressFn,
};

const API_VERSION: &str = "2021-08-06";
const VERSION_HEADER: &str = "x-ms-version";

/// Characters escaped inside a blob name; `/` stays literal.
const KEY_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Characters escaped inside a query parameter value.
const QUERY_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EnumerationResults {
    #[serde(default)]
    blobs: BlobList,
    #[serde(default)]
    next_marker: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BlobList {
    #[serde(rename = "Blob", default)]
    items: Vec<BlobItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BlobItem {
    name: String,
    properties: BlobProperties,
}

#[derive(Debug, Deserialize)]
struct BlobProperties {
    #[serde(rename = "Content-Length", default)]
    content_length: u64,
    #[serde(rename = "Content-Type", default)]
    content_type: Option<String>,
    #[serde(rename = "Last-Modified", default)]
    last_modified: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StorageErrorBody {
    code: String,
    #[serde(default)]
    message: Option<String>,
}

/// One page of a List Blobs response.
#[derive(Debug)]
struct ListPage {
    records: Vec<ObjectRecord>,
    next_marker: Option<String>,
}

fn parse_list_response(body: &str) -> Result<ListPage, RemoteError> {
    let results: EnumerationResults = quick_xml::de::from_str(body)
        .map_err(|e| RemoteError::protocol(format!("Malformed listing response: {}", e)))?;

    let records = results
        .blobs
        .items
        .into_iter()
        .map(|item| ObjectRecord {
            key: item.name,
            size: item.properties.content_length,
            content_type: item.properties.content_type.filter(|s| !s.is_empty()),
            last_modified: item.properties.last_modified.filter(|s| !s.is_empty()),
        })
        .collect();

    Ok(ListPage {
        records,
        next_marker: results.next_marker.filter(|m| !m.trim().is_empty()),
    })
}

/// Renders a storage error body as `"<Code>: <Message>"`.
fn parse_error_body(body: &str) -> Option<String> {
    let parsed: StorageErrorBody = quick_xml::de::from_str(body).ok()?;
    let message = parsed
        .message
        .as_deref()
        .and_then(|m| m.lines().next())
        .map(str::trim)
        .filter(|m| !m.is_empty());
    Some(match message {
        Some(message) => format!("{}: {}", parsed.code, message),
        None => parsed.code,
    })
}

fn error_kind_for(status: reqwest::StatusCode) -> RemoteErrorKind {
    match status.as_u16() {
        404 => RemoteErrorKind::NotFound,
        401 | 403 => RemoteErrorKind::Rejected,
        _ => RemoteErrorKind::Protocol,
    }
}

/// Passes successful responses through and turns the rest into errors.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = parse_error_body(&body).unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            format!("HTTP {}", status)
        } else {
            format!("HTTP {}: {}", status, trimmed)
        }
    });
    Err(RemoteError::new(error_kind_for(status), detail))
}

/// Fixed-width block id so every id in one blob has the same length.
fn block_id(index: usize) -> String {
    STANDARD.encode(format!("block-{:08}", index))
}

fn block_list_body(ids: &[String]) -> String {
    let mut body = String::from(r#"<?xml version="1.0" encoding="utf-8"?><BlockList>"#);
    for id in ids {
        body.push_str("<Latest>");
        body.push_str(id);
        body.push_str("</Latest>");
    }
    body.push_str("</BlockList>");
    body
}

/// Client for one Azure Blob container.
pub struct AzureContainer {
    client: reqwest::Client,
    container_url: String,
    sas: SasToken,
    block_size: usize,
}

impl AzureContainer {
    pub fn new(
        client: reqwest::Client,
        endpoint: &str,
        container: &str,
        sas: SasToken,
        block_size: usize,
    ) -> Self {
        Self {
            client,
            container_url: format!("{}/{}", endpoint.trim_end_matches('/'), container),
            sas,
            block_size: block_size.max(1),
        }
    }

    /// Builds a request URL for the container (`key = None`) or one blob.
    fn url(&self, key: Option<&str>, params: &[(&str, &str)]) -> String {
        let mut url = self.container_url.clone();
        if let Some(key) = key {
            url.push('/');
            url.push_str(&utf8_percent_encode(key, KEY_ENCODE).to_string());
        }
        url.push_str(self.sas.as_query());
        for (name, value) in params {
            url.push('&');
            url.push_str(name);
            url.push('=');
            url.push_str(&utf8_percent_encode(value, QUERY_ENCODE).to_string());
        }
        url
    }

    async fn list_page(
        &self,
        prefix: &str,
        marker: Option<&str>,
        max_results: Option<&str>,
    ) -> Result<ListPage, RemoteError> {
        let mut params = vec![("restype", "container"), ("comp", "list")];
        if !prefix.is_empty() {
            params.push(("prefix", prefix));
        }
        if let Some(marker) = marker {
            params.push(("marker", marker));
        }
        if let Some(max) = max_results {
            params.push(("maxresults", max));
        }

        let response = self
            .client
            .get(self.url(None, &params))
            .header(VERSION_HEADER, API_VERSION)
            .send()
            .await?;
        let body = check(response).await?.text().await?;
        parse_list_response(&body)
    }

    async fn put_block(&self, key: &str, id: &str, chunk: Bytes) -> Result<(), RemoteError> {
        let response = self
            .client
            .put(self.url(Some(key), &[("comp", "block"), ("blockid", id)]))
            .header(VERSION_HEADER, API_VERSION)
            .body(chunk)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn put_block_list(
        &self,
        key: &str,
        ids: &[String],
        content_type: &str,
    ) -> Result<(), RemoteError> {
        let response = self
            .client
            .put(self.url(Some(key), &[("comp", "blocklist")]))
            .header(VERSION_HEADER, API_VERSION)
            .header("x-ms-blob-content-type", content_type)
            .header("Content-Type", "application/xml")
            .body(block_list_body(ids))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl ContainerClient for AzureContainer {
    async fn probe(&self) -> Result<(), RemoteError> {
        self.list_page("", None, Some("1")).await.map(|_| ())
    }

    async fn list_blobs(&self, prefix: &str) -> Result<Vec<ObjectRecord>, RemoteError> {
        let mut records = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let page = self.list_page(prefix, marker.as_deref(), None).await?;
            records.extend(page.records);
            match page.next_marker {
                Some(next) => marker = Some(next),
                None => break,
            }
        }

        debug!("Listed {} blobs under '{}'", records.len(), prefix);
        Ok(records)
    }

    async fn put_blob(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), RemoteError> {
        let response = self
            .client
            .put(self.url(Some(key), &[]))
            .header(VERSION_HEADER, API_VERSION)
            .header("x-ms-blob-type", "BlockBlob")
            .header("Content-Type", content_type)
            .body(data)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn put_blob_with_progress(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        progress: &ProgressFn<'_>,
    ) -> Result<(), RemoteError> {
        let total = data.len();
        if total <= self.block_size {
            self.put_blob(key, data, content_type).await?;
            progress(total as u64);
            return Ok(());
        }

        let mut ids = Vec::with_capacity(total.div_ceil(self.block_size));
        let mut offset = 0;
        while offset < total {
            let end = (offset + self.block_size).min(total);
            let id = block_id(ids.len());
            self.put_block(key, &id, data.slice(offset..end)).await?;
            ids.push(id);
            offset = end;
            progress(offset as u64);
        }

        self.put_block_list(key, &ids, content_type).await?;
        info!("Committed {} blocks for '{}' ({} bytes)", ids.len(), key, total);
        Ok(())
    }

    async fn get_blob(&self, key: &str) -> Result<BlobContent, RemoteError> {
        let response = self
            .client
            .get(self.url(Some(key), &[]))
            .header(VERSION_HEADER, API_VERSION)
            .send()
            .await?;
        let response = check(response).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let data = response.bytes().await?;

        Ok(BlobContent { data, content_type })
    }

    async fn delete_blob(&self, key: &str) -> Result<(), RemoteError> {
        let response = self
            .client
            .delete(self.url(Some(key), &[]))
            .header(VERSION_HEADER, API_VERSION)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    fn blob_url(&self, key: &str) -> String {
        self.url(Some(key), &[])
    }
}

/// Builds [`AzureContainer`] clients from credentials.
pub struct AzureConnector {
    client: reqwest::Client,
    config: StorageConfig,
}

impl AzureConnector {
    pub fn new(config: &StorageConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl Connector for AzureConnector {
    fn open(&self, credentials: &Credentials) -> Result<Arc<dyn ContainerClient>, RemoteError> {
        Ok(Arc::new(AzureContainer::new(
            self.client.clone(),
            &self.config.endpoint_for(credentials.account()),
            credentials.container(),
            credentials.sas_token().clone(),
            self.config.block_size_bytes(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container() -> AzureContainer {
        AzureContainer::new(
            reqwest::Client::new(),
            "https://acct.blob.core.windows.net/",
            "box",
            SasToken::parse("sv=2022-11-02&sig=abc%3D").unwrap(),
            4,
        )
    }

    #[test]
    fn test_blob_url_encodes_key_but_keeps_separators() {
        let url = container().blob_url("reports/q1 summary#1.pdf");
        assert_eq!(
            url,
            "https://acct.blob.core.windows.net/box/reports/q1%20summary%231.pdf?sv=2022-11-02&sig=abc%3D"
        );
    }

    #[test]
    fn test_container_url_with_params() {
        let url = container().url(None, &[("restype", "container"), ("prefix", "a b/")]);
        assert_eq!(
            url,
            "https://acct.blob.core.windows.net/box?sv=2022-11-02&sig=abc%3D&restype=container&prefix=a%20b%2F"
        );
    }

    #[test]
    fn test_parse_list_response() {
        let body = r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ServiceEndpoint="https://acct.blob.core.windows.net/" ContainerName="box">
  <Prefix>a/</Prefix>
  <Blobs>
    <Blob>
      <Name>a/b.txt</Name>
      <Properties>
        <Last-Modified>Mon, 06 Jan 2025 10:00:00 GMT</Last-Modified>
        <Content-Length>10</Content-Length>
        <Content-Type>text/plain</Content-Type>
        <BlobType>BlockBlob</BlobType>
      </Properties>
    </Blob>
    <Blob>
      <Name>a/c/d.txt</Name>
      <Properties>
        <Content-Length>5</Content-Length>
      </Properties>
    </Blob>
  </Blobs>
  <NextMarker>2!72!abc</NextMarker>
</EnumerationResults>"#;

        let page = parse_list_response(body).unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].key, "a/b.txt");
        assert_eq!(page.records[0].size, 10);
        assert_eq!(page.records[0].content_type.as_deref(), Some("text/plain"));
        assert_eq!(page.records[1].size, 5);
        assert_eq!(page.next_marker.as_deref(), Some("2!72!abc"));
    }

    #[test]
    fn test_parse_empty_list_response() {
        let body = r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ContainerName="box"><Blobs /><NextMarker /></EnumerationResults>"#;
        let page = parse_list_response(body).unwrap();
        assert!(page.records.is_empty());
        assert!(page.next_marker.is_none());
    }

    #[test]
    fn test_parse_error_body() {
        let body = r#"<?xml version="1.0" encoding="utf-8"?>
<Error><Code>AuthenticationFailed</Code><Message>Server failed to authenticate the request.
RequestId:1234</Message></Error>"#;
        assert_eq!(
            parse_error_body(body).as_deref(),
            Some("AuthenticationFailed: Server failed to authenticate the request.")
        );
        assert_eq!(parse_error_body("not xml at all"), None);
    }

    #[test]
    fn test_block_ids_have_equal_length() {
        assert_eq!(block_id(0).len(), block_id(99_999).len());
        assert_ne!(block_id(1), block_id(2));
        let body = block_list_body(&[block_id(0)]);
        assert!(body.ends_with("</Latest></BlockList>"));
    }

    #[test]
    fn test_error_kind_for_status() {
        assert_eq!(error_kind_for(reqwest::StatusCode::NOT_FOUND), RemoteErrorKind::NotFound);
        assert_eq!(error_kind_for(reqwest::StatusCode::FORBIDDEN), RemoteErrorKind::Rejected);
        assert_eq!(
            error_kind_for(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
            RemoteErrorKind::Protocol
        );
    }
}
