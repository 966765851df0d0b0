//! Remote catalog synchronization.
//!
//! Registration is delete-then-create: the collection is deleted (outcome
//! ignored), re-created from its document, then every item is created in
//! file order. Requests are strictly sequential. A failed item create stops
//! the sequence and leaves earlier items registered.
//!
//! Two concurrent synchronizations for the same identifier can interleave
//! their deletes and creates; callers must ensure a single writer per
//! identifier.

use std::path::Path;
use std::time::Duration;

use metrics::counter;
use reqwest::{Client, Response};
use tracing::{debug, info, instrument, warn};
use zarr_stac::join_url;

use crate::error::{PublishError, Result};

/// HTTP settings for catalog calls.
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    /// Per-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

/// Outcome of a successful synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Status of the delete, or `None` if it never got a response.
    pub delete_status: Option<u16>,
    pub collection_status: u16,
    pub items_created: usize,
}

/// Client for the remote catalog's collection and item endpoints.
#[derive(Debug, Clone)]
pub struct CatalogSynchronizer {
    client: Client,
}

impl CatalogSynchronizer {
    pub fn new(config: SyncConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(PublishError::HttpClient)?;
        Ok(Self { client })
    }

    /// Register the collection and its items with the catalog at `collection_url`.
    ///
    /// Both documents must exist before any request is sent.
    #[instrument(skip(self, collection_doc_path, items_doc_path))]
    pub async fn synchronize(
        &self,
        collection_url: &str,
        identifier: &str,
        collection_doc_path: &Path,
        items_doc_path: &Path,
    ) -> Result<SyncReport> {
        for path in [collection_doc_path, items_doc_path] {
            let exists = tokio::fs::try_exists(path)
                .await
                .map_err(PublishError::io(path))?;
            if !exists {
                return Err(PublishError::MissingArtifact {
                    path: path.to_path_buf(),
                });
            }
        }

        let collection_doc = read_json_document(collection_doc_path).await?;
        let items_doc = tokio::fs::read_to_string(items_doc_path)
            .await
            .map_err(PublishError::io(items_doc_path))?;

        let collections_endpoint = join_url(collection_url, &[]);
        let collection_endpoint = join_url(collection_url, &[identifier]);
        let items_endpoint = join_url(collection_url, &[identifier, "items"]);

        let delete_status = self.delete_collection(&collection_endpoint).await;

        let collection_status = self
            .create(&collections_endpoint, &collection_doc, "collection")
            .await?;
        info!(status = collection_status, "Registered collection");

        let mut items_created = 0;
        for (index, line) in items_doc.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let item: serde_json::Value =
                serde_json::from_str(line).map_err(|e| PublishError::InvalidArtifact {
                    path: items_doc_path.to_path_buf(),
                    line: index + 1,
                    message: e.to_string(),
                })?;

            self.create(&items_endpoint, &item, "item").await?;
            items_created += 1;
            debug!(line = index + 1, "Registered item");
        }

        info!(items = items_created, "Catalog synchronized");

        Ok(SyncReport {
            delete_status,
            collection_status,
            items_created,
        })
    }

    /// Best-effort delete. Every outcome is accepted.
    async fn delete_collection(&self, url: &str) -> Option<u16> {
        match self.client.delete(url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                debug!(url = %url, status = status, "Deleted previous collection");
                counter!("catalog_requests_total", "operation" => "delete", "outcome" => "response")
                    .increment(1);
                Some(status)
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Collection delete failed, continuing");
                counter!("catalog_requests_total", "operation" => "delete", "outcome" => "transport_error")
                    .increment(1);
                None
            }
        }
    }

    async fn create(
        &self,
        url: &str,
        body: &serde_json::Value,
        operation: &'static str,
    ) -> Result<u16> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|source| {
                counter!("catalog_requests_total", "operation" => operation, "outcome" => "transport_error")
                    .increment(1);
                PublishError::Transport {
                    url: url.to_string(),
                    source,
                }
            })?;

        check_status(response, url, operation).await
    }
}

async fn check_status(response: Response, url: &str, operation: &'static str) -> Result<u16> {
    let status = response.status();
    if status.as_u16() >= 400 {
        counter!("catalog_requests_total", "operation" => operation, "outcome" => "rejected")
            .increment(1);
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to read rejection body");
                format!("<unreadable response body: {}>", e)
            }
        };
        warn!(url = %url, status = status.as_u16(), body = %body, "Catalog rejected request");
        return Err(PublishError::RemoteRegistration {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    counter!("catalog_requests_total", "operation" => operation, "outcome" => "created")
        .increment(1);
    Ok(status.as_u16())
}

async fn read_json_document(path: &Path) -> Result<serde_json::Value> {
    let bytes = tokio::fs::read(path).await.map_err(PublishError::io(path))?;
    serde_json::from_slice(&bytes).map_err(|e| PublishError::InvalidArtifact {
        path: path.to_path_buf(),
        line: e.line(),
        message: e.to_string(),
    })
}
