//! Publication orchestration.

use std::path::PathBuf;
use std::sync::Arc;

use cube_common::DataCube;
use metrics::counter;
use tracing::{info, instrument};
use zarr_stac::{S3UploadTarget, StacArtifacts, StacGenerator, WriteParameters};

use crate::config::PublisherConfig;
use crate::credentials::{resolve_credentials, EnvSource};
use crate::error::{PublishError, Result};
use crate::request::PublicationRequest;
use crate::sync::{CatalogSynchronizer, SyncConfig};

/// Runs publications: validate, write through the generator, optionally
/// register with the remote catalog, hand the cube back.
pub struct Publisher {
    generator: Arc<dyn StacGenerator>,
    env: Arc<dyn EnvSource>,
    synchronizer: CatalogSynchronizer,
    config: PublisherConfig,
}

impl Publisher {
    pub fn new(
        generator: Arc<dyn StacGenerator>,
        env: Arc<dyn EnvSource>,
        config: PublisherConfig,
    ) -> Result<Self> {
        let synchronizer = CatalogSynchronizer::new(SyncConfig {
            request_timeout: config.request_timeout,
        })?;
        Ok(Self {
            generator,
            env,
            synchronizer,
            config,
        })
    }

    /// Folder receiving the artifacts of `request`.
    pub fn output_folder(&self, request: &PublicationRequest) -> PathBuf {
        request
            .output_location
            .clone()
            .unwrap_or_else(|| self.config.output_root.join(&request.item_id))
    }

    /// Publish `request.data` and return the same cube.
    ///
    /// Configuration errors are raised before the generator runs. Generator
    /// errors pass through as [`PublishError::Writer`].
    #[instrument(skip(self, request), fields(item_id = %request.item_id, s3_upload = request.s3_upload, post_to_stac = request.post_to_stac))]
    pub async fn publish(&self, request: PublicationRequest) -> Result<Arc<DataCube>> {
        let s3 = if request.s3_upload {
            Some(self.s3_target(&request)?)
        } else {
            None
        };

        let output_folder = self.output_folder(&request);
        let params = WriteParameters {
            data: Arc::clone(&request.data),
            collection_id: request.item_id.clone(),
            description: request.description.clone(),
            license: request.license.clone(),
            keywords: request.keywords.clone(),
            collection_url: request.collection_url.clone(),
            output_folder: output_folder.clone(),
            providers: request.providers.clone(),
            sci_citation: request.sci_citation.clone(),
            sci_doi: request.sci_doi.clone(),
            links: request.links.clone(),
            write_collection_assets: request.write_collection_assets,
            s3,
        };

        self.generator.generate(&params, &request.item_id).await?;
        info!(output = %output_folder.display(), "Storage write complete");

        if request.post_to_stac {
            let expected = StacArtifacts::locate(&output_folder, &request.item_id);
            self.synchronizer
                .synchronize(
                    &request.collection_url,
                    &request.item_id,
                    &expected.collection_document,
                    &expected.items_document,
                )
                .await?;
        }

        counter!("publications_total").increment(1);
        Ok(request.data)
    }

    /// Credentials first, then endpoint and bucket.
    fn s3_target(&self, request: &PublicationRequest) -> Result<S3UploadTarget> {
        let (access_key_id, secret_access_key) =
            resolve_credentials(self.env.as_ref()).require()?;

        let endpoint_url = non_empty(&request.s3_endpoint_url)
            .ok_or(PublishError::MissingS3Setting("s3_endpoint_url"))?;
        let bucket_name =
            non_empty(&request.bucket_name).ok_or(PublishError::MissingS3Setting("bucket_name"))?;

        Ok(S3UploadTarget {
            endpoint_url,
            bucket_name,
            bucket_file_prefix: request.bucket_file_prefix.clone(),
            access_key_id,
            secret_access_key,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}
