//! Zarr + STAC generation for a published cube.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use storage::{upload_directory, ObjectStorage, StoragePath};
use tracing::{debug, info, instrument};
use zarrs_filesystem::FilesystemStore;

use crate::config::ZarrWriterConfig;
use crate::error::{Result, WriterError};
use crate::params::WriteParameters;
use crate::stac::{items_from_params, Collection};
use crate::writer::CubeZarrWriter;

/// File name of the newline-delimited items document.
pub const ITEMS_FILE_NAME: &str = "inline_items.csv";

/// Deterministic locations of everything the generator writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StacArtifacts {
    /// `{output_folder}/{collection_id}.json`
    pub collection_document: PathBuf,
    /// `{output_folder}/inline_items.csv`
    pub items_document: PathBuf,
    /// `{output_folder}/{collection_id}.zarr`
    pub zarr_store: PathBuf,
}

impl StacArtifacts {
    pub fn locate(output_folder: &Path, collection_id: &str) -> Self {
        Self {
            collection_document: output_folder.join(format!("{}.json", collection_id)),
            items_document: output_folder.join(ITEMS_FILE_NAME),
            zarr_store: output_folder.join(format!("{}.zarr", collection_id)),
        }
    }
}

/// Writes a cube and its catalog documents.
///
/// Implementations must leave the documents at the paths given by
/// [`StacArtifacts::locate`] for `params.output_folder` and
/// `params.collection_id`.
#[async_trait]
pub trait StacGenerator: Send + Sync {
    async fn generate(&self, params: &WriteParameters, item_id: &str) -> Result<StacArtifacts>;
}

/// Default generator: Zarr store on local disk, collection as pretty JSON,
/// items as NDJSON, optional upload of all three to S3.
pub struct ZarrStacGenerator {
    config: ZarrWriterConfig,
    object_storage: Option<Arc<ObjectStorage>>,
}

impl ZarrStacGenerator {
    pub fn new(config: ZarrWriterConfig) -> Self {
        Self {
            config,
            object_storage: None,
        }
    }

    pub fn from_env() -> Self {
        Self::new(ZarrWriterConfig::from_env())
    }

    /// Upload through this client instead of one built from the request's
    /// S3 target.
    pub fn with_object_storage(mut self, storage: Arc<ObjectStorage>) -> Self {
        self.object_storage = Some(storage);
        self
    }

    async fn write_zarr(&self, params: &WriteParameters, zarr_path: &Path) -> Result<()> {
        if tokio::fs::try_exists(zarr_path)
            .await
            .map_err(WriterError::io(zarr_path))?
        {
            tokio::fs::remove_dir_all(zarr_path)
                .await
                .map_err(WriterError::io(zarr_path))?;
        }
        tokio::fs::create_dir_all(zarr_path)
            .await
            .map_err(WriterError::io(zarr_path))?;

        let writer = CubeZarrWriter::new(self.config.clone());
        let cube = Arc::clone(&params.data);
        let path = zarr_path.to_path_buf();

        let result = tokio::task::spawn_blocking(move || {
            let store = FilesystemStore::new(&path).map_err(|e| {
                WriterError::Zarr(format!("Failed to create filesystem store: {}", e))
            })?;
            writer.write(store, "/", &cube)
        })
        .await
        .map_err(|e| WriterError::Task(e.to_string()))??;

        debug!(
            shape = ?result.metadata.shape,
            chunks = ?result.metadata.chunk_shape,
            bytes = result.bytes_written,
            "Wrote Zarr store"
        );
        Ok(())
    }

    fn storage_for(&self, params: &WriteParameters) -> Result<Option<Arc<ObjectStorage>>> {
        let Some(target) = &params.s3 else {
            return Ok(None);
        };
        match &self.object_storage {
            Some(storage) => Ok(Some(Arc::clone(storage))),
            None => Ok(Some(Arc::new(ObjectStorage::new(&target.storage_config())?))),
        }
    }
}

#[async_trait]
impl StacGenerator for ZarrStacGenerator {
    #[instrument(skip(self, params), fields(collection = %params.collection_id, s3 = params.s3_upload()))]
    async fn generate(&self, params: &WriteParameters, item_id: &str) -> Result<StacArtifacts> {
        let artifacts = StacArtifacts::locate(&params.output_folder, &params.collection_id);
        let zarr_name = format!("{}.zarr", params.collection_id);

        tokio::fs::create_dir_all(&params.output_folder)
            .await
            .map_err(WriterError::io(&params.output_folder))?;

        self.write_zarr(params, &artifacts.zarr_store).await?;

        let storage = self.storage_for(params)?;
        let prefix = params
            .s3
            .as_ref()
            .map(|t| StoragePath::collection_prefix(&t.bucket_file_prefix, &params.collection_id))
            .unwrap_or_default();

        let zarr_href = match &storage {
            Some(storage) => storage.object_url(&StoragePath::object_key(&prefix, &zarr_name)),
            None => artifacts.zarr_store.display().to_string(),
        };

        let collection = Collection::from_params(params, &zarr_href);
        let collection_json = serde_json::to_vec_pretty(&collection)?;
        tokio::fs::write(&artifacts.collection_document, &collection_json)
            .await
            .map_err(WriterError::io(&artifacts.collection_document))?;

        let items = items_from_params(params, item_id, &zarr_href);
        let mut items_ndjson = Vec::new();
        for item in &items {
            serde_json::to_writer(&mut items_ndjson, item)?;
            items_ndjson.push(b'\n');
        }
        tokio::fs::write(&artifacts.items_document, &items_ndjson)
            .await
            .map_err(WriterError::io(&artifacts.items_document))?;

        if let Some(storage) = storage {
            let zarr_bytes = upload_directory(
                &storage,
                &artifacts.zarr_store,
                &StoragePath::object_key(&prefix, &zarr_name),
            )
            .await?;

            let collection_key =
                StoragePath::object_key(&prefix, &format!("{}.json", params.collection_id));
            storage.put(&collection_key, Bytes::from(collection_json)).await?;

            let items_key = StoragePath::object_key(&prefix, ITEMS_FILE_NAME);
            storage.put(&items_key, Bytes::from(items_ndjson)).await?;

            info!(
                bucket = storage.bucket(),
                prefix = %prefix,
                zarr_bytes = zarr_bytes,
                "Uploaded collection to object storage"
            );
        }

        info!(
            items = items.len(),
            output = %params.output_folder.display(),
            "Generated STAC collection"
        );

        Ok(artifacts)
    }
}
