//! Parameters handed to a [`StacGenerator`](crate::StacGenerator).

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use cube_common::DataCube;
use storage::ObjectStorageConfig;

use crate::stac::{Link, Provider};

/// Everything the generator needs to write one cube and its catalog documents.
#[derive(Debug, Clone)]
pub struct WriteParameters {
    pub data: Arc<DataCube>,
    pub collection_id: String,
    pub description: String,
    pub license: String,
    pub keywords: Vec<String>,
    /// Base URL of the remote collections endpoint, used for document links.
    pub collection_url: String,
    /// Local folder receiving the Zarr store and the documents.
    pub output_folder: PathBuf,
    pub providers: Vec<Provider>,
    pub sci_citation: Option<String>,
    pub sci_doi: Option<String>,
    pub links: Vec<Link>,
    /// Attach the Zarr store as an asset on the collection document.
    pub write_collection_assets: bool,
    /// Object storage target. Present only when upload was requested.
    pub s3: Option<S3UploadTarget>,
}

impl WriteParameters {
    pub fn s3_upload(&self) -> bool {
        self.s3.is_some()
    }
}

/// Resolved S3 destination and credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct S3UploadTarget {
    pub endpoint_url: String,
    pub bucket_name: String,
    /// Prepended verbatim to the collection id.
    pub bucket_file_prefix: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl S3UploadTarget {
    pub fn storage_config(&self) -> ObjectStorageConfig {
        ObjectStorageConfig::new(
            &self.endpoint_url,
            &self.bucket_name,
            &self.access_key_id,
            &self.secret_access_key,
        )
    }
}

impl fmt::Debug for S3UploadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3UploadTarget")
            .field("endpoint_url", &self.endpoint_url)
            .field("bucket_name", &self.bucket_name)
            .field("bucket_file_prefix", &self.bucket_file_prefix)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .finish()
    }
}
