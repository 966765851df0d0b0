//! Data cube publication.
//!
//! Publishes a cube as a STAC collection: resolve storage credentials, hand
//! the cube to a [`StacGenerator`](zarr_stac::StacGenerator) that writes Zarr
//! and the catalog documents, optionally register those documents with a
//! remote catalog, and return the input cube so the call can sit in the
//! middle of a processing chain.
//!
//! # Flow
//!
//! ```text
//! Publisher::publish(request)
//!      │
//!      ├─► s3_upload?  resolve credentials, check endpoint + bucket
//!      │
//!      ├─► StacGenerator::generate(params, item_id)
//!      │
//!      ├─► post_to_stac?  CatalogSynchronizer::synchronize
//!      │         DELETE {collection_url}/{id}      (outcome ignored)
//!      │         POST   {collection_url}           (collection)
//!      │         POST   {collection_url}/{id}/items  (one per line)
//!      │
//!      └─► return request.data
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod publisher;
pub mod request;
pub mod sync;

// Re-exports
pub use config::PublisherConfig;
pub use credentials::{resolve_credentials, Credentials, EnvSource, MapEnv, ProcessEnv};
pub use error::{ErrorKind, PublishError, Result};
pub use publisher::Publisher;
pub use request::{PublicationRequest, PublicationRequestBuilder};
pub use sync::{CatalogSynchronizer, SyncConfig, SyncReport};
