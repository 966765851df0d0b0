//! Publication requests.

use std::path::PathBuf;
use std::sync::Arc;

use cube_common::DataCube;
use zarr_stac::{Link, Provider};

use crate::error::{PublishError, Result};

pub const DEFAULT_LICENSE: &str = "Apache-2.0";

/// All inputs of one publication. Built with [`PublicationRequest::builder`].
#[derive(Debug, Clone)]
pub struct PublicationRequest {
    pub data: Arc<DataCube>,
    /// Collection id, item id base and default output folder name.
    pub item_id: String,
    pub collection_url: String,
    pub description: String,
    pub write_collection_assets: bool,
    pub license: String,
    pub keywords: Vec<String>,
    /// Never empty; defaults to [`Provider::eurac_research`].
    pub providers: Vec<Provider>,
    pub sci_citation: Option<String>,
    pub sci_doi: Option<String>,
    pub links: Vec<Link>,
    pub s3_upload: bool,
    pub s3_endpoint_url: Option<String>,
    pub bucket_name: Option<String>,
    pub bucket_file_prefix: String,
    pub post_to_stac: bool,
    /// Overrides `{output_root}/{item_id}`.
    pub output_location: Option<PathBuf>,
    /// Caller context, carried through untouched.
    pub context: Option<serde_json::Value>,
}

impl PublicationRequest {
    pub fn builder(
        data: Arc<DataCube>,
        item_id: impl Into<String>,
        collection_url: impl Into<String>,
        description: impl Into<String>,
    ) -> PublicationRequestBuilder {
        PublicationRequestBuilder {
            request: PublicationRequest {
                data,
                item_id: item_id.into(),
                collection_url: collection_url.into(),
                description: description.into(),
                write_collection_assets: true,
                license: DEFAULT_LICENSE.to_string(),
                keywords: Vec::new(),
                providers: Vec::new(),
                sci_citation: None,
                sci_doi: None,
                links: Vec::new(),
                s3_upload: false,
                s3_endpoint_url: None,
                bucket_name: None,
                bucket_file_prefix: String::new(),
                post_to_stac: false,
                output_location: None,
                context: None,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct PublicationRequestBuilder {
    request: PublicationRequest,
}

impl PublicationRequestBuilder {
    pub fn write_collection_assets(mut self, enabled: bool) -> Self {
        self.request.write_collection_assets = enabled;
        self
    }

    pub fn license(mut self, license: impl Into<String>) -> Self {
        self.request.license = license.into();
        self
    }

    pub fn keywords(mut self, keywords: Vec<String>) -> Self {
        self.request.keywords = keywords;
        self
    }

    pub fn providers(mut self, providers: Vec<Provider>) -> Self {
        self.request.providers = providers;
        self
    }

    pub fn sci_citation(mut self, citation: impl Into<String>) -> Self {
        self.request.sci_citation = Some(citation.into());
        self
    }

    pub fn sci_doi(mut self, doi: impl Into<String>) -> Self {
        self.request.sci_doi = Some(doi.into());
        self
    }

    pub fn links(mut self, links: Vec<Link>) -> Self {
        self.request.links = links;
        self
    }

    /// Enable upload to an S3-compatible endpoint.
    pub fn s3_upload(mut self, enabled: bool) -> Self {
        self.request.s3_upload = enabled;
        self
    }

    pub fn s3_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.request.s3_endpoint_url = Some(url.into());
        self
    }

    pub fn bucket_name(mut self, bucket: impl Into<String>) -> Self {
        self.request.bucket_name = Some(bucket.into());
        self
    }

    pub fn bucket_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.request.bucket_file_prefix = prefix.into();
        self
    }

    /// Register the generated documents with the remote catalog.
    pub fn post_to_stac(mut self, enabled: bool) -> Self {
        self.request.post_to_stac = enabled;
        self
    }

    pub fn output_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.request.output_location = Some(path.into());
        self
    }

    pub fn context(mut self, context: serde_json::Value) -> Self {
        self.request.context = Some(context);
        self
    }

    pub fn build(mut self) -> Result<PublicationRequest> {
        validate_identifier(&self.request.item_id)?;
        if self.request.providers.is_empty() {
            self.request.providers = vec![Provider::eurac_research()];
        }
        Ok(self.request)
    }
}

/// Identifiers become a directory name and a URL path segment.
pub fn validate_identifier(id: &str) -> Result<()> {
    let invalid = |reason| {
        Err(PublishError::InvalidIdentifier {
            id: id.to_string(),
            reason,
        })
    };

    if id.is_empty() {
        return invalid("must not be empty");
    }
    if id == "." || id == ".." {
        return invalid("must not be a relative path component");
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
    {
        return invalid("only ASCII letters, digits, '-', '_', '.' and '~' are allowed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::ndvi_cube;

    #[test]
    fn test_builder_defaults() {
        let request = PublicationRequest::builder(
            Arc::new(ndvi_cube(1, 2, 2)),
            "ndvi-2024",
            "https://stac.example.org/collections",
            "NDVI",
        )
        .build()
        .unwrap();

        assert!(request.write_collection_assets);
        assert_eq!(request.license, "Apache-2.0");
        assert!(request.keywords.is_empty());
        assert_eq!(request.providers, vec![Provider::eurac_research()]);
        assert!(request.links.is_empty());
        assert!(!request.s3_upload);
        assert!(!request.post_to_stac);
        assert_eq!(request.bucket_file_prefix, "");
        assert!(request.output_location.is_none());
    }

    #[test]
    fn test_explicit_providers_kept() {
        let request = PublicationRequest::builder(Arc::new(ndvi_cube(1, 2, 2)), "a", "u", "d")
            .providers(vec![Provider::new("ACME")])
            .build()
            .unwrap();
        assert_eq!(request.providers[0].name, "ACME");
        assert_eq!(request.providers.len(), 1);
    }

    #[test]
    fn test_identifier_validation() {
        assert!(validate_identifier("ndvi-2024").is_ok());
        assert!(validate_identifier("s2_l2a.v1~rc").is_ok());
        for bad in ["", ".", "..", "a/b", "a b", "a?b", "a#b", "a%20", "a\\b", "ü"] {
            assert!(
                matches!(
                    validate_identifier(bad),
                    Err(PublishError::InvalidIdentifier { .. })
                ),
                "{:?} should be rejected",
                bad
            );
        }
    }
}
