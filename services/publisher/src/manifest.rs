//! YAML publication manifests.
//!
//! A manifest carries every publication setting except the cube itself.
//! `${VAR}` and `${VAR:-default}` are expanded before parsing, so endpoints
//! and buckets can come from the deployment environment.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cube_common::DataCube;
use publication::{EnvSource, PublicationRequest};
use zarr_stac::{Link, Provider};

fn default_true() -> bool {
    true
}

fn default_license() -> String {
    publication::request::DEFAULT_LICENSE.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublicationManifest {
    pub item_id: String,
    pub collection_url: String,
    pub description: String,
    #[serde(default = "default_true")]
    pub write_collection_assets: bool,
    #[serde(default = "default_license")]
    pub license: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub providers: Vec<Provider>,
    #[serde(default)]
    pub sci_citation: Option<String>,
    #[serde(default)]
    pub sci_doi: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub s3_upload: bool,
    #[serde(default)]
    pub s3_endpoint_url: Option<String>,
    #[serde(default)]
    pub bucket_name: Option<String>,
    #[serde(default)]
    pub bucket_file_prefix: String,
    #[serde(default)]
    pub post_to_stac: bool,
    #[serde(default)]
    pub output_location: Option<PathBuf>,
    #[serde(default)]
    pub context: Option<serde_json::Value>,
}

impl PublicationManifest {
    pub fn load<P: AsRef<Path>>(path: P, env: &dyn EnvSource) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest from {:?}", path))?;
        Self::parse(&content, env).with_context(|| format!("Invalid manifest {:?}", path))
    }

    pub fn parse(content: &str, env: &dyn EnvSource) -> Result<Self> {
        let expanded = expand_env_vars(content, env)?;
        serde_yaml::from_str(&expanded).context("Failed to parse publication manifest")
    }

    pub fn into_request(self, data: Arc<DataCube>) -> Result<PublicationRequest> {
        let mut builder =
            PublicationRequest::builder(data, self.item_id, self.collection_url, self.description)
                .write_collection_assets(self.write_collection_assets)
                .license(self.license)
                .keywords(self.keywords)
                .providers(self.providers)
                .links(self.links)
                .s3_upload(self.s3_upload)
                .bucket_file_prefix(self.bucket_file_prefix)
                .post_to_stac(self.post_to_stac);

        if let Some(citation) = self.sci_citation {
            builder = builder.sci_citation(citation);
        }
        if let Some(doi) = self.sci_doi {
            builder = builder.sci_doi(doi);
        }
        if let Some(endpoint) = self.s3_endpoint_url {
            builder = builder.s3_endpoint_url(endpoint);
        }
        if let Some(bucket) = self.bucket_name {
            builder = builder.bucket_name(bucket);
        }
        if let Some(location) = self.output_location {
            builder = builder.output_location(location);
        }
        if let Some(context) = self.context {
            builder = builder.context(context);
        }

        Ok(builder.build()?)
    }
}

/// Expand `${VAR}` and `${VAR:-default}`.
fn expand_env_vars(content: &str, env: &dyn EnvSource) -> Result<String> {
    let mut result = String::new();
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut var_expr = String::new();
            let mut brace_count = 1;

            while brace_count > 0 {
                match chars.next() {
                    Some('{') => {
                        brace_count += 1;
                        var_expr.push('{');
                    }
                    Some('}') => {
                        brace_count -= 1;
                        if brace_count > 0 {
                            var_expr.push('}');
                        }
                    }
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }

            result.push_str(&resolve_var_expr(&var_expr, env)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

fn resolve_var_expr(expr: &str, env: &dyn EnvSource) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match env.var(var_name.trim()) {
            Some(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        env.var(expr.trim())
            .with_context(|| format!("Environment variable {} not set", expr))
    }
}
