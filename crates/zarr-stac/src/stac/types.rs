//! Building blocks shared by collection and item documents.

use serde::{Deserialize, Serialize};

/// Media type of a Zarr store asset.
pub const ZARR_MEDIA_TYPE: &str = "application/vnd+zarr";

/// An organization responsible for the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Provider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            roles: Vec::new(),
            url: None,
        }
    }

    /// Provider applied when a publication names none.
    pub fn eurac_research() -> Self {
        Self {
            name: "Eurac Research - Institute for Earth Observation".to_string(),
            description: None,
            roles: vec!["processor".to_string()],
            url: Some("http://www.eurac.edu".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            media_type: None,
            title: None,
        }
    }

    pub fn json(mut self) -> Self {
        self.media_type = Some("application/json".to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub href: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl Asset {
    /// Data asset pointing at a Zarr store.
    pub fn zarr(href: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            media_type: Some(ZARR_MEDIA_TYPE.to_string()),
            title: Some(title.into()),
            roles: vec!["data".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialExtent {
    pub bbox: Vec<[f64; 4]>,
}

/// Open intervals use `null` for the missing end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalInterval {
    pub interval: Vec<[Option<String>; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub spatial: SpatialExtent,
    pub temporal: TemporalInterval,
}
