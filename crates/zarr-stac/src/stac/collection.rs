//! STAC collection document.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use cube_common::{DataCube, DimensionType, Labels};

use super::join_url;
use super::types::{Asset, Extent, Link, Provider, SpatialExtent, TemporalInterval};
use crate::params::WriteParameters;

pub const STAC_VERSION: &str = "1.0.0";
pub const DATACUBE_EXTENSION: &str = "https://stac-extensions.github.io/datacube/v2.2.0/schema.json";
pub const SCIENTIFIC_EXTENSION: &str =
    "https://stac-extensions.github.io/scientific/v1.0.0/schema.json";

/// Collection document describing the whole published cube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(rename = "type")]
    pub type_: String,
    pub stac_version: String,
    pub stac_extensions: Vec<String>,
    pub id: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub license: String,
    pub providers: Vec<Provider>,
    pub extent: Extent,
    pub links: Vec<Link>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub assets: Map<String, Value>,
    #[serde(rename = "cube:dimensions")]
    pub cube_dimensions: Map<String, Value>,
    #[serde(rename = "sci:citation", default, skip_serializing_if = "Option::is_none")]
    pub sci_citation: Option<String>,
    #[serde(rename = "sci:doi", default, skip_serializing_if = "Option::is_none")]
    pub sci_doi: Option<String>,
}

impl Collection {
    /// Build the collection for `params`, with `zarr_href` as the data location.
    pub fn from_params(params: &WriteParameters, zarr_href: &str) -> Self {
        let cube = params.data.as_ref();

        let mut stac_extensions = vec![DATACUBE_EXTENSION.to_string()];
        if params.sci_citation.is_some() || params.sci_doi.is_some() {
            stac_extensions.push(SCIENTIFIC_EXTENSION.to_string());
        }

        let mut links = vec![
            Link::new("self", join_url(&params.collection_url, &[&params.collection_id])).json(),
            Link::new("items", collection_items_url(params)).json(),
        ];
        links.extend(params.links.iter().cloned());

        let mut assets = Map::new();
        if params.write_collection_assets {
            let asset = Asset::zarr(zarr_href, format!("{} Zarr store", params.collection_id));
            assets.insert("data".to_string(), json!(asset));
        }

        Self {
            type_: "Collection".to_string(),
            stac_version: STAC_VERSION.to_string(),
            stac_extensions,
            id: params.collection_id.clone(),
            description: params.description.clone(),
            keywords: params.keywords.clone(),
            license: params.license.clone(),
            providers: params.providers.clone(),
            extent: cube_extent(cube),
            links,
            assets,
            cube_dimensions: cube_dimensions(cube),
            sci_citation: params.sci_citation.clone(),
            sci_doi: params.sci_doi.clone(),
        }
    }
}

pub(crate) fn collection_items_url(params: &WriteParameters) -> String {
    join_url(&params.collection_url, &[&params.collection_id, "items"])
}

/// Spatial and temporal extent. Whole-world and open intervals when unknown.
pub fn cube_extent(cube: &DataCube) -> Extent {
    let bbox = cube
        .spatial_bbox()
        .map(|b| b.to_stac())
        .unwrap_or([-180.0, -90.0, 180.0, 90.0]);

    let interval = match cube.temporal_extent() {
        Some(extent) => [
            Some(extent.start.to_rfc3339()),
            Some(extent.end.to_rfc3339()),
        ],
        None => [None, None],
    };

    Extent {
        spatial: SpatialExtent { bbox: vec![bbox] },
        temporal: TemporalInterval {
            interval: vec![interval],
        },
    }
}

/// `cube:dimensions` entries keyed by dimension name.
pub fn cube_dimensions(cube: &DataCube) -> Map<String, Value> {
    cube.dimensions()
        .iter()
        .map(|dim| {
            let mut entry = Map::new();
            entry.insert("type".to_string(), json!(dim.dim_type.stac_type()));
            if let Some(axis) = dim.dim_type.axis() {
                entry.insert("axis".to_string(), json!(axis));
                if let Some(epsg) = cube.crs() {
                    entry.insert("reference_system".to_string(), json!(epsg));
                }
            }

            match &dim.labels {
                Labels::Numeric(values) if dim.dim_type != DimensionType::Other => {
                    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    entry.insert("extent".to_string(), json!([min, max]));
                }
                Labels::Temporal(times) => {
                    let start = times.iter().min().map(|t| t.to_rfc3339());
                    let end = times.iter().max().map(|t| t.to_rfc3339());
                    entry.insert("extent".to_string(), json!([start, end]));
                }
                labels => {
                    entry.insert("values".to_string(), Value::Array(labels.to_json_values()));
                }
            }

            (dim.name.clone(), Value::Object(entry))
        })
        .collect()
}
