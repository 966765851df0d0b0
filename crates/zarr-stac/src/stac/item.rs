//! STAC item documents, one per time step.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::collection::{collection_items_url, STAC_VERSION};
use super::join_url;
use super::types::{Asset, Link};
use crate::params::WriteParameters;

pub const PROJECTION_EXTENSION: &str =
    "https://stac-extensions.github.io/projection/v1.1.0/schema.json";

/// GeoJSON feature describing one granule of the cube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "type")]
    pub type_: String,
    pub stac_version: String,
    pub stac_extensions: Vec<String>,
    pub id: String,
    pub collection: String,
    pub geometry: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,
    pub properties: Map<String, Value>,
    pub links: Vec<Link>,
    pub assets: Map<String, Value>,
}

/// Item id for a time step: `{base}_{YYYYMMDDTHHMMSS}`.
pub fn item_id(base: &str, time: Option<&DateTime<Utc>>) -> String {
    match time {
        Some(t) => format!("{}_{}", base, t.format("%Y%m%dT%H%M%S")),
        None => base.to_string(),
    }
}

/// One item per temporal label, or a single item when the cube has no time axis.
///
/// Item ids are derived from `base_id`. Labels that fall in the same second
/// get an occurrence suffix (`_1`, `_2`, ...) so ids stay unique.
pub fn items_from_params(params: &WriteParameters, base_id: &str, zarr_href: &str) -> Vec<Item> {
    let times: Vec<Option<DateTime<Utc>>> = params
        .data
        .dimension_of_type(cube_common::DimensionType::Temporal)
        .and_then(|d| d.labels.as_temporal())
        .map(|ts| ts.iter().copied().map(Some).collect())
        .unwrap_or_else(|| vec![None]);

    let ids: Vec<String> = times.iter().map(|t| item_id(base_id, t.as_ref())).collect();
    let mut totals: HashMap<&str, usize> = HashMap::new();
    for id in &ids {
        *totals.entry(id.as_str()).or_default() += 1;
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    ids.iter()
        .zip(times.iter())
        .map(|(id, time)| {
            let id = if totals[id.as_str()] > 1 {
                let n = seen.entry(id.as_str()).or_default();
                *n += 1;
                format!("{}_{}", id, n)
            } else {
                id.clone()
            };
            build_item(params, id, zarr_href, *time)
        })
        .collect()
}

fn build_item(
    params: &WriteParameters,
    id: String,
    zarr_href: &str,
    time: Option<DateTime<Utc>>,
) -> Item {
    let cube = params.data.as_ref();
    let bbox = cube.spatial_bbox();

    let mut properties = Map::new();
    properties.insert(
        "datetime".to_string(),
        time.map(|t| json!(t.to_rfc3339())).unwrap_or(Value::Null),
    );

    let mut stac_extensions = Vec::new();
    if let Some(epsg) = cube.crs() {
        properties.insert("proj:epsg".to_string(), json!(epsg));
        stac_extensions.push(PROJECTION_EXTENSION.to_string());
    }

    let collection_href = join_url(&params.collection_url, &[&params.collection_id]);
    let links = vec![
        Link::new("collection", &collection_href).json(),
        Link::new("parent", &collection_href).json(),
        Link::new("self", join_url(&collection_items_url(params), &[&id])).json(),
    ];

    let mut assets = Map::new();
    assets.insert(
        "data".to_string(),
        json!(Asset::zarr(zarr_href, format!("{} Zarr store", params.collection_id))),
    );

    Item {
        type_: "Feature".to_string(),
        stac_version: STAC_VERSION.to_string(),
        stac_extensions,
        id,
        collection: params.collection_id.clone(),
        geometry: bbox.map(|b| {
            json!({
                "type": "Polygon",
                "coordinates": [b.to_polygon_ring()],
            })
        }),
        bbox: bbox.map(|b| b.to_stac()),
        properties,
        links,
        assets,
    }
}
