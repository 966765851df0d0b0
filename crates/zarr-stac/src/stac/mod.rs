//! STAC documents generated for a published cube.

mod collection;
mod item;
mod types;

pub use collection::{
    cube_dimensions, cube_extent, Collection, DATACUBE_EXTENSION, SCIENTIFIC_EXTENSION,
    STAC_VERSION,
};
pub use item::{item_id, items_from_params, Item, PROJECTION_EXTENSION};
pub use types::{
    Asset, Extent, Link, Provider, SpatialExtent, TemporalInterval, ZARR_MEDIA_TYPE,
};

/// Join URL path segments onto `base` with exactly one `/` between parts.
///
/// `https://host/collections/` and `https://host/collections` give the same
/// result.
pub fn join_url(base: &str, segments: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in segments {
        let segment = segment.trim_matches('/');
        if segment.is_empty() {
            continue;
        }
        url.push('/');
        url.push_str(segment);
    }
    url
}
