//! Integration test: generate a publication on disk and read it back.

use std::path::Path;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use cube_common::{DataCube, Dimension};
use zarr_stac::{
    Provider, StacGenerator, WriteParameters, ZarrCompression, ZarrStacGenerator, ZarrWriterConfig,
};
use zarrs::array::Array;
use zarrs::array_subset::ArraySubset;
use zarrs_filesystem::FilesystemStore;

fn create_cube() -> DataCube {
    let times = vec![
        Utc.with_ymd_and_hms(2023, 3, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2023, 3, 11, 0, 0, 0).unwrap(),
    ];
    let xs: Vec<f64> = (0..5).map(|i| 680_000.0 + i as f64 * 10.0).collect();
    let ys: Vec<f64> = (0..4).map(|i| 5_160_000.0 - i as f64 * 10.0).collect();
    // Value at (t, band, row, col) = t * 1000 + band * 100 + row * 10 + col
    let mut values = Vec::new();
    for t in 0..2 {
        for band in 0..2 {
            for row in 0..4 {
                for col in 0..5 {
                    values.push((t * 1000 + band * 100 + row * 10 + col) as f32);
                }
            }
        }
    }
    DataCube::new(
        vec![
            Dimension::temporal("t", times),
            Dimension::bands("bands", vec!["B04".into(), "B08".into()]),
            Dimension::spatial_y("y", ys),
            Dimension::spatial_x("x", xs),
        ],
        values,
    )
    .unwrap()
    .with_crs(32632)
}

fn create_params(output_folder: &Path, write_assets: bool) -> WriteParameters {
    WriteParameters {
        data: Arc::new(create_cube()),
        collection_id: "s2-l2a".into(),
        description: "Sentinel-2 red and NIR".into(),
        license: "CC-BY-4.0".into(),
        keywords: vec!["sentinel-2".into()],
        collection_url: "https://stac.example.org/collections/".into(),
        output_folder: output_folder.to_path_buf(),
        providers: vec![Provider::eurac_research()],
        sci_citation: None,
        sci_doi: None,
        links: vec![],
        write_collection_assets: write_assets,
        s3: None,
    }
}

#[tokio::test]
async fn test_values_survive_generation() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let params = create_params(temp_dir.path(), true);
    let generator = ZarrStacGenerator::new(ZarrWriterConfig {
        chunk_size: 2,
        ..Default::default()
    });

    let artifacts = generator.generate(&params, "s2-l2a").await.expect("generate");

    let store = Arc::new(FilesystemStore::new(&artifacts.zarr_store).expect("store"));
    let array = Array::open(store, "/").expect("open array");
    assert_eq!(array.shape(), &[2, 2, 4, 5]);

    let subset = ArraySubset::new_with_start_shape(vec![1, 1, 2, 0], vec![1, 1, 1, 5]).unwrap();
    let row: Vec<f32> = array.retrieve_array_subset_elements(&subset).expect("read");
    assert_eq!(row, vec![1120.0, 1121.0, 1122.0, 1123.0, 1124.0]);
}

#[tokio::test]
async fn test_documents_describe_cube() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let params = create_params(temp_dir.path(), false);
    let generator = ZarrStacGenerator::new(ZarrWriterConfig {
        compression: ZarrCompression::None,
        ..Default::default()
    });

    let artifacts = generator.generate(&params, "s2-l2a").await.expect("generate");

    let collection: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&artifacts.collection_document).unwrap()).unwrap();
    assert!(collection.get("assets").is_none());
    assert_eq!(collection["license"], "CC-BY-4.0");
    assert_eq!(
        collection["links"][0]["href"],
        "https://stac.example.org/collections/s2-l2a"
    );
    assert_eq!(
        collection["cube:dimensions"]["bands"]["values"],
        serde_json::json!(["B04", "B08"])
    );
    assert_eq!(
        collection["extent"]["temporal"]["interval"][0][0],
        "2023-03-01T00:00:00+00:00"
    );

    let items = std::fs::read_to_string(&artifacts.items_document).unwrap();
    let ids: Vec<String> = items
        .lines()
        .map(|line| {
            let item: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(item["properties"]["proj:epsg"], 32632);
            item["id"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(ids, vec!["s2-l2a_20230301T000000", "s2-l2a_20230311T000000"]);
}
