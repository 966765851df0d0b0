//! End-to-end tests for `Publisher::publish`.

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use publication::credentials::{ACCESS_KEY_VAR, SECRET_KEY_VAR};
use publication::{ErrorKind, MapEnv, PublicationRequest, PublishError, Publisher, PublisherConfig};
use storage::ObjectStorage;
use test_utils::{
    ndvi_cube, static_cube, temp_output_dir, CatalogBehavior, MockCatalog, RecordingGenerator,
    NDVI_COLLECTION_ID,
};
use zarr_stac::{Provider, ZarrCompression, ZarrStacGenerator, ZarrWriterConfig};

fn credentials() -> MapEnv {
    MapEnv::new()
        .with(ACCESS_KEY_VAR, "AKIAEXAMPLE")
        .with(SECRET_KEY_VAR, "example-secret")
}

fn publisher(generator: Arc<RecordingGenerator>, env: MapEnv, root: &std::path::Path) -> Publisher {
    Publisher::new(
        generator,
        Arc::new(env),
        PublisherConfig::default().with_output_root(root),
    )
    .unwrap()
}

#[tokio::test]
async fn publish_returns_the_input_cube() {
    let dir = temp_output_dir();
    let generator = Arc::new(RecordingGenerator::new());
    let publisher = publisher(Arc::clone(&generator), MapEnv::new(), dir.path());

    let cube = Arc::new(ndvi_cube(2, 4, 3));
    let request = PublicationRequest::builder(
        Arc::clone(&cube),
        NDVI_COLLECTION_ID,
        "http://unused.invalid/collections",
        "NDVI",
    )
    .build()
    .unwrap();

    let returned = publisher.publish(request).await.unwrap();
    assert!(Arc::ptr_eq(&returned, &cube));
    assert_eq!(generator.call_count(), 1);
}

#[tokio::test]
async fn publish_builds_write_parameters() {
    let dir = temp_output_dir();
    let generator = Arc::new(RecordingGenerator::new());
    let publisher = publisher(Arc::clone(&generator), MapEnv::new(), dir.path());

    let request = PublicationRequest::builder(
        Arc::new(ndvi_cube(1, 2, 2)),
        NDVI_COLLECTION_ID,
        "https://stac.example.org/collections",
        "NDVI composite",
    )
    .keywords(vec!["ndvi".into(), "sentinel-2".into()])
    .sci_doi("10.5281/zenodo.123")
    .write_collection_assets(false)
    .context(serde_json::json!({"job": 7}))
    .build()
    .unwrap();

    publisher.publish(request).await.unwrap();

    let calls = generator.calls();
    let (params, item_id) = &calls[0];
    assert_eq!(item_id, NDVI_COLLECTION_ID);
    assert_eq!(params.collection_id, NDVI_COLLECTION_ID);
    assert_eq!(params.output_folder, dir.path().join(NDVI_COLLECTION_ID));
    assert_eq!(params.license, "Apache-2.0");
    assert_eq!(params.keywords, vec!["ndvi", "sentinel-2"]);
    assert_eq!(params.providers, vec![Provider::eurac_research()]);
    assert_eq!(params.sci_doi.as_deref(), Some("10.5281/zenodo.123"));
    assert!(params.sci_citation.is_none());
    assert!(params.links.is_empty());
    assert!(!params.write_collection_assets);
    assert!(params.s3.is_none());
}

#[tokio::test]
async fn output_location_override() {
    let dir = temp_output_dir();
    let generator = Arc::new(RecordingGenerator::new());
    let publisher = publisher(Arc::clone(&generator), MapEnv::new(), dir.path());
    let custom = dir.path().join("elsewhere");

    let request = PublicationRequest::builder(Arc::new(ndvi_cube(1, 2, 2)), "a", "http://x", "d")
        .output_location(&custom)
        .build()
        .unwrap();
    publisher.publish(request).await.unwrap();

    assert_eq!(generator.calls()[0].0.output_folder, custom);
    assert!(custom.join("a.json").exists());
}

#[tokio::test]
async fn s3_upload_without_credentials_fails_before_any_side_effect() {
    let dir = temp_output_dir();
    let catalog = MockCatalog::start().await;
    let generator = Arc::new(RecordingGenerator::new());
    let env = MapEnv::new().with(ACCESS_KEY_VAR, "AKIAEXAMPLE");
    let publisher = publisher(Arc::clone(&generator), env, dir.path());

    let request = PublicationRequest::builder(
        Arc::new(ndvi_cube(1, 2, 2)),
        NDVI_COLLECTION_ID,
        catalog.collections_url(),
        "NDVI",
    )
    .s3_upload(true)
    .s3_endpoint_url("http://minio:9000")
    .bucket_name("cubes")
    .post_to_stac(true)
    .build()
    .unwrap();

    let err = publisher.publish(request).await.unwrap_err();
    assert!(matches!(err, PublishError::MissingCredentials { .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(generator.call_count(), 0);
    assert!(catalog.requests().is_empty());
    assert!(!dir.path().join(NDVI_COLLECTION_ID).exists());
}

#[tokio::test]
async fn s3_upload_without_endpoint_or_bucket_fails_before_write() {
    let dir = temp_output_dir();
    let generator = Arc::new(RecordingGenerator::new());
    let publisher = publisher(Arc::clone(&generator), credentials(), dir.path());

    let base = || {
        PublicationRequest::builder(Arc::new(ndvi_cube(1, 2, 2)), "a", "http://x", "d")
            .s3_upload(true)
    };

    let err = publisher
        .publish(base().bucket_name("cubes").build().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::MissingS3Setting("s3_endpoint_url")));

    let err = publisher
        .publish(
            base()
                .s3_endpoint_url("http://minio:9000")
                .bucket_name("")
                .build()
                .unwrap(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::MissingS3Setting("bucket_name")));

    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn s3_upload_passes_resolved_target() {
    let dir = temp_output_dir();
    let generator = Arc::new(RecordingGenerator::new());
    let publisher = publisher(Arc::clone(&generator), credentials(), dir.path());

    let request = PublicationRequest::builder(Arc::new(ndvi_cube(1, 2, 2)), "a", "http://x", "d")
        .s3_upload(true)
        .s3_endpoint_url("http://minio:9000")
        .bucket_name("cubes")
        .build()
        .unwrap();
    publisher.publish(request).await.unwrap();

    let target = generator.calls()[0].0.s3.clone().expect("s3 target");
    assert_eq!(target.endpoint_url, "http://minio:9000");
    assert_eq!(target.bucket_name, "cubes");
    assert_eq!(target.bucket_file_prefix, "");
    assert_eq!(target.access_key_id, "AKIAEXAMPLE");
    assert_eq!(target.secret_access_key, "example-secret");
}

#[tokio::test]
async fn writer_errors_pass_through_unchanged() {
    let dir = temp_output_dir();
    let catalog = MockCatalog::start().await;
    let generator = Arc::new(RecordingGenerator::new().failing("disk full"));
    let publisher = publisher(Arc::clone(&generator), MapEnv::new(), dir.path());

    let request = PublicationRequest::builder(
        Arc::new(ndvi_cube(1, 2, 2)),
        "a",
        catalog.collections_url(),
        "d",
    )
    .post_to_stac(true)
    .build()
    .unwrap();

    let err = publisher.publish(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StorageWriter);
    assert_eq!(err.to_string(), "Zarr write failed: disk full");
    assert!(catalog.requests().is_empty());
}

#[tokio::test]
async fn missing_collection_document_is_reported_without_network_calls() {
    let dir = temp_output_dir();
    let catalog = MockCatalog::start().await;
    let generator = Arc::new(RecordingGenerator::new().without_collection());
    let publisher = publisher(Arc::clone(&generator), MapEnv::new(), dir.path());

    let request = PublicationRequest::builder(
        Arc::new(ndvi_cube(1, 2, 2)),
        NDVI_COLLECTION_ID,
        catalog.collections_url(),
        "NDVI",
    )
    .post_to_stac(true)
    .build()
    .unwrap();

    let err = publisher.publish(request).await.unwrap_err();
    match err {
        PublishError::MissingArtifact { path } => {
            assert_eq!(
                path,
                dir.path()
                    .join(NDVI_COLLECTION_ID)
                    .join(format!("{}.json", NDVI_COLLECTION_ID))
            );
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(catalog.requests().is_empty());
}

#[tokio::test]
async fn missing_items_document_is_reported_without_network_calls() {
    let dir = temp_output_dir();
    let catalog = MockCatalog::start().await;
    let generator = Arc::new(RecordingGenerator::new().without_items());
    let publisher = publisher(Arc::clone(&generator), MapEnv::new(), dir.path());

    let request = PublicationRequest::builder(
        Arc::new(ndvi_cube(1, 2, 2)),
        NDVI_COLLECTION_ID,
        catalog.collections_url(),
        "NDVI",
    )
    .post_to_stac(true)
    .build()
    .unwrap();

    let err = publisher.publish(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingArtifact);
    match err {
        PublishError::MissingArtifact { path } => {
            assert_eq!(
                path,
                dir.path().join(NDVI_COLLECTION_ID).join("inline_items.csv")
            );
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(generator.call_count(), 1);
    assert!(catalog.requests().is_empty());
}

#[tokio::test]
async fn repeated_publication_deletes_before_each_create() {
    let dir = temp_output_dir();
    let catalog = MockCatalog::start().await;
    let generator = Arc::new(RecordingGenerator::new().with_items(1));
    let publisher = publisher(Arc::clone(&generator), MapEnv::new(), dir.path());

    for _ in 0..2 {
        let request = PublicationRequest::builder(
            Arc::new(ndvi_cube(1, 2, 2)),
            NDVI_COLLECTION_ID,
            catalog.collections_url(),
            "NDVI",
        )
        .post_to_stac(true)
        .build()
        .unwrap();
        publisher.publish(request).await.unwrap();
    }

    let once = vec![
        (Method::DELETE, "/collections/ndvi-2024".to_string()),
        (Method::POST, "/collections".to_string()),
        (Method::POST, "/collections/ndvi-2024/items".to_string()),
    ];
    assert_eq!(catalog.calls(), [once.clone(), once].concat());
}

#[tokio::test]
async fn third_item_rejected_with_three_lines() {
    let dir = temp_output_dir();
    let catalog = MockCatalog::start_with(CatalogBehavior::default().fail_item(
        3,
        StatusCode::INTERNAL_SERVER_ERROR,
        "conflict",
    ))
    .await;
    let generator = Arc::new(RecordingGenerator::new().with_items(3));
    let publisher = publisher(Arc::clone(&generator), MapEnv::new(), dir.path());

    let request = PublicationRequest::builder(
        Arc::new(ndvi_cube(3, 2, 2)),
        NDVI_COLLECTION_ID,
        catalog.collections_url(),
        "NDVI",
    )
    .post_to_stac(true)
    .build()
    .unwrap();

    let err = publisher.publish(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RemoteRegistration);
    assert!(err.to_string().contains("conflict"));

    let calls = catalog.calls();
    assert_eq!(calls[0], (Method::DELETE, "/collections/ndvi-2024".to_string()));
    assert_eq!(calls[1], (Method::POST, "/collections".to_string()));
    assert_eq!(catalog.item_posts().len(), 3);
}

#[tokio::test]
async fn third_item_rejected_with_four_lines_stops_after_three_attempts() {
    let dir = temp_output_dir();
    let catalog = MockCatalog::start_with(CatalogBehavior::default().fail_item(
        3,
        StatusCode::INTERNAL_SERVER_ERROR,
        "conflict",
    ))
    .await;
    let generator = Arc::new(RecordingGenerator::new().with_items(4));
    let publisher = publisher(Arc::clone(&generator), MapEnv::new(), dir.path());

    let request = PublicationRequest::builder(
        Arc::new(ndvi_cube(4, 2, 2)),
        NDVI_COLLECTION_ID,
        catalog.collections_url(),
        "NDVI",
    )
    .post_to_stac(true)
    .build()
    .unwrap();

    let err = publisher.publish(request).await.unwrap_err();
    match err {
        PublishError::RemoteRegistration { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "conflict");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let posted: Vec<String> = catalog
        .item_posts()
        .iter()
        .map(|r| r.body.as_ref().unwrap()["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(posted, vec!["ndvi-2024_1", "ndvi-2024_2", "ndvi-2024_3"]);
}

#[tokio::test]
async fn zarr_generator_publishes_and_registers() {
    let dir = temp_output_dir();
    let catalog = MockCatalog::start().await;
    let storage = Arc::new(ObjectStorage::in_memory("cubes"));
    let generator = ZarrStacGenerator::new(ZarrWriterConfig {
        compression: ZarrCompression::BloscLz4,
        chunk_size: 8,
        ..Default::default()
    })
    .with_object_storage(Arc::clone(&storage));

    let publisher = Publisher::new(
        Arc::new(generator),
        Arc::new(credentials()),
        PublisherConfig::default().with_output_root(dir.path()),
    )
    .unwrap();

    let cube = Arc::new(ndvi_cube(2, 10, 6));
    let request = PublicationRequest::builder(
        Arc::clone(&cube),
        NDVI_COLLECTION_ID,
        catalog.collections_url(),
        "NDVI composite",
    )
    .s3_upload(true)
    .s3_endpoint_url("http://minio:9000")
    .bucket_name("cubes")
    .bucket_file_prefix("openeo/")
    .post_to_stac(true)
    .build()
    .unwrap();

    let returned = publisher.publish(request).await.unwrap();
    assert!(Arc::ptr_eq(&returned, &cube));

    let out = dir.path().join(NDVI_COLLECTION_ID);
    assert!(out.join("ndvi-2024.json").exists());
    assert!(out.join("inline_items.csv").exists());
    assert!(out.join("ndvi-2024.zarr").join("zarr.json").exists());
    assert!(storage
        .exists("openeo/ndvi-2024/ndvi-2024.zarr/zarr.json")
        .await
        .unwrap());

    let items = catalog.item_posts();
    assert_eq!(items.len(), 2);
    assert_eq!(
        items[0].body.as_ref().unwrap()["id"],
        "ndvi-2024_20240101T000000"
    );
    let collection = catalog.requests()[1].body.clone().unwrap();
    assert_eq!(collection["id"], NDVI_COLLECTION_ID);
    assert_eq!(collection["providers"][0]["roles"][0], "processor");
}

#[tokio::test]
async fn cube_without_time_publishes_single_item() {
    let dir = temp_output_dir();
    let catalog = MockCatalog::start().await;
    let generator = ZarrStacGenerator::new(ZarrWriterConfig::default());
    let publisher = Publisher::new(
        Arc::new(generator),
        Arc::new(MapEnv::new()),
        PublisherConfig::default().with_output_root(dir.path()),
    )
    .unwrap();

    let request = PublicationRequest::builder(
        Arc::new(static_cube(3, 3)),
        "dem",
        catalog.collections_url(),
        "Elevation",
    )
    .post_to_stac(true)
    .build()
    .unwrap();
    publisher.publish(request).await.unwrap();

    let items = catalog.item_posts();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].body.as_ref().unwrap()["id"], "dem");
    assert_eq!(
        items[0].body.as_ref().unwrap()["properties"]["datetime"],
        serde_json::Value::Null
    );
}
