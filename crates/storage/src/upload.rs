//! Directory upload utilities.

use bytes::Bytes;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::object_store::{ObjectStorage, StoragePath};

/// Upload a local directory (e.g. a Zarr store) to object storage.
///
/// Recursively walks `local_path` and uploads every file to
/// `{storage_prefix}/{relative_path}`. Files are uploaded one at a time with
/// no retry; the first failure aborts the upload.
///
/// # Returns
/// Total bytes uploaded
pub async fn upload_directory(
    storage: &ObjectStorage,
    local_path: &Path,
    storage_prefix: &str,
) -> StorageResult<u64> {
    let mut total_size = 0u64;
    let mut file_count = 0usize;

    for entry in walkdir::WalkDir::new(local_path).sort_by_file_name() {
        let entry = entry.map_err(|e| StorageError::Walk(e.to_string()))?;

        if entry.file_type().is_file() {
            let relative_path = entry
                .path()
                .strip_prefix(local_path)
                .map_err(|e| StorageError::Walk(e.to_string()))?;

            // Object keys always use forward slashes.
            let relative = relative_path
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let storage_path = StoragePath::object_key(storage_prefix, &relative);

            let file_data = tokio::fs::read(entry.path()).await?;
            let file_size = file_data.len() as u64;
            total_size += file_size;
            file_count += 1;

            storage.put(&storage_path, Bytes::from(file_data)).await?;

            debug!(path = %storage_path, size = file_size, "Uploaded file");
        }
    }

    info!(
        prefix = %storage_prefix,
        files = file_count,
        bytes = total_size,
        "Uploaded directory"
    );

    Ok(total_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_directory_keeps_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store_dir = dir.path().join("cube.zarr");
        std::fs::create_dir_all(store_dir.join("c/0/0")).unwrap();
        std::fs::write(store_dir.join("zarr.json"), b"{\"zarr_format\":3}").unwrap();
        std::fs::write(store_dir.join("c/0/0/0"), vec![0u8; 16]).unwrap();

        let storage = ObjectStorage::in_memory("bucket");
        let bytes = upload_directory(&storage, &store_dir, "results/cube/cube.zarr")
            .await
            .unwrap();

        assert_eq!(bytes, 16 + 17);
        assert_eq!(
            storage.list("results/cube").await.unwrap(),
            vec![
                "results/cube/cube.zarr/c/0/0/0".to_string(),
                "results/cube/cube.zarr/zarr.json".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_upload_missing_directory_fails() {
        let storage = ObjectStorage::in_memory("bucket");
        let err = upload_directory(&storage, Path::new("/definitely/not/here"), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Walk(_)));
    }
}
