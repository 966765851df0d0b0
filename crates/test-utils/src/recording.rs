//! A [`StacGenerator`] that records its calls instead of writing Zarr.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use zarr_stac::{StacArtifacts, StacGenerator, WriteParameters, WriterError};

use crate::fixtures::items_ndjson;

/// Records every call and writes small placeholder documents at the
/// standard artifact paths.
pub struct RecordingGenerator {
    calls: Mutex<Vec<(WriteParameters, String)>>,
    items: usize,
    write_collection: bool,
    write_items: bool,
    failure: Option<String>,
}

impl Default for RecordingGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingGenerator {
    /// Writes a collection document and three item lines.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            items: 3,
            write_collection: true,
            write_items: true,
            failure: None,
        }
    }

    pub fn with_items(mut self, items: usize) -> Self {
        self.items = items;
        self
    }

    /// Report success without writing the collection document.
    pub fn without_collection(mut self) -> Self {
        self.write_collection = false;
        self
    }

    /// Report success without writing the items document.
    pub fn without_items(mut self) -> Self {
        self.write_items = false;
        self
    }

    /// Fail every call with a Zarr error carrying `message`.
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// `(params, item_id)` for every call so far.
    pub fn calls(&self) -> Vec<(WriteParameters, String)> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), WriterError> {
        std::fs::write(path, contents).map_err(WriterError::io(path))
    }
}

#[async_trait]
impl StacGenerator for RecordingGenerator {
    async fn generate(
        &self,
        params: &WriteParameters,
        item_id: &str,
    ) -> Result<StacArtifacts, WriterError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((params.clone(), item_id.to_string()));

        if let Some(message) = &self.failure {
            return Err(WriterError::Zarr(message.clone()));
        }

        std::fs::create_dir_all(&params.output_folder)
            .map_err(WriterError::io(&params.output_folder))?;
        let artifacts = StacArtifacts::locate(&params.output_folder, &params.collection_id);

        if self.write_collection {
            let collection = serde_json::json!({
                "type": "Collection",
                "id": params.collection_id,
                "description": params.description,
            });
            self.write(&artifacts.collection_document, &collection.to_string())?;
        }
        if self.write_items {
            self.write(
                &artifacts.items_document,
                &items_ndjson(&params.collection_id, self.items),
            )?;
        }

        Ok(artifacts)
    }
}
