//! JSON datasets served by an in-memory provider.
//!
//! ```json
//! {
//!   "dataset_id": "hic-1",
//!   "headers": [{"name": "chr1", "start": 0, "stop": 5000, "minscore": -8, "maxscore": 8}],
//!   "data": [{"x1": 0, "y1": 0, "x2": 100, "y2": 100, "value": 2.5}]
//! }
//! ```

use crate::error::{CliError, CliResult};
use mrh_core::{DataPoint, Header, Source, DEFAULT_WINDOW_SIZE};
use mrh_render::StaticProvider;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub dataset_id: String,
    /// In display order; the first header is the default chromosome.
    pub headers: Vec<Header>,
    #[serde(default)]
    pub data: Vec<DataPoint>,
}

impl Dataset {
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Err(CliError::file_not_found(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let dataset: Dataset = serde_json::from_str(&content)?;
        if dataset.headers.is_empty() {
            return Err(CliError::dataset(format!("{} lists no chromosome headers", path.display())));
        }
        log::info!(
            "Loaded dataset {} ({} chromosomes, {} cells)",
            dataset.dataset_id,
            dataset.headers.len(),
            dataset.data.len()
        );
        Ok(dataset)
    }

    /// Stand-in used when no dataset is given: one chromosome scored -8..8.
    pub fn synthetic() -> Self {
        Self {
            dataset_id: "synthetic".to_string(),
            headers: vec![Header::new("chr1", 0, DEFAULT_WINDOW_SIZE, -8.0, 8.0)],
            data: Vec::new(),
        }
    }

    pub fn source(&self) -> CliResult<Source> {
        Source::new(self.dataset_id.clone(), self.headers.clone()).map_err(|e| CliError::dataset(e.to_string()))
    }

    pub fn provider(&self) -> StaticProvider {
        StaticProvider::new(self.dataset_id.clone(), self.data.clone())
    }
}
