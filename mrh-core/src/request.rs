//! Wire shapes exchanged with the data-fetch collaborator.

use crate::types::{DataPoint, GenomicPos, ResolutionPair, Viewport};
use serde::{Deserialize, Serialize};

/// Parameters for one layer fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub dataset_id: String,
    pub chrom1: String,
    pub start1: GenomicPos,
    pub stop1: GenomicPos,
    pub chrom2: String,
    pub start2: GenomicPos,
    pub stop2: GenomicPos,
    pub min_resolution: GenomicPos,
    pub max_resolution: GenomicPos,
}

impl FetchRequest {
    pub fn new(dataset_id: impl Into<String>, viewport: &Viewport, resolution: ResolutionPair) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            chrom1: viewport.chrom1.clone(),
            start1: viewport.start1,
            stop1: viewport.stop1,
            chrom2: viewport.chrom2.clone(),
            start2: viewport.start2,
            stop2: viewport.stop2,
            min_resolution: resolution.min_resolution,
            max_resolution: resolution.max_resolution,
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            self.chrom1.clone(),
            self.start1,
            self.stop1,
            self.chrom2.clone(),
            self.start2,
            self.stop2,
        )
    }

    /// Request parameters as sent to the dataset endpoint, in a stable order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("data_type", "raw_data".to_string()),
            ("provider", "json".to_string()),
            ("dataset_id", self.dataset_id.clone()),
            ("chrom1", self.chrom1.clone()),
            ("start1", self.start1.to_string()),
            ("stop1", self.stop1.to_string()),
            ("chrom2", self.chrom2.clone()),
            ("start2", self.start2.to_string()),
            ("stop2", self.stop2.to_string()),
            ("min_resolution", self.min_resolution.to_string()),
            ("max_resolution", self.max_resolution.to_string()),
        ]
    }
}

/// Successful fetch body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchResponse {
    #[serde(default)]
    pub data: Vec<DataPoint>,
}
