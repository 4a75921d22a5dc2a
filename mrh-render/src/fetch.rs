//! The data-fetch contract and an in-memory provider.

use futures::future::{self, BoxFuture};
use mrh_core::{DataPoint, FetchRequest, FetchResponse};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unknown dataset: {0}")]
    UnknownDataset(String),
}

pub type FetchResult = Result<FetchResponse, FetchError>;

/// Anything that can answer a layer request asynchronously.
pub trait DataFetcher {
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'static, FetchResult>;
}

impl<F: DataFetcher + ?Sized> DataFetcher for Arc<F> {
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'static, FetchResult> {
        (**self).fetch(request)
    }
}

/// Decode a provider body of the form `{"data": [...]}`.
pub fn parse_response(body: &str) -> FetchResult {
    Ok(serde_json::from_str(body)?)
}

/// Serves cells for one dataset from memory, answering every resolution with
/// the cells that intersect the requested region.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    dataset_id: String,
    cells: Arc<Vec<DataPoint>>,
}

impl StaticProvider {
    pub fn new(dataset_id: impl Into<String>, cells: Vec<DataPoint>) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            cells: Arc::new(cells),
        }
    }

    pub fn cells(&self) -> &[DataPoint] {
        &self.cells
    }

    pub fn query(&self, request: &FetchRequest) -> FetchResult {
        if request.dataset_id != self.dataset_id {
            return Err(FetchError::UnknownDataset(request.dataset_id.clone()));
        }
        let viewport = request.viewport();
        let data = self
            .cells
            .iter()
            .filter(|c| c.intersects(&viewport))
            .copied()
            .collect();
        Ok(FetchResponse { data })
    }
}

impl DataFetcher for StaticProvider {
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'static, FetchResult> {
        Box::pin(future::ready(self.query(&request)))
    }
}

/// Holds every response of the wrapped fetcher back by a fixed latency.
#[derive(Debug, Clone)]
pub struct Delayed<F> {
    inner: F,
    latency: Duration,
}

impl<F> Delayed<F> {
    pub fn new(inner: F, latency: Duration) -> Self {
        Self { inner, latency }
    }
}

impl<F: DataFetcher> DataFetcher for Delayed<F> {
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'static, FetchResult> {
        let response = self.inner.fetch(request);
        let latency = self.latency;
        Box::pin(async move {
            tokio::time::sleep(latency).await;
            response.await
        })
    }
}
