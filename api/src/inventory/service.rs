use super::builder::{build_predicates, recognized_fields, FilterCriteria, FilterError};
use super::executor::{QueryExecutor, Window};
use crate::database::servers::ServerListing;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    InvalidFilterValue(#[from] FilterError),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct FilteredListings {
    pub count: usize,
    pub data: Vec<ServerListing>,
}

/// Listing and filtering over a `QueryExecutor`. Holds no per-request state;
/// executor failures are surfaced as-is, never retried.
#[derive(Clone)]
pub struct ListingService {
    executor: Arc<dyn QueryExecutor>,
}

impl ListingService {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self { executor }
    }

    /// Name of the store serving listings, e.g. `sqlite` or `snapshot`
    pub fn backend(&self) -> &'static str {
        self.executor.backend()
    }

    pub async fn count(&self) -> Result<usize, ServiceError> {
        self.executor.count().await.map_err(|e| {
            tracing::error!("Failed to count servers: {:#}", e);
            ServiceError::StorageUnavailable(e)
        })
    }

    pub async fn list(
        &self,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<ServerListing>, ServiceError> {
        let window = Window::from_page(page, limit);
        tracing::debug!(?window, "listing servers");

        self.executor.list_all(window).await.map_err(|e| {
            tracing::error!("Failed to list servers: {:#}", e);
            ServiceError::StorageUnavailable(e)
        })
    }

    pub async fn filter(&self, criteria: &FilterCriteria) -> Result<FilteredListings, ServiceError> {
        let ignored: Vec<&str> = criteria
            .keys()
            .map(String::as_str)
            .filter(|key| !recognized_fields().any(|field| field == *key))
            .collect();
        if !ignored.is_empty() {
            tracing::debug!(?ignored, "ignoring unrecognized filter fields");
        }

        let predicates = build_predicates(criteria).map_err(|e| {
            tracing::warn!("Rejected filter criteria: {}", e);
            ServiceError::from(e)
        })?;

        let data = self.executor.filtered(&predicates).await.map_err(|e| {
            tracing::error!("Failed to filter servers: {:#}", e);
            ServiceError::StorageUnavailable(e)
        })?;

        tracing::debug!(
            predicates = predicates.len(),
            rows = data.len(),
            "filtered servers"
        );

        Ok(FilteredListings {
            count: data.len(),
            data,
        })
    }
}
