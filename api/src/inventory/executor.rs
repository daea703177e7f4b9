use super::predicate::PredicateSet;
use crate::database::servers::ServerListing;
use async_trait::async_trait;

/// Pagination instruction handed to the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: i64,
    pub limit: i64,
}

impl Window {
    /// Derives a window from 1-indexed `page` and `limit`. Returns `None` (no
    /// windowing) unless both are present and positive.
    pub fn from_page(page: Option<i64>, limit: Option<i64>) -> Option<Self> {
        match (page, limit) {
            (Some(page), Some(limit)) if page > 0 && limit > 0 => Some(Self {
                offset: (page - 1).saturating_mul(limit),
                limit,
            }),
            _ => None,
        }
    }
}

/// Storage seam for listing queries. Implementations must return rows in a
/// stable order and must AND every predicate in the set.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn list_all(&self, window: Option<Window>) -> anyhow::Result<Vec<ServerListing>>;

    async fn filtered(&self, predicates: &PredicateSet) -> anyhow::Result<Vec<ServerListing>>;

    /// Short name of the backing store, reported by the health endpoint
    fn backend(&self) -> &'static str;

    async fn count(&self) -> anyhow::Result<usize> {
        Ok(self.list_all(None).await?.len())
    }
}

/// Executor over an in-memory snapshot, ordered by id.
#[derive(Debug, Clone, Default)]
pub struct MemoryExecutor {
    listings: Vec<ServerListing>,
}

impl MemoryExecutor {
    pub fn new(mut listings: Vec<ServerListing>) -> Self {
        listings.sort_by(|a, b| a.id.cmp(&b.id));
        Self { listings }
    }
}

#[async_trait]
impl QueryExecutor for MemoryExecutor {
    async fn list_all(&self, window: Option<Window>) -> anyhow::Result<Vec<ServerListing>> {
        let listings = match window {
            Some(w) => self
                .listings
                .iter()
                .skip(w.offset as usize)
                .take(w.limit as usize)
                .cloned()
                .collect(),
            None => self.listings.clone(),
        };
        Ok(listings)
    }

    async fn filtered(&self, predicates: &PredicateSet) -> anyhow::Result<Vec<ServerListing>> {
        Ok(self
            .listings
            .iter()
            .filter(|listing| predicates.matches(listing))
            .cloned()
            .collect())
    }

    fn backend(&self) -> &'static str {
        "snapshot"
    }

    async fn count(&self) -> anyhow::Result<usize> {
        Ok(self.listings.len())
    }
}
