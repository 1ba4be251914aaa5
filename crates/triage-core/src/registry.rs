//! # Temporary-ID Registry Capability
//!
//! The validator's one external dependency: a lookup that answers whether a
//! patient temporary id is already in use. It is injected, not owned, and its
//! failures are reported separately from rule violations.
//!
//! Implementations here cover tests and static deployments. The HTTP-backed
//! implementation lives in `triage-registry-client`.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::RegistryError;

/// Existence lookup for patient temporary ids.
///
/// Implementations must be `Send + Sync`; the validator shares one instance
/// across concurrent requests.
#[async_trait]
pub trait TemporaryIdRegistry: Send + Sync {
    /// Whether `id` is already registered.
    async fn exists(&self, id: &str) -> Result<bool, RegistryError>;
}

#[async_trait]
impl<T: TemporaryIdRegistry + ?Sized> TemporaryIdRegistry for Arc<T> {
    async fn exists(&self, id: &str) -> Result<bool, RegistryError> {
        (**self).exists(id).await
    }
}

/// In-process set of known ids.
///
/// Cloning shares the underlying set.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    ids: Arc<RwLock<HashSet<String>>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the registry with existing ids.
    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: Arc::new(RwLock::new(ids.into_iter().map(Into::into).collect())),
        }
    }

    /// Register an id. Returns false if it was already present.
    pub fn insert(&self, id: impl Into<String>) -> bool {
        self.ids.write().insert(id.into())
    }
}

#[async_trait]
impl TemporaryIdRegistry for InMemoryRegistry {
    async fn exists(&self, id: &str) -> Result<bool, RegistryError> {
        Ok(self.ids.read().contains(id))
    }
}

/// Registry used when no backend is configured.
///
/// Every lookup fails with [`RegistryError::NotConfigured`], so records that
/// carry a temporary id are refused rather than waved through unchecked.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredRegistry;

#[async_trait]
impl TemporaryIdRegistry for UnconfiguredRegistry {
    async fn exists(&self, _id: &str) -> Result<bool, RegistryError> {
        Err(RegistryError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_reports_seeded_ids() {
        let registry = InMemoryRegistry::with_ids(["ABC123"]);
        assert_eq!(registry.exists("ABC123").await, Ok(true));
        assert_eq!(registry.exists("XYZ789").await, Ok(false));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let registry = InMemoryRegistry::new();
        let clone = registry.clone();
        assert!(clone.insert("T-1"));
        assert!(!registry.insert("T-1"));
        assert_eq!(registry.exists("T-1").await, Ok(true));
    }

    #[tokio::test]
    async fn unconfigured_always_fails() {
        assert_eq!(
            UnconfiguredRegistry.exists("ABC123").await,
            Err(RegistryError::NotConfigured)
        );
    }

    #[tokio::test]
    async fn arc_dyn_delegates() {
        let registry: Arc<dyn TemporaryIdRegistry> = Arc::new(InMemoryRegistry::with_ids(["A"]));
        assert_eq!(registry.exists("A").await, Ok(true));
    }
}
