use super::domain::{Property, PropertyStatus};

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Implementations only store records. Score and status recomputation is the
/// service's job, so whatever an implementation returns may be stale.
pub trait PropertyRepository: Send + Sync {
    fn list(&self) -> Result<Vec<Property>, RepositoryError>;
    fn fetch(&self, id: &str) -> Result<Option<Property>, RepositoryError>;
    /// Records the requested status; `None` when no property has `id`.
    fn update_status(
        &self,
        id: &str,
        status: PropertyStatus,
    ) -> Result<Option<Property>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
