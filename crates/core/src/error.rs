use crate::types::EntityId;

/// Domain-level error taxonomy.
///
/// `NotFound` covers both "user unknown to the account store" and the
/// single-template lookup miss; "user unknown to the workspace store" is
/// deliberately NOT an error -- the sync engine reports it as a skipped
/// outcome instead.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: EntityId },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A backing store (account or workspace database) is unreachable or
    /// returned an unexpected failure.
    #[error("Upstream store error: {0}")]
    Upstream(String),
}
