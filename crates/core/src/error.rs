use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A referenced vehicle, driver, trip or maintenance log does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// The record's current state does not permit the requested operation.
    #[error("{0}")]
    InvalidState(String),

    /// Vehicle or driver cannot be assigned to the requested trip.
    #[error("{0}")]
    Eligibility(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backing store failed. The message is for logs, not for clients.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        Self::NotFound { entity, id }
    }
}
