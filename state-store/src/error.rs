//! Error types for state-store

use thiserror::Error;

/// Result type for state-store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by the bound `set`/`get` handles and by actions
///
/// The owning [`Store`](crate::Store) handle itself never fails: these only
/// appear where a handle may outlive, or precede, the store it points at.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A bound handle was used while the initializer was still running
    #[error("store accessed before its initializer returned")]
    Uninitialized,

    /// Every `Store` handle has been dropped
    #[error("store has been dropped")]
    Dropped,

    /// An action reported a failure of its own
    #[error("action failed: {0}")]
    Action(String),
}
