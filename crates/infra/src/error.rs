//! Errors surfaced by catalog operations.
//!
//! Partial read failures during fan-out never reach this type: they are logged
//! and treated as non-matches. Everything here is meant to be shown to a user
//! as a distinct message.

use thiserror::Error;

use storefront_core::{DomainError, ProductId};

use crate::store::StoreError;

/// Step of a publish/unpublish transition that failed after the source read.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransitionStep {
    /// Writing the record to its new location. The source is untouched.
    WriteDestination,
    /// Deleting the source after the write succeeded. The record now exists in
    /// both locations; re-running the transition repairs it.
    DeleteSource,
}

impl core::fmt::Display for TransitionStep {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::WriteDestination => f.write_str("write to destination"),
            Self::DeleteSource => f.write_str("delete of source"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{step} failed while moving product '{id}': {source}")]
    TransitionFailure {
        id: ProductId,
        step: TransitionStep,
        #[source]
        source: StoreError,
    },

    #[error("document store unreachable: {0}")]
    Transport(#[source] StoreError),

    #[error("document store error: {0}")]
    Store(#[source] StoreError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl CatalogError {
    pub fn product_not_found(id: &ProductId) -> Self {
        Self::NotFound {
            kind: "product",
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        if err.is_transport() {
            Self::Transport(err)
        } else {
            Self::Store(err)
        }
    }
}
