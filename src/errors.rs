//! Structured errors for the one genuine failure seam: data-model construction.
//!
//! Layout itself never fails. Every locally-handled condition encountered while laying
//! out a canvas (dangling reference, cycle, saturated displacement) is reported through
//! `tracing` events instead of `Result` — only building the data model can reject input.

use thiserror::Error;

/// Failure building a canvas data model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// An element (node, machine, factory, network) was constructed with an empty id.
    #[error("{kind} id must not be empty")]
    EmptyId {
        /// Which kind of element was missing its id.
        kind: &'static str,
    },
}
