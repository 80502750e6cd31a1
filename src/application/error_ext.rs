//! Error conversion helpers for collaborator calls
//!
//! Provides an extension trait that turns I/O failures of the store and the
//! catalog into transport errors with context.

use std::io;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Wrap an I/O error as a transport error.
    ///
    /// # Example
    /// ```ignore
    /// store.load(&list_id)
    ///     .with_transport_context("load list", &list_id)?;
    /// ```
    fn with_transport_context(self, action: &str, target: &str) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_transport_context(self, action: &str, target: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::transport(format!("{}: {}", action, target), e))
    }
}
