use std::collections::TryReserveError;
use thiserror::Error;

/// An error returned by the map's fallible operations.
///
/// Missing and duplicate keys are not errors; they are reported through return values.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Storage for a new node could not be allocated.
    #[error("failed to allocate a tree node")]
    Alloc(#[from] TryReserveError),
}
