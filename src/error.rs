//! Exposes the crate's error type.

use std::sync::PoisonError;

use thiserror::Error;

/// Error type returned by this crate's fallible operations.
///
/// This enum is the error taxonomy from the design: most of its variants
/// never reach a caller directly, since the dispatcher localizes them to a
/// single atom's [`BehaviorRecord`](crate::behavior::BehaviorRecord) instead
/// of propagating. Only [`Error::InputUnavailable`] and [`Error::Cancelled`]
/// can escape [`GraphBuilder::build_graph`](crate::graph_builder::GraphBuilder::build_graph).
#[derive(Error, Debug)]
pub enum Error {
    /// The capture could not be resolved, or its atom stream could not be
    /// fetched. This is the only capture-level error: it aborts the build.
    #[error("capture is unavailable: {0}")]
    InputUnavailable(String),
    /// The build observed the ambient cancellation signal between atoms.
    #[error("build was cancelled")]
    Cancelled,
    /// The state-mutator rejected a specific atom. Recorded as
    /// `aborted = true` on that atom's behavior; the build continues.
    #[error("state mutation failed: {0}")]
    MutationFailed(String),
    /// An atom referenced a handle that is not present in the reference
    /// state (e.g. an unbound buffer queried for bindings). Logged, and the
    /// specific behavior step is skipped rather than failing the atom.
    #[error("handle not found in reference state: {0}")]
    StateInconsistency(String),
    /// `UpdateDescriptorSets`/`RecreateDescriptorSet` described a descriptor
    /// type this crate does not recognize. The atom is aborted.
    #[error("unknown descriptor type in descriptor write")]
    UnknownDescriptorType,
    /// A lock was poisoned by a panicking thread while held.
    #[error("poisoned lock")]
    PoisonError,
    /// Uncategorized error, for conditions that otherwise have no home.
    #[error("uncategorized error: {0}")]
    Uncategorized(&'static str),
}

impl<T> From<PoisonError<T>> for Error {
    fn from(_: PoisonError<T>) -> Self {
        Error::PoisonError
    }
}

pub type Result<T> = std::result::Result<T, Error>;
