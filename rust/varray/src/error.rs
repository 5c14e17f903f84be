//! Error type for the fallible varray operations.

use thiserror::Error;

/// Errors surfaced by the `try_` tier of varray operations.
///
/// The panicking operations treat every one of these conditions as a
/// contract violation and assert; the fallible operations report them as
/// values so that embedders which cannot tolerate aborts have a recoverable
/// path. Allocation failure is the one condition that is a genuine runtime
/// error rather than a caller bug.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VarrayError {
    /// An index was outside the live element range.
    #[error("index {index} out of bounds for varray of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A removal or back-element access was attempted on an empty varray.
    #[error("cannot access or remove an element of an empty varray")]
    Empty,

    /// The requested capacity does not fit in the address space.
    #[error("capacity of {elements} elements with stride {stride} overflows usize")]
    CapacityOverflow { elements: usize, stride: usize },

    /// The allocator could not provide the requested storage.
    #[error("failed to allocate {bytes} bytes of varray storage")]
    AllocationFailed { bytes: usize },
}

pub type Result<T> = std::result::Result<T, VarrayError>;
