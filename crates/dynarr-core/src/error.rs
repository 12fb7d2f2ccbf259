//! Error types for container operations.
//!
//! Two layers: [`ElementError`] is raised by the element type itself (a copy
//! or constructor that refuses to produce a value), and [`ArrayError`] is what
//! every fallible container operation returns. Caller-contract violations
//! (out-of-range positions) are not represented here; they panic.

use std::error::Error;
use std::fmt;

/// Failures raised by an element type while constructing a new value.
///
/// Returned by [`Element::try_copy`](crate::Element::try_copy),
/// [`Element::try_copy_assign`](crate::Element::try_copy_assign) and by the
/// constructor closures passed to the `try_emplace*` family.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementError {
    /// The element type has no copy capability.
    NotCopyable,
    /// Copy-construction or copy-assignment failed.
    CopyFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A constructor closure failed to produce a value.
    ConstructionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for ElementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotCopyable => write!(f, "element type is not copyable"),
            Self::CopyFailed { reason } => write!(f, "element copy failed: {reason}"),
            Self::ConstructionFailed { reason } => {
                write!(f, "element construction failed: {reason}")
            }
        }
    }
}

impl Error for ElementError {}

/// Errors returned by fallible container operations.
///
/// Every operation that returns one of these has already rolled back any
/// partially constructed state: no orphaned elements remain and any storage
/// block that was not swapped in has been released.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrayError {
    /// The requested element count cannot be expressed as an allocation
    /// size (byte count overflows `isize::MAX`).
    CapacityOverflow {
        /// Requested capacity in elements.
        requested: usize,
    },
    /// The global allocator could not provide the block.
    AllocationFailed {
        /// Requested capacity in elements.
        requested: usize,
        /// Requested block size in bytes.
        bytes: usize,
    },
    /// An element copy or constructor failed mid-operation.
    Element(ElementError),
    /// A growth policy was configured with out-of-range parameters.
    InvalidGrowthPolicy {
        /// Description of the rejected parameter.
        reason: String,
    },
}

impl fmt::Display for ArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow { requested } => {
                write!(f, "capacity overflow: {requested} elements")
            }
            Self::AllocationFailed { requested, bytes } => {
                write!(
                    f,
                    "allocation failed: {requested} elements ({bytes} bytes)"
                )
            }
            Self::Element(e) => write!(f, "{e}"),
            Self::InvalidGrowthPolicy { reason } => {
                write!(f, "invalid growth policy: {reason}")
            }
        }
    }
}

impl Error for ArrayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Element(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ElementError> for ArrayError {
    fn from(e: ElementError) -> Self {
        Self::Element(e)
    }
}
