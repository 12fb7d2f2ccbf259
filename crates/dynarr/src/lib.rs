//! dynarr: a growable array whose storage growth never loses, duplicates or
//! leaks an element.
//!
//! This is the top-level facade crate that re-exports the public API from the
//! dynarr sub-crates. For most users, adding `dynarr` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use dynarr::prelude::*;
//!
//! // An element whose copies can fail, so growth must copy, not move.
//! #[derive(Debug, PartialEq)]
//! struct Reading(u32);
//!
//! impl Element for Reading {
//!     const INFALLIBLE_MOVE: bool = false;
//!     const COPYABLE: bool = true;
//!
//!     fn try_copy(&self) -> Result<Self, ElementError> {
//!         if self.0 == 13 {
//!             return Err(ElementError::CopyFailed { reason: "unlucky".into() });
//!         }
//!         Ok(Reading(self.0))
//!     }
//! }
//!
//! let mut readings = DynamicArray::new();
//! readings.push(Reading(13)).unwrap();
//!
//! // Growing from capacity 1 has to copy Reading(13), which fails.
//! let err = readings.push(Reading(14)).unwrap_err();
//! assert!(matches!(err, ArrayError::Element(_)));
//! assert_eq!(readings.len(), 1);
//! assert_eq!(readings.capacity(), 1);
//! assert_eq!(readings[0], Reading(13));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `dynarr-core` | `Element` trait, relocation query, error types |
//! | [`array`] | `dynarr-array` | `DynamicArray`, `RawStorage`, `GrowthPolicy` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Element capabilities and error types (`dynarr-core`).
pub use dynarr_core as types;

/// The array, its storage blocks and growth configuration (`dynarr-array`).
pub use dynarr_array as array;

pub use dynarr_core::impl_clone_element;

/// Common imports for typical dynarr usage.
///
/// ```rust
/// use dynarr::prelude::*;
/// ```
pub mod prelude {
    // Container
    pub use dynarr_array::{DynamicArray, GrowthPolicy, IntoIter};

    // Element capabilities
    pub use dynarr_core::{relocation, Element, Relocation};

    // Errors
    pub use dynarr_core::{ArrayError, ElementError};
}
