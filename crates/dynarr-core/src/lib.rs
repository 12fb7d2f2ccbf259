//! Core types and traits for the dynarr container workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! error taxonomy shared by every container operation and the [`Element`]
//! capability trait the container queries to decide how live elements are
//! relocated into new storage.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod element;
pub mod error;

pub use element::{relocation, Element, Relocation};
pub use error::{ArrayError, ElementError};
