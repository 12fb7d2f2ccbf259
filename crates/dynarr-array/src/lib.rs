//! Raw storage blocks and the growable [`DynamicArray`].
//!
//! This crate is the only one in the workspace that contains `unsafe` code.
//! It is confined to four modules, each `unsafe` block carrying a
//! `// SAFETY:` comment.
//!
//! # Architecture
//!
//! ```text
//! DynamicArray<T> (size, growth policy, element lifetimes)
//! ├── RawStorage<T> (one uninitialised block, capacity; bytes only)
//! ├── ConstructedRun<T> (rollback guard for speculative slots)
//! └── relocation::<T>() (move or copy, queried once per reallocation)
//! ```
//!
//! # Failure model
//!
//! Allocation failures and element copy/constructor failures are returned
//! as [`ArrayError`] after rollback. Out-of-range positions are caller bugs
//! and panic.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod array;
pub mod config;
mod guard;
pub mod iter;
pub mod raw;

// Public re-exports for the primary API surface.
pub use array::DynamicArray;
pub use config::GrowthPolicy;
pub use dynarr_core::{relocation, ArrayError, Element, ElementError, Relocation};
pub use iter::IntoIter;
pub use raw::RawStorage;
