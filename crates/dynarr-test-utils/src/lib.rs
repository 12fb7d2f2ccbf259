//! Test utilities for dynarr development.
//!
//! Provides a [`Ledger`] that accounts for every element instance it hands
//! out, and element types that exercise each relocation strategy:
//!
//! - [`Tracked`]: copyable, infallible move. Relocates by move.
//! - [`Fragile`]: copyable, fallible move. Relocates by copy; copies draw on a
//!   shared [`CopyBudget`] and fail once it runs out.
//! - [`MoveOnly`]: not copyable. Relocates by move.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod elements;
pub mod ledger;

pub use elements::{Fragile, MoveOnly, Tracked};
pub use ledger::{CopyBudget, Ledger};
