//! Rollback guard for speculatively constructed slots.
//!
//! Every routine that constructs values into a block it does not yet own
//! logically (a fresh block during relocation, spare slots during
//! copy-assignment) records them in a [`ConstructedRun`]. If the routine bails
//! out, by `?` or by unwinding, the guard destroys exactly the values it
//! recorded. On success the routine calls [`ConstructedRun::commit`] and the
//! values become the owner's responsibility.

#![allow(unsafe_code)]

use std::marker::PhantomData;
use std::ptr;

/// A contiguous run of slots `[start, start + len)` that hold live values
/// not yet owned by any container.
pub(crate) struct ConstructedRun<T> {
    base: *mut T,
    start: usize,
    len: usize,
    _owns: PhantomData<T>,
}

impl<T> ConstructedRun<T> {
    /// Start an empty run at slot `start` of the block at `base`.
    ///
    /// # Safety
    ///
    /// `base` must point to a block that outlives the guard, and every slot
    /// the run grows into must be in bounds and uninitialised.
    pub(crate) unsafe fn new(base: *mut T, start: usize) -> Self {
        Self {
            base,
            start,
            len: 0,
            _owns: PhantomData,
        }
    }

    /// Construct `value` in the next slot of the run.
    ///
    /// # Safety
    ///
    /// The next slot must be in bounds of the block and uninitialised.
    pub(crate) unsafe fn push(&mut self, value: T) {
        // SAFETY: guaranteed by the caller.
        unsafe { ptr::write(self.base.add(self.start + self.len), value) };
        self.len += 1;
    }

    /// Number of values constructed so far.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Hand the constructed values over to the caller.
    pub(crate) fn commit(self) -> usize {
        let len = self.len;
        std::mem::forget(self);
        len
    }
}

impl<T> Drop for ConstructedRun<T> {
    fn drop(&mut self) {
        // SAFETY: exactly `len` slots from `start` were initialised by `push`.
        unsafe {
            let first = self.base.add(self.start);
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(first, self.len));
        }
    }
}
