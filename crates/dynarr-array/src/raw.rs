//! Uninitialised, untyped storage blocks.
//!
//! [`RawStorage`] owns a single contiguous block sized for `capacity`
//! elements of `T`. It allocates and releases bytes and nothing else: it
//! never constructs or destroys a `T`. Which slots hold live values is known
//! only to the owner (the array), so the block cannot be cloned.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use dynarr_core::ArrayError;

/// An owned block of raw memory with room for `capacity` values of `T`.
///
/// A zero-capacity block (and a zero-sized `T`) holds a dangling pointer and
/// owns no allocation. Dropping a block releases its bytes without touching
/// any value that might still live in it.
pub struct RawStorage<T> {
    ptr: NonNull<T>,
    capacity: usize,
    _owns: PhantomData<T>,
}

// SAFETY: the block is uniquely owned; sending or sharing it is as safe as
// sending or sharing the `T` values its owner keeps in it.
unsafe impl<T: Send> Send for RawStorage<T> {}
// SAFETY: see above.
unsafe impl<T: Sync> Sync for RawStorage<T> {}

impl<T> RawStorage<T> {
    /// An empty block that owns no memory.
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            capacity: 0,
            _owns: PhantomData,
        }
    }

    /// Allocate a block for exactly `capacity` elements. No values are
    /// constructed.
    ///
    /// A zero-capacity request yields an empty block without touching the
    /// allocator.
    pub fn allocate(capacity: usize) -> Result<Self, ArrayError> {
        let layout = Self::layout(capacity)?;
        if layout.size() == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                capacity,
                _owns: PhantomData,
            });
        }
        // SAFETY: layout has non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        let ptr = NonNull::new(raw.cast::<T>()).ok_or(ArrayError::AllocationFailed {
            requested: capacity,
            bytes: layout.size(),
        })?;
        Ok(Self {
            ptr,
            capacity,
            _owns: PhantomData,
        })
    }

    fn layout(capacity: usize) -> Result<Layout, ArrayError> {
        Layout::array::<T>(capacity).map_err(|_| ArrayError::CapacityOverflow {
            requested: capacity,
        })
    }

    /// Number of element slots in the block.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Base pointer of the block. Dangling when nothing is allocated.
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Mutable base pointer of the block.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Pointer to the slot at `offset`.
    ///
    /// The one-past-the-end address (`offset == capacity`) is allowed.
    ///
    /// # Safety
    ///
    /// `offset` must not exceed `capacity`. Checked by assertion in debug
    /// builds only.
    pub unsafe fn slot(&self, offset: usize) -> *mut T {
        debug_assert!(
            offset <= self.capacity,
            "slot offset {offset} out of range for capacity {}",
            self.capacity
        );
        // SAFETY: offset is within the allocation or one past it.
        unsafe { self.ptr.as_ptr().add(offset) }
    }

    /// Exchange pointer and capacity with `other`. Never allocates.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Transfer the block out, leaving `self` empty.
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::new())
    }

    /// Release the block's bytes. Values still in the block are forgotten.
    fn deallocate(&mut self) {
        let Ok(layout) = Self::layout(self.capacity) else {
            return;
        };
        if layout.size() != 0 {
            // SAFETY: ptr was returned by `alloc` with this exact layout.
            unsafe { alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), layout) };
        }
        self.ptr = NonNull::dangling();
        self.capacity = 0;
    }
}

impl<T> Default for RawStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for RawStorage<T> {
    fn drop(&mut self) {
        self.deallocate();
    }
}
