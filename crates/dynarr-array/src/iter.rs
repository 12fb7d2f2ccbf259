//! By-value iteration.

#![allow(unsafe_code)]

use std::fmt;
use std::iter::FusedIterator;
use std::ptr;
use std::slice;

use crate::raw::RawStorage;

/// Owning iterator over the elements of a
/// [`DynamicArray`](crate::DynamicArray).
///
/// Holds the array's storage block; elements not yet yielded are destroyed
/// when the iterator is dropped, then the block is released.
pub struct IntoIter<T> {
    storage: RawStorage<T>,
    front: usize,
    back: usize,
}

impl<T> IntoIter<T> {
    /// `storage` must hold `len` live elements in its first slots.
    pub(crate) fn new(storage: RawStorage<T>, len: usize) -> Self {
        Self {
            storage,
            front: 0,
            back: len,
        }
    }

    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots [front, back) are live.
        unsafe {
            slice::from_raw_parts(self.storage.slot(self.front), self.back - self.front)
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        // SAFETY: slot `front` is live; advancing makes it unreachable.
        let item = unsafe { ptr::read(self.storage.slot(self.front)) };
        self.front += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        // SAFETY: slot `back` was live and is now past the live range.
        Some(unsafe { ptr::read(self.storage.slot(self.back)) })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        let remaining = self.back - self.front;
        // SAFETY: exactly the un-yielded slots are live.
        unsafe {
            let rest = ptr::slice_from_raw_parts_mut(self.storage.slot(self.front), remaining);
            ptr::drop_in_place(rest);
        }
    }
}
