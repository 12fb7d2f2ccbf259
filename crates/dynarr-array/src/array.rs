//! The growable array.
//!
//! [`DynamicArray`] owns one [`RawStorage`] block and a live-element count.
//! Slots `[0, len)` hold constructed values; slots `[len, capacity)` are raw
//! memory that is never read. Every fallible operation either completes or
//! leaves `(len, capacity, elements)` exactly as they were, with the
//! exceptions documented on [`DynamicArray::assign_from`] and
//! [`DynamicArray::try_resize_with`].
//!
//! # Relocation
//!
//! When the block must be replaced (growth, [`reserve`](DynamicArray::reserve))
//! the array allocates the new block first, then asks
//! [`relocation`](dynarr_core::relocation) how to carry the live elements
//! across:
//!
//! - **Move:** elements are moved bit-for-bit. This cannot fail.
//! - **Copy:** each element is copied with [`Element::try_copy`]. If a copy
//!   fails, the copies made so far are destroyed and the new block is
//!   released; the old block was never touched. Only after every copy exists
//!   are the originals destroyed.
//!
//! The old block is released once the new one has been swapped in.

#![allow(unsafe_code)]

use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr;
use std::slice;

use dynarr_core::{relocation, ArrayError, Element, ElementError, Relocation};

use crate::config::GrowthPolicy;
use crate::guard::ConstructedRun;
use crate::iter::IntoIter;
use crate::raw::RawStorage;

/// A contiguous growable array with amortised O(1) append.
///
/// ```
/// use dynarr_array::DynamicArray;
///
/// let mut arr = DynamicArray::new();
/// for v in [1, 2, 3] {
///     arr.push(v).unwrap();
/// }
/// arr.insert(1, 99).unwrap();
/// arr.erase(0);
/// assert_eq!(arr.pop(), Some(3));
/// assert_eq!(arr, [99, 2]);
/// ```
pub struct DynamicArray<T> {
    storage: RawStorage<T>,
    len: usize,
    policy: GrowthPolicy,
}

impl<T> DynamicArray<T> {
    /// An empty array. Does not allocate.
    pub fn new() -> Self {
        Self::with_policy(GrowthPolicy::default())
    }

    /// An empty array that grows according to `policy`. Does not allocate.
    pub fn with_policy(policy: GrowthPolicy) -> Self {
        Self {
            storage: RawStorage::new(),
            len: 0,
            policy,
        }
    }

    /// An empty array with room for exactly `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Result<Self, ArrayError> {
        Ok(Self {
            storage: RawStorage::allocate(capacity)?,
            len: 0,
            policy: GrowthPolicy::default(),
        })
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if there are no live elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots in the current block.
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// The growth policy this array applies when full.
    pub fn policy(&self) -> GrowthPolicy {
        self.policy
    }

    /// The live elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots [0, len) are initialised; the pointer is non-null and
        // aligned even when nothing is allocated.
        unsafe { slice::from_raw_parts(self.storage.as_ptr(), self.len) }
    }

    /// The live elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as above, and `&mut self` guarantees exclusivity.
        unsafe { slice::from_raw_parts_mut(self.storage.as_mut_ptr(), self.len) }
    }

    /// Remove and return the last element, or `None` if the array is empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: slot `len` was live and is now outside the live range.
        Some(unsafe { ptr::read(self.storage.slot(self.len)) })
    }

    /// Destroy the element at `index` and close the gap.
    ///
    /// Returns the position of the element that now occupies `index`, which
    /// equals [`len`](Self::len) (end of sequence) when the last element was
    /// erased. Erasing from an empty array does nothing and returns `0`, the
    /// end position.
    ///
    /// # Panics
    ///
    /// Panics if the array is non-empty and `index >= len`.
    pub fn erase(&mut self, index: usize) -> usize {
        if self.len == 0 {
            return 0;
        }
        assert!(
            index < self.len,
            "erase position {index} out of range for length {}",
            self.len
        );
        // SAFETY: index < len, so the read is of a live slot and the shifted
        // range [index + 1, len) is live.
        unsafe {
            let at = self.storage.slot(index);
            let erased = ptr::read(at);
            ptr::copy(at.add(1), at, self.len - index - 1);
            self.len -= 1;
            drop(erased);
        }
        index
    }

    /// Destroy elements `[new_len, len)`. Capacity is unchanged.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let excess = self.len - new_len;
        // Shrink first so a panicking destructor cannot cause a double drop.
        self.len = new_len;
        // SAFETY: the `excess` slots from `new_len` were live.
        unsafe {
            let tail = ptr::slice_from_raw_parts_mut(self.storage.slot(new_len), excess);
            ptr::drop_in_place(tail);
        }
    }

    /// Destroy every element. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Exchange contents, storage and policy with `other`. Never allocates.
    pub fn swap(&mut self, other: &mut Self) {
        self.storage.swap(&mut other.storage);
        mem::swap(&mut self.len, &mut other.len);
        mem::swap(&mut self.policy, &mut other.policy);
    }

    /// Move the contents out, leaving `self` empty and owning no storage.
    pub fn take(&mut self) -> Self {
        let mut taken = Self::with_policy(self.policy);
        taken.swap(self);
        taken
    }

    /// Replace `self` with the contents of `source`, leaving `source` empty
    /// and owning no storage. The previous contents of `self` are destroyed.
    pub fn move_from(&mut self, source: &mut Self) {
        let mut previous = source.take();
        self.swap(&mut previous);
    }

    pub(crate) fn into_raw_parts(self) -> (RawStorage<T>, usize) {
        let mut this = mem::ManuallyDrop::new(self);
        (this.storage.take(), this.len)
    }
}

impl<T: Element> DynamicArray<T> {
    /// An array of `len` default-valued elements in a block of exactly `len`
    /// slots.
    pub fn with_len(len: usize) -> Result<Self, ArrayError>
    where
        T: Default,
    {
        let mut arr = Self::with_capacity(len)?;
        arr.resize(len)?;
        Ok(arr)
    }

    /// A copy of this array in a block sized to its length.
    ///
    /// Fails with [`ElementError::NotCopyable`] for move-only element types.
    pub fn try_clone(&self) -> Result<Self, ArrayError> {
        let mut copy = Self::with_capacity(self.len)?;
        copy.policy = self.policy;
        for item in self.iter() {
            let value = item.try_copy()?;
            // SAFETY: copy.len < self.len == copy.capacity().
            unsafe { ptr::write(copy.storage.slot(copy.len), value) };
            copy.len += 1;
        }
        Ok(copy)
    }

    /// Grow the block to exactly `capacity` slots. No-op if it is already
    /// that large. The length is unchanged.
    pub fn reserve(&mut self, capacity: usize) -> Result<(), ArrayError> {
        if capacity <= self.capacity() {
            return Ok(());
        }
        self.reallocate(capacity)
    }

    /// Resize to `new_len`, filling new slots with `T::default()`.
    ///
    /// Growing reserves exactly `new_len` slots if the block is too small.
    /// Shrinking destroys the tail and never reduces capacity.
    pub fn resize(&mut self, new_len: usize) -> Result<(), ArrayError>
    where
        T: Default,
    {
        self.resize_with(new_len, T::default)
    }

    /// Resize to `new_len`, filling new slots with values from `fill`.
    pub fn resize_with<F>(&mut self, new_len: usize, mut fill: F) -> Result<(), ArrayError>
    where
        F: FnMut() -> T,
    {
        self.try_resize_with(new_len, || Ok(fill()))
    }

    /// Resize to `new_len`, filling new slots with values from a fallible
    /// constructor.
    ///
    /// If `fill` fails, the elements it already produced are destroyed and
    /// the length is restored. The block keeps any capacity reserved for the
    /// attempt.
    pub fn try_resize_with<F>(&mut self, new_len: usize, mut fill: F) -> Result<(), ArrayError>
    where
        F: FnMut() -> Result<T, ElementError>,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }
        self.reserve(new_len)?;
        let old_len = self.len;
        while self.len < new_len {
            match fill() {
                Ok(value) => {
                    // SAFETY: len < new_len <= capacity; the slot is raw.
                    unsafe { ptr::write(self.storage.slot(self.len), value) };
                    self.len += 1;
                }
                Err(e) => {
                    log::debug!(
                        "resize to {new_len} failed after {} new elements, restoring length {old_len}: {e}",
                        self.len - old_len
                    );
                    self.truncate(old_len);
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }

    /// Append `value`, growing by the policy if the block is full.
    pub fn push(&mut self, value: T) -> Result<(), ArrayError> {
        self.try_emplace_at(self.len, || Ok(value)).map(|_| ())
    }

    /// Append a copy of `value`.
    pub fn push_copy(&mut self, value: &T) -> Result<(), ArrayError> {
        self.try_emplace_at(self.len, || value.try_copy()).map(|_| ())
    }

    /// Append the value built by `make` and return a reference to it.
    pub fn emplace_back<F>(&mut self, make: F) -> Result<&mut T, ArrayError>
    where
        F: FnOnce() -> T,
    {
        self.try_emplace_back(|| Ok(make()))
    }

    /// Append the value built by a fallible constructor and return a
    /// reference to it. A failing constructor leaves the array unchanged.
    pub fn try_emplace_back<F>(&mut self, make: F) -> Result<&mut T, ArrayError>
    where
        F: FnOnce() -> Result<T, ElementError>,
    {
        let index = self.try_emplace_at(self.len, make)?;
        Ok(&mut self.as_mut_slice()[index])
    }

    /// Insert `value` at `index`, shifting later elements right.
    ///
    /// Returns the position of the inserted element.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<usize, ArrayError> {
        self.try_emplace_at(index, || Ok(value))
    }

    /// Insert a copy of `value` at `index`.
    pub fn insert_copy(&mut self, index: usize, value: &T) -> Result<usize, ArrayError> {
        self.try_emplace_at(index, || value.try_copy())
    }

    /// Insert the value built by `make` at `index`.
    pub fn emplace<F>(&mut self, index: usize, make: F) -> Result<usize, ArrayError>
    where
        F: FnOnce() -> T,
    {
        self.try_emplace_at(index, || Ok(make()))
    }

    /// Insert the value built by a fallible constructor at `index`.
    pub fn try_emplace<F>(&mut self, index: usize, make: F) -> Result<usize, ArrayError>
    where
        F: FnOnce() -> Result<T, ElementError>,
    {
        self.try_emplace_at(index, make)
    }

    /// Copy-assign from `other`.
    ///
    /// If `other` does not fit in the current block, a complete copy is
    /// built first and swapped in, so on failure `self` is unchanged.
    ///
    /// Otherwise the block is reused: elements `other` has beyond our length
    /// are copy-constructed into spare slots, the overlapping prefix is
    /// copy-assigned, and any excess tail of ours is destroyed. If a
    /// copy-construction fails, nothing has changed. If a copy-assignment
    /// fails, the new slots are destroyed and the length is unchanged, but
    /// prefix elements assigned before the failure keep their new values.
    ///
    /// The growth policy of `self` is kept.
    pub fn assign_from(&mut self, other: &Self) -> Result<(), ArrayError> {
        if other.len > self.capacity() {
            let mut copy = other.try_clone()?;
            copy.policy = self.policy;
            self.swap(&mut copy);
            return Ok(());
        }
        self.assign_in_place(other).inspect_err(|e| {
            log::debug!(
                "copy-assignment of {} elements onto {} rolled back: {e}",
                other.len,
                self.len
            );
        })
    }

    fn assign_in_place(&mut self, other: &Self) -> Result<(), ArrayError> {
        let shared = self.len.min(other.len);
        // SAFETY: slots [len, other.len) lie within capacity and are raw.
        let mut appended = unsafe { ConstructedRun::new(self.storage.as_mut_ptr(), self.len) };
        for item in &other.as_slice()[shared..] {
            let value = item.try_copy()?;
            // SAFETY: see above; the run never exceeds other.len.
            unsafe { appended.push(value) };
        }
        for (dst, src) in self.as_mut_slice()[..shared]
            .iter_mut()
            .zip(&other.as_slice()[..shared])
        {
            dst.try_copy_assign(src)?;
        }
        let appended = appended.commit();
        if other.len < self.len {
            self.truncate(other.len);
        } else {
            self.len += appended;
        }
        Ok(())
    }

    fn try_emplace_at<F>(&mut self, index: usize, make: F) -> Result<usize, ArrayError>
    where
        F: FnOnce() -> Result<T, ElementError>,
    {
        assert!(
            index <= self.len,
            "insert position {index} out of range for length {}",
            self.len
        );
        if self.len == self.capacity() {
            self.grow_around(index, make)?;
            return Ok(index);
        }
        // Build the value before shifting anything, so a failing constructor
        // leaves the array as it was.
        let value = make()?;
        // SAFETY: len < capacity, so [index, len) can shift one slot right
        // and slot `index` then holds a bitwise duplicate we overwrite.
        unsafe {
            let at = self.storage.slot(index);
            ptr::copy(at, at.add(1), self.len - index);
            ptr::write(at, value);
        }
        self.len += 1;
        Ok(index)
    }

    /// Grow a full block by the policy, placing a new value at `index` and
    /// the existing elements around it.
    fn grow_around<F>(&mut self, index: usize, make: F) -> Result<(), ArrayError>
    where
        F: FnOnce() -> Result<T, ElementError>,
    {
        let new_capacity = self.policy.next_capacity(self.capacity())?;
        let mut fresh = RawStorage::allocate(new_capacity)?;
        // SAFETY: index <= len < new_capacity, and the fresh block is raw.
        let mut placed = unsafe { ConstructedRun::new(fresh.as_mut_ptr(), index) };
        let value = make()?;
        // SAFETY: slot `index` of the fresh block is raw.
        unsafe { placed.push(value) };
        let strategy = self
            .relocate_into(&mut fresh, index, 1)
            .map_err(|e| self.rolled_back(new_capacity, e))?;
        placed.commit();
        self.adopt(fresh, self.len + 1, strategy);
        Ok(())
    }

    fn reallocate(&mut self, new_capacity: usize) -> Result<(), ArrayError> {
        let mut fresh = RawStorage::allocate(new_capacity)?;
        let strategy = self
            .relocate_into(&mut fresh, self.len, 0)
            .map_err(|e| self.rolled_back(new_capacity, e))?;
        self.adopt(fresh, self.len, strategy);
        Ok(())
    }

    /// Carry the live elements into `fresh`: `[0, gap)` to the same slots and
    /// `[gap, len)` shifted right by `gap_len`.
    ///
    /// With [`Relocation::Move`] the old slots are left logically
    /// uninitialised, so the caller must [`adopt`](Self::adopt) `fresh`
    /// before doing anything fallible.
    fn relocate_into(
        &self,
        fresh: &mut RawStorage<T>,
        gap: usize,
        gap_len: usize,
    ) -> Result<Relocation, ArrayError> {
        let strategy = relocation::<T>();
        log::trace!(
            "relocating {} elements: capacity {} -> {} ({strategy:?})",
            self.len,
            self.capacity(),
            fresh.capacity()
        );
        let (prefix, suffix) = self.as_slice().split_at(gap);
        let dst = fresh.as_mut_ptr();
        match strategy {
            Relocation::Move => {
                // SAFETY: fresh has room for len + gap_len slots and does not
                // overlap the current block.
                unsafe {
                    ptr::copy_nonoverlapping(prefix.as_ptr(), dst, prefix.len());
                    ptr::copy_nonoverlapping(
                        suffix.as_ptr(),
                        dst.add(gap + gap_len),
                        suffix.len(),
                    );
                }
            }
            Relocation::Copy => {
                // SAFETY: both runs target raw, in-bounds slots of `fresh`.
                let mut head = unsafe { ConstructedRun::new(dst, 0) };
                for item in prefix {
                    let value = item.try_copy()?;
                    unsafe { head.push(value) };
                }
                let mut tail = unsafe { ConstructedRun::new(dst, gap + gap_len) };
                for item in suffix {
                    let value = item.try_copy()?;
                    unsafe { tail.push(value) };
                }
                debug_assert_eq!(head.len() + tail.len(), self.len);
                head.commit();
                tail.commit();
            }
        }
        Ok(strategy)
    }

    /// Swap in a block the live elements were relocated into, destroying the
    /// originals if they were copied, and release the old block.
    fn adopt(&mut self, mut fresh: RawStorage<T>, new_len: usize, strategy: Relocation) {
        let old_len = mem::replace(&mut self.len, 0);
        if strategy == Relocation::Copy {
            // SAFETY: the originals are still live; their copies are in `fresh`.
            unsafe {
                let old = ptr::slice_from_raw_parts_mut(self.storage.as_mut_ptr(), old_len);
                ptr::drop_in_place(old);
            }
        }
        self.storage.swap(&mut fresh);
        self.len = new_len;
    }

    fn rolled_back(&self, new_capacity: usize, err: ArrayError) -> ArrayError {
        log::debug!(
            "reallocation to capacity {new_capacity} rolled back, {} elements left in place: {err}",
            self.len
        );
        err
    }
}

impl<T> Drop for DynamicArray<T> {
    fn drop(&mut self) {
        // SAFETY: exactly the live slots are destroyed; the block is released
        // by RawStorage afterwards.
        unsafe { ptr::drop_in_place(self.as_mut_slice()) }
    }
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for DynamicArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynamicArray<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq<U>, U> PartialEq<DynamicArray<U>> for DynamicArray<T> {
    fn eq(&self, other: &DynamicArray<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for DynamicArray<T> {}

impl<T: PartialEq<U>, U, const N: usize> PartialEq<[U; N]> for DynamicArray<T> {
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq<U>, U> PartialEq<[U]> for DynamicArray<T> {
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T: Element> TryFrom<&[T]> for DynamicArray<T> {
    type Error = ArrayError;

    fn try_from(items: &[T]) -> Result<Self, ArrayError> {
        let mut arr = Self::with_capacity(items.len())?;
        for item in items {
            arr.push_copy(item)?;
        }
        Ok(arr)
    }
}

impl<T: Element> Element for DynamicArray<T> {
    const COPYABLE: bool = T::COPYABLE;

    fn try_copy(&self) -> Result<Self, ElementError> {
        self.try_clone().map_err(element_error)
    }

    fn try_copy_assign(&mut self, source: &Self) -> Result<(), ElementError> {
        self.assign_from(source).map_err(element_error)
    }
}

fn element_error(err: ArrayError) -> ElementError {
    match err {
        ArrayError::Element(e) => e,
        other => ElementError::CopyFailed {
            reason: other.to_string(),
        },
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynamicArray<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> IntoIterator for DynamicArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        let (storage, len) = self.into_raw_parts();
        IntoIter::new(storage, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynarr_test_utils::{CopyBudget, Ledger};

    fn from_values(values: &[i32]) -> DynamicArray<i32> {
        let mut arr = DynamicArray::new();
        for &v in values {
            arr.push(v).unwrap();
        }
        arr
    }

    #[test]
    fn new_array_owns_nothing() {
        let arr = DynamicArray::<i32>::new();
        assert_eq!(arr.len(), 0);
        assert_eq!(arr.capacity(), 0);
        assert!(arr.is_empty());
    }

    #[test]
    fn push_doubles_capacity_from_zero() {
        let mut arr = DynamicArray::new();
        let mut caps = Vec::new();
        for v in 0..9 {
            arr.push(v).unwrap();
            if caps.last() != Some(&arr.capacity()) {
                caps.push(arr.capacity());
            }
        }
        assert_eq!(caps, [1, 2, 4, 8, 16]);
        assert_eq!(arr, [0, 1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn custom_policy_governs_growth() {
        let mut arr = DynamicArray::with_policy(GrowthPolicy::new(4, 3).unwrap());
        arr.push(1u8).unwrap();
        assert_eq!(arr.capacity(), 3);
        for v in 2..=4 {
            arr.push(v).unwrap();
        }
        assert_eq!(arr.capacity(), 12);
    }

    #[test]
    fn with_len_default_fills_exactly() {
        let arr = DynamicArray::<String>::with_len(3).unwrap();
        assert_eq!(arr.len(), 3);
        assert_eq!(arr.capacity(), 3);
        assert!(arr.iter().all(String::is_empty));
    }

    #[test]
    fn reserve_is_exact_and_keeps_length() {
        let mut arr = from_values(&[1, 2]);
        arr.reserve(10).unwrap();
        assert_eq!(arr.capacity(), 10);
        assert_eq!(arr, [1, 2]);
        arr.reserve(4).unwrap();
        assert_eq!(arr.capacity(), 10, "smaller reserve is a no-op");
    }

    #[test]
    fn resize_grows_with_defaults_and_shrinks_without_releasing() {
        let mut arr = from_values(&[1, 2]);
        arr.resize(5).unwrap();
        assert_eq!(arr, [1, 2, 0, 0, 0]);
        let cap = arr.capacity();
        arr.resize(1).unwrap();
        assert_eq!(arr, [1]);
        assert_eq!(arr.capacity(), cap);
    }

    #[test]
    fn try_resize_with_rolls_back_length_but_keeps_capacity() {
        let ledger = Ledger::new();
        let mut arr = DynamicArray::new();
        arr.push(ledger.tracked(1)).unwrap();

        let mut made = 0;
        let result = arr.try_resize_with(4, || {
            made += 1;
            if made == 3 {
                return Err(ElementError::ConstructionFailed {
                    reason: "third fill".into(),
                });
            }
            Ok(ledger.tracked(made))
        });
        assert!(matches!(
            result,
            Err(ArrayError::Element(ElementError::ConstructionFailed { .. }))
        ));
        assert_eq!(arr.len(), 1);
        assert_eq!(arr[0].value(), 1);
        assert_eq!(ledger.live(), 1);
        // The block reserved for the attempt stays.
        assert_eq!(arr.capacity(), 4);
    }

    #[test]
    fn emplace_back_returns_new_element() {
        let mut arr = DynamicArray::new();
        let slot = arr.emplace_back(|| String::from("a")).unwrap();
        slot.push('b');
        assert_eq!(arr.as_slice(), ["ab".to_string()]);
    }

    #[test]
    fn failing_constructor_leaves_array_unchanged() {
        let mut arr = from_values(&[1, 2]);
        let cap = arr.capacity();
        let fail = || {
            Err(ElementError::ConstructionFailed {
                reason: "nope".into(),
            })
        };
        // Full block: growth path.
        assert!(arr.try_emplace_back(fail).is_err());
        assert_eq!(arr.capacity(), cap);
        // Spare capacity: shift path.
        arr.reserve(8).unwrap();
        assert!(arr.try_emplace(0, fail).is_err());
        assert_eq!(arr, [1, 2]);
    }

    #[test]
    fn insert_with_spare_capacity_shifts_right() {
        let mut arr = from_values(&[1, 2, 3]);
        assert_eq!(arr.capacity(), 4);
        assert_eq!(arr.insert(1, 99).unwrap(), 1);
        assert_eq!(arr, [1, 99, 2, 3]);
        assert_eq!(arr.capacity(), 4);
    }

    #[test]
    fn insert_into_full_block_grows_around_gap() {
        let mut arr = from_values(&[1, 2, 3, 4]);
        assert_eq!(arr.insert(2, 50).unwrap(), 2);
        assert_eq!(arr, [1, 2, 50, 3, 4]);
        assert_eq!(arr.capacity(), 8);
        assert_eq!(arr.insert(5, 60).unwrap(), 5);
        assert_eq!(arr.insert(0, 0).unwrap(), 0);
        assert_eq!(arr, [0, 1, 2, 50, 3, 4, 60]);
    }

    #[test]
    fn insert_into_empty_array() {
        let mut arr = DynamicArray::new();
        assert_eq!(arr.insert(0, 'x').unwrap(), 0);
        assert_eq!(arr, ['x']);
    }

    #[test]
    #[should_panic(expected = "insert position 3 out of range")]
    fn insert_past_end_panics() {
        let mut arr = from_values(&[1, 2]);
        let _ = arr.insert(3, 0);
    }

    #[test]
    fn erase_shifts_left_and_reports_position() {
        let mut arr = from_values(&[1, 2, 3]);
        assert_eq!(arr.erase(0), 0);
        assert_eq!(arr, [2, 3]);
        assert_eq!(arr.erase(1), 1);
        assert_eq!(arr.len(), 1, "position equals len: end of sequence");
        assert_eq!(arr.erase(0), 0);
        assert!(arr.is_empty());
        assert_eq!(arr.erase(0), 0, "erase on empty is a no-op");
    }

    #[test]
    #[should_panic(expected = "erase position 2 out of range")]
    fn erase_past_end_panics() {
        let mut arr = from_values(&[1, 2]);
        arr.erase(2);
    }

    #[test]
    fn erase_destroys_exactly_one_element() {
        let ledger = Ledger::new();
        let mut arr = DynamicArray::new();
        for v in 0..4 {
            arr.push(ledger.tracked(v)).unwrap();
        }
        arr.erase(1);
        assert_eq!(ledger.live(), 3);
        let values: Vec<i64> = arr.iter().map(|t| t.value()).collect();
        assert_eq!(values, [0, 2, 3]);
    }

    #[test]
    fn pop_on_empty_is_none() {
        let mut arr = DynamicArray::<u8>::new();
        assert_eq!(arr.pop(), None);
    }

    #[test]
    fn move_relocation_never_destroys_originals() {
        let ledger = Ledger::new();
        let mut arr = DynamicArray::new();
        for v in 0..5 {
            arr.push(ledger.tracked(v)).unwrap();
        }
        assert_eq!(ledger.dropped(), 0);
        assert_eq!(ledger.live(), 5);
    }

    #[test]
    fn copy_relocation_destroys_originals_after_copying() {
        let ledger = Ledger::new();
        let budget = CopyBudget::unlimited();
        let mut arr = DynamicArray::new();
        for v in 0..5 {
            arr.push(ledger.fragile(v, &budget)).unwrap();
        }
        // Growths at 1, 2, 4 copied 1 + 2 + 4 elements.
        assert_eq!(budget.copies(), 7);
        assert_eq!(ledger.dropped(), 7);
        assert_eq!(ledger.live(), 5);
    }

    #[test]
    fn failed_copy_relocation_is_atomic() {
        let ledger = Ledger::new();
        let budget = CopyBudget::unlimited();
        let mut arr = DynamicArray::new();
        for v in 0..4 {
            arr.push(ledger.fragile(v, &budget)).unwrap();
        }
        budget.fail_after(2);
        let err = arr.push(ledger.fragile(4, &budget)).unwrap_err();
        assert!(matches!(err, ArrayError::Element(ElementError::CopyFailed { .. })));
        assert_eq!(arr.len(), 4);
        assert_eq!(arr.capacity(), 4);
        let values: Vec<i64> = arr.iter().map(|f| f.value()).collect();
        assert_eq!(values, [0, 1, 2, 3]);
        // The two speculative copies and the new value were destroyed.
        assert_eq!(ledger.live(), 4);
    }

    #[test]
    fn failed_insert_growth_destroys_placed_value() {
        let ledger = Ledger::new();
        let budget = CopyBudget::unlimited();
        let mut arr = DynamicArray::new();
        for v in 0..2 {
            arr.push(ledger.fragile(v, &budget)).unwrap();
        }
        budget.fail_after(1);
        assert!(arr.insert(1, ledger.fragile(9, &budget)).is_err());
        assert_eq!(arr.len(), 2);
        assert_eq!(ledger.live(), 2);
    }

    #[test]
    fn move_only_elements_relocate() {
        let ledger = Ledger::new();
        let mut arr = DynamicArray::new();
        for v in 0..6 {
            arr.push(ledger.move_only(v)).unwrap();
        }
        arr.reserve(32).unwrap();
        assert_eq!(arr.len(), 6);
        assert_eq!(ledger.dropped(), 0);
        assert!(matches!(
            arr.try_clone(),
            Err(ArrayError::Element(ElementError::NotCopyable))
        ));
        assert_eq!(ledger.live(), 6);
    }

    #[test]
    fn try_clone_is_independent() {
        let a = from_values(&[1, 2, 3]);
        let mut b = a.try_clone().unwrap();
        assert_eq!(a, b);
        assert_eq!(b.capacity(), 3);
        b[0] = 100;
        assert_eq!(a, [1, 2, 3]);
    }

    #[test]
    fn assign_from_larger_uses_fresh_copy() {
        let mut a = from_values(&[7]);
        let b = from_values(&[1, 2, 3, 4, 5]);
        a.assign_from(&b).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.capacity(), 5);
    }

    #[test]
    fn assign_from_reuses_capacity_when_it_fits() {
        let mut a = from_values(&[9, 9, 9, 9, 9, 9]);
        let cap = a.capacity();
        a.assign_from(&from_values(&[1, 2])).unwrap();
        assert_eq!(a, [1, 2]);
        a.assign_from(&from_values(&[3, 4, 5, 6])).unwrap();
        assert_eq!(a, [3, 4, 5, 6]);
        assert_eq!(a.capacity(), cap);
    }

    #[test]
    fn assign_from_copy_failure_keeps_length() {
        let ledger = Ledger::new();
        let budget = CopyBudget::unlimited();
        let mut a = DynamicArray::new();
        a.reserve(8).unwrap();
        for v in 0..2 {
            a.push(ledger.fragile(v, &budget)).unwrap();
        }
        let mut b = DynamicArray::new();
        for v in 10..15 {
            b.push(ledger.fragile(v, &budget)).unwrap();
        }
        let live_before = ledger.live();
        // Suffix copies (3) succeed, then the first prefix assignment fails.
        budget.fail_after(3);
        assert!(a.assign_from(&b).is_err());
        assert_eq!(a.len(), 2);
        assert_eq!(ledger.live(), live_before);

        // A failing suffix copy changes nothing at all.
        budget.fail_after(1);
        assert!(a.assign_from(&b).is_err());
        let values: Vec<i64> = a.iter().map(|f| f.value()).collect();
        assert_eq!(values, [0, 1]);
        assert_eq!(ledger.live(), live_before);
    }

    #[test]
    fn take_and_move_from_leave_source_empty() {
        let mut a = from_values(&[1, 2, 3]);
        let b = a.take();
        assert_eq!(b, [1, 2, 3]);
        assert_eq!((a.len(), a.capacity()), (0, 0));

        let mut c = from_values(&[5]);
        let mut d = b;
        c.move_from(&mut d);
        assert_eq!(c, [1, 2, 3]);
        assert_eq!((d.len(), d.capacity()), (0, 0));
        d.push(4).unwrap();
        assert_eq!(d, [4]);
    }

    #[test]
    fn swap_exchanges_everything() {
        let mut a = from_values(&[1]);
        let mut b = from_values(&[2, 3, 4]);
        a.swap(&mut b);
        assert_eq!(a, [2, 3, 4]);
        assert_eq!(b, [1]);
    }

    #[test]
    fn drop_destroys_every_live_element_once() {
        let ledger = Ledger::new();
        {
            let mut arr = DynamicArray::new();
            for v in 0..10 {
                arr.push(ledger.tracked(v)).unwrap();
            }
            arr.pop();
            arr.truncate(5);
        }
        assert_eq!(ledger.live(), 0);
        assert_eq!(ledger.constructed(), 10);
    }

    #[test]
    fn iteration_views() {
        let mut arr = from_values(&[1, 2, 3]);
        for v in &mut arr {
            *v *= 10;
        }
        let sum: i32 = (&arr).into_iter().sum();
        assert_eq!(sum, 60);
        let collected: Vec<i32> = arr.into_iter().collect();
        assert_eq!(collected, [10, 20, 30]);
    }

    #[test]
    fn nested_arrays_copy_deeply() {
        let mut outer = DynamicArray::new();
        outer.push(from_values(&[1, 2])).unwrap();
        outer.push(from_values(&[3])).unwrap();
        let mut copy = outer.try_clone().unwrap();
        copy[0].push(99).unwrap();
        assert_eq!(outer[0], [1, 2]);
        assert_eq!(copy[0], [1, 2, 99]);
    }

    #[test]
    fn try_from_slice_copies() {
        let arr = DynamicArray::try_from(&["a", "b"][..]).unwrap();
        assert_eq!(arr, ["a", "b"]);
        assert_eq!(format!("{arr:?}"), r#"["a", "b"]"#);
    }

    #[test]
    fn zero_sized_elements() {
        let mut arr = DynamicArray::new();
        for _ in 0..100 {
            arr.push(()).unwrap();
        }
        arr.insert(50, ()).unwrap();
        arr.erase(0);
        assert_eq!(arr.len(), 100);
        assert_eq!(arr.capacity(), 128);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Clone, Debug)]
        enum Op {
            Push(i32),
            Pop,
            Insert(usize, i32),
            Erase(usize),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                any::<i32>().prop_map(Op::Push),
                Just(Op::Pop),
                (any::<usize>(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
                any::<usize>().prop_map(Op::Erase),
            ]
        }

        proptest! {
            #[test]
            fn matches_reference_model(ops in proptest::collection::vec(op(), 0..200)) {
                let mut arr = DynamicArray::new();
                let mut model: Vec<i32> = Vec::new();
                let mut peak_cap = 0;
                for op in ops {
                    match op {
                        Op::Push(v) => {
                            arr.push(v).unwrap();
                            model.push(v);
                        }
                        Op::Pop => prop_assert_eq!(arr.pop(), model.pop()),
                        Op::Insert(i, v) => {
                            let i = i % (model.len() + 1);
                            prop_assert_eq!(arr.insert(i, v).unwrap(), i);
                            model.insert(i, v);
                        }
                        Op::Erase(i) => {
                            if !model.is_empty() {
                                let i = i % model.len();
                                arr.erase(i);
                                model.remove(i);
                            }
                        }
                    }
                    prop_assert!(arr.len() <= arr.capacity());
                    prop_assert!(arr.capacity() >= peak_cap, "capacity never shrinks");
                    peak_cap = arr.capacity();
                    prop_assert_eq!(arr.as_slice(), model.as_slice());
                }
            }

            #[test]
            fn insert_then_erase_restores(
                values in proptest::collection::vec(any::<i16>(), 0..40),
                index in any::<usize>(),
                v in any::<i16>(),
            ) {
                let mut arr = DynamicArray::try_from(values.as_slice()).unwrap();
                let i = index % (values.len() + 1);
                arr.insert(i, v).unwrap();
                arr.erase(i);
                prop_assert_eq!(arr.as_slice(), values.as_slice());
            }

            #[test]
            fn copy_relocation_failure_preserves_state(
                len in 1usize..24,
                fail_at in 0usize..24,
            ) {
                let ledger = Ledger::new();
                let budget = CopyBudget::unlimited();
                let mut arr = DynamicArray::new();
                for v in 0..len as i64 {
                    arr.push(ledger.fragile(v, &budget)).unwrap();
                }
                let cap = arr.capacity();
                arr.resize_with(cap, || ledger.fragile(-1, &budget)).unwrap();
                let before: Vec<i64> = arr.iter().map(|f| f.value()).collect();

                budget.fail_after(fail_at.min(cap.saturating_sub(1)));
                let result = arr.push(ledger.fragile(99, &budget));
                prop_assert!(result.is_err());
                prop_assert_eq!(arr.capacity(), cap);
                let after: Vec<i64> = arr.iter().map(|f| f.value()).collect();
                prop_assert_eq!(after, before);
                prop_assert_eq!(ledger.live(), cap);
            }
        }
    }
}
