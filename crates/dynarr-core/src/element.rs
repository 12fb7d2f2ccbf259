//! Element capabilities and the relocation strategy query.
//!
//! A container never assumes anything about its element type beyond what
//! [`Element`] declares. Before moving live elements into a new storage
//! block it asks [`relocation`] once, and the answer decides whether the old
//! elements are moved out (cheap, cannot fail) or copied (leaves the old
//! block intact, so a failing copy can be rolled back).
//!
//! ```
//! use dynarr_core::{relocation, Element, ElementError, Relocation};
//!
//! struct Ticket(u32);
//!
//! impl Element for Ticket {
//!     const INFALLIBLE_MOVE: bool = false;
//!     const COPYABLE: bool = true;
//!
//!     fn try_copy(&self) -> Result<Self, ElementError> {
//!         Ok(Ticket(self.0))
//!     }
//! }
//!
//! assert_eq!(relocation::<Ticket>(), Relocation::Copy);
//! assert_eq!(relocation::<u64>(), Relocation::Move);
//! ```

use std::rc::Rc;
use std::sync::Arc;

use crate::error::ElementError;

/// How live elements travel from an old storage block to a new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relocation {
    /// Move each element; the old slots become raw memory.
    Move,
    /// Copy each element, then destroy the originals once every copy exists.
    Copy,
}

/// Capabilities a container element declares.
///
/// The defaults describe a move-only type whose moves cannot fail. Types that
/// can be duplicated override [`COPYABLE`](Element::COPYABLE) and
/// [`try_copy`](Element::try_copy); types whose relocation must be reversible
/// additionally set [`INFALLIBLE_MOVE`](Element::INFALLIBLE_MOVE) to `false`.
pub trait Element: Sized {
    /// `true` when relocating a value by move can never fail.
    const INFALLIBLE_MOVE: bool = true;

    /// `true` when [`try_copy`](Element::try_copy) can produce values.
    const COPYABLE: bool = false;

    /// Copy-construct a new value from `self`.
    fn try_copy(&self) -> Result<Self, ElementError> {
        Err(ElementError::NotCopyable)
    }

    /// Overwrite `self` with a copy of `source`.
    ///
    /// On failure `self` must still hold a valid value.
    fn try_copy_assign(&mut self, source: &Self) -> Result<(), ElementError> {
        *self = source.try_copy()?;
        Ok(())
    }
}

/// Pick the relocation strategy for `T`.
///
/// Move when moving cannot fail, or when the type cannot be copied at all.
/// Otherwise copy, so that a failure partway through leaves every original
/// element untouched.
pub const fn relocation<T: Element>() -> Relocation {
    if T::INFALLIBLE_MOVE || !T::COPYABLE {
        Relocation::Move
    } else {
        Relocation::Copy
    }
}

/// Implement [`Element`] for `Clone` types.
///
/// Std containers, shared pointers, tuples (up to twelve fields) and arrays
/// already have impls in this module.
///
/// Moves are infallible, copies go through `Clone::clone` and copy-assignment
/// through `Clone::clone_from` (so buffer-owning types can reuse storage).
#[macro_export]
macro_rules! impl_clone_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::Element for $ty {
                const COPYABLE: bool = true;

                fn try_copy(&self) -> ::core::result::Result<Self, $crate::ElementError> {
                    ::core::result::Result::Ok(::core::clone::Clone::clone(self))
                }

                fn try_copy_assign(
                    &mut self,
                    source: &Self,
                ) -> ::core::result::Result<(), $crate::ElementError> {
                    ::core::clone::Clone::clone_from(self, source);
                    ::core::result::Result::Ok(())
                }
            }
        )*
    };
}

impl_clone_element!(
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    bool,
    char,
    (),
    String,
    &'static str,
);

impl<T: Element> Element for Option<T> {
    const INFALLIBLE_MOVE: bool = T::INFALLIBLE_MOVE;
    const COPYABLE: bool = T::COPYABLE;

    fn try_copy(&self) -> Result<Self, ElementError> {
        match self {
            Some(value) => value.try_copy().map(Some),
            None => Ok(None),
        }
    }
}

// Moving a Box moves the pointer, never the pointee.
impl<T: Element> Element for Box<T> {
    const COPYABLE: bool = T::COPYABLE;

    fn try_copy(&self) -> Result<Self, ElementError> {
        (**self).try_copy().map(Box::new)
    }

    fn try_copy_assign(&mut self, source: &Self) -> Result<(), ElementError> {
        (**self).try_copy_assign(source)
    }
}

// A Vec moves its buffer pointer; copies go element by element.
impl<T: Element> Element for Vec<T> {
    const COPYABLE: bool = T::COPYABLE;

    fn try_copy(&self) -> Result<Self, ElementError> {
        self.iter().map(Element::try_copy).collect()
    }
}

// Copying a shared pointer bumps the refcount and cannot fail.
impl<T: ?Sized> Element for Rc<T> {
    const COPYABLE: bool = true;

    fn try_copy(&self) -> Result<Self, ElementError> {
        Ok(Rc::clone(self))
    }
}

impl<T: ?Sized> Element for Arc<T> {
    const COPYABLE: bool = true;

    fn try_copy(&self) -> Result<Self, ElementError> {
        Ok(Arc::clone(self))
    }
}

impl<T: Element, const N: usize> Element for [T; N] {
    const INFALLIBLE_MOVE: bool = T::INFALLIBLE_MOVE;
    const COPYABLE: bool = T::COPYABLE;

    fn try_copy(&self) -> Result<Self, ElementError> {
        let copies = self
            .iter()
            .map(Element::try_copy)
            .collect::<Result<Vec<T>, _>>()?;
        copies
            .try_into()
            .map_err(|copies: Vec<T>| ElementError::CopyFailed {
                reason: format!("copied {} of {N} array elements", copies.len()),
            })
    }
}

/// Tuples are copyable when every field is, and move infallibly when every
/// field does.
macro_rules! impl_tuple_element {
    ($($name:ident $idx:tt),+) => {
        impl<$($name: Element),+> Element for ($($name,)+) {
            const INFALLIBLE_MOVE: bool = true $(&& $name::INFALLIBLE_MOVE)+;
            const COPYABLE: bool = true $(&& $name::COPYABLE)+;

            fn try_copy(&self) -> Result<Self, ElementError> {
                Ok(($(self.$idx.try_copy()?,)+))
            }
        }
    };
}

impl_tuple_element!(A 0);
impl_tuple_element!(A 0, B 1);
impl_tuple_element!(A 0, B 1, C 2);
impl_tuple_element!(A 0, B 1, C 2, D 3);
impl_tuple_element!(A 0, B 1, C 2, D 3, E 4);
impl_tuple_element!(A 0, B 1, C 2, D 3, E 4, F 5);
impl_tuple_element!(A 0, B 1, C 2, D 3, E 4, F 5, G 6);
impl_tuple_element!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);
impl_tuple_element!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8);
impl_tuple_element!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9);
impl_tuple_element!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10);
impl_tuple_element!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10, L 11);
