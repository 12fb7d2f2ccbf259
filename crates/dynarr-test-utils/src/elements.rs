//! Instrumented element types.
//!
//! All three types enroll with a [`Ledger`] on construction (including
//! copies) and retire on drop. Equality compares values only.

use std::fmt;

use dynarr_core::{Element, ElementError};

use crate::ledger::{CopyBudget, Ledger};

impl Ledger {
    /// A new [`Tracked`] instance holding `value`.
    pub fn tracked(&self, value: i64) -> Tracked {
        Tracked {
            value,
            serial: self.enroll(),
            ledger: self.clone(),
        }
    }

    /// A new [`Fragile`] instance whose copies draw on `budget`.
    pub fn fragile(&self, value: i64, budget: &CopyBudget) -> Fragile {
        Fragile {
            value,
            serial: self.enroll(),
            ledger: self.clone(),
            budget: budget.clone(),
        }
    }

    /// A new [`MoveOnly`] instance holding `value`.
    pub fn move_only(&self, value: i64) -> MoveOnly {
        MoveOnly {
            value,
            serial: self.enroll(),
            ledger: self.clone(),
        }
    }
}

// ── Tracked ─────────────────────────────────────────────────────────

/// Copyable element whose moves cannot fail.
pub struct Tracked {
    value: i64,
    serial: u64,
    ledger: Ledger,
}

impl Tracked {
    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn set_value(&mut self, value: i64) {
        self.value = value;
    }
}

impl Element for Tracked {
    const COPYABLE: bool = true;

    fn try_copy(&self) -> Result<Self, ElementError> {
        Ok(self.ledger.tracked(self.value))
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.ledger.retire(self.serial);
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl fmt::Debug for Tracked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tracked({} #{})", self.value, self.serial)
    }
}

// ── Fragile ─────────────────────────────────────────────────────────

/// Copyable element that declares its move fallible, so containers relocate
/// it by copy. Each copy draws on a shared [`CopyBudget`].
pub struct Fragile {
    value: i64,
    serial: u64,
    ledger: Ledger,
    budget: CopyBudget,
}

impl Fragile {
    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }
}

impl Element for Fragile {
    const INFALLIBLE_MOVE: bool = false;
    const COPYABLE: bool = true;

    fn try_copy(&self) -> Result<Self, ElementError> {
        if !self.budget.draw() {
            return Err(ElementError::CopyFailed {
                reason: format!(
                    "copy budget exhausted copying instance {} (value {})",
                    self.serial, self.value
                ),
            });
        }
        Ok(self.ledger.fragile(self.value, &self.budget))
    }
}

impl Drop for Fragile {
    fn drop(&mut self) {
        self.ledger.retire(self.serial);
    }
}

impl PartialEq for Fragile {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl fmt::Debug for Fragile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fragile({} #{})", self.value, self.serial)
    }
}

// ── MoveOnly ────────────────────────────────────────────────────────

/// Element with no copy capability and a fallible move. Containers have no
/// choice but to relocate it by move.
pub struct MoveOnly {
    value: i64,
    serial: u64,
    ledger: Ledger,
}

impl MoveOnly {
    pub fn value(&self) -> i64 {
        self.value
    }
}

impl Element for MoveOnly {
    const INFALLIBLE_MOVE: bool = false;
}

impl Drop for MoveOnly {
    fn drop(&mut self) {
        self.ledger.retire(self.serial);
    }
}

impl PartialEq for MoveOnly {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl fmt::Debug for MoveOnly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MoveOnly({} #{})", self.value, self.serial)
    }
}
