//! Growth policy configuration.

use dynarr_core::ArrayError;

/// How capacity grows when an append or insert finds the block full.
///
/// New capacity is `max(min_capacity, factor × old_capacity)`. Validated at
/// construction; immutable afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrowthPolicy {
    factor: usize,
    min_capacity: usize,
}

impl GrowthPolicy {
    /// Default multiplier: capacity doubles.
    pub const DEFAULT_FACTOR: usize = 2;

    /// Default capacity of the first block allocated by growth.
    pub const DEFAULT_MIN_CAPACITY: usize = 1;

    /// Create a policy, rejecting parameters that would fail to grow.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::InvalidGrowthPolicy`] if `factor < 2` or
    /// `min_capacity == 0`.
    pub fn new(factor: usize, min_capacity: usize) -> Result<Self, ArrayError> {
        if factor < 2 {
            return Err(ArrayError::InvalidGrowthPolicy {
                reason: format!("factor must be at least 2, got {factor}"),
            });
        }
        if min_capacity == 0 {
            return Err(ArrayError::InvalidGrowthPolicy {
                reason: "min_capacity must be at least 1".into(),
            });
        }
        Ok(Self {
            factor,
            min_capacity,
        })
    }

    /// Capacity multiplier.
    pub fn factor(&self) -> usize {
        self.factor
    }

    /// Smallest capacity growth will ever produce.
    pub fn min_capacity(&self) -> usize {
        self.min_capacity
    }

    /// Capacity to grow to from a full block of `current` slots.
    pub fn next_capacity(&self, current: usize) -> Result<usize, ArrayError> {
        current
            .checked_mul(self.factor)
            .map(|grown| grown.max(self.min_capacity))
            .ok_or(ArrayError::CapacityOverflow { requested: current })
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self {
            factor: Self::DEFAULT_FACTOR,
            min_capacity: Self::DEFAULT_MIN_CAPACITY,
        }
    }
}
