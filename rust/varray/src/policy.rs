//! Capacity management policy for varrays.

/// Growth and shrink policy applied by a varray when its capacity changes
/// organically (through push, insert, pop and erase).
///
/// The policy is fixed at construction time. The defaults implement the
/// classic asymmetric scheme: capacity doubles when an append finds no free
/// slot, and halves when a removal observes occupancy below one third of
/// capacity. Keeping the shrink threshold strictly above the shrink factor
/// prevents grow/shrink oscillation when pushes and pops alternate at a
/// capacity boundary.
///
/// Explicit [`reserve`](crate::raw::RawVarray::reserve) calls are *not*
/// subject to the growth factor: a reserve is treated as an exact sizing
/// hint and reallocates to precisely the requested capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthPolicy {
    /// Capacity multiplier applied when an append finds `len == capacity`.
    pub growth_factor: usize,
    /// Capacity divisor applied when a removal triggers a shrink.
    pub shrink_factor: usize,
    /// Occupancy divisor: a removal shrinks the varray when the pre-removal
    /// length is below `capacity / shrink_threshold`.
    pub shrink_threshold: usize,
    /// Capacity of the first allocation made by a mutating operation on an
    /// unallocated varray.
    pub initial_capacity: usize,
}

impl GrowthPolicy {
    /// The default policy: grow 2x, shrink 2x below 1/3 occupancy, start
    /// with capacity 1.
    pub const DEFAULT: GrowthPolicy = GrowthPolicy {
        growth_factor: 2,
        shrink_factor: 2,
        shrink_threshold: 3,
        initial_capacity: 1,
    };

    /// Checks the policy for degenerate configurations.
    ///
    /// # Panics
    ///
    /// Panics if the growth or shrink factor is below 2, if the shrink
    /// threshold does not exceed the shrink factor, or if the initial
    /// capacity is zero.
    pub fn validate(&self) {
        assert!(
            self.growth_factor >= 2,
            "growth factor must be at least 2, got {}",
            self.growth_factor
        );
        assert!(
            self.shrink_factor >= 2,
            "shrink factor must be at least 2, got {}",
            self.shrink_factor
        );
        assert!(
            self.shrink_threshold > self.shrink_factor,
            "shrink threshold ({}) must exceed the shrink factor ({})",
            self.shrink_threshold,
            self.shrink_factor
        );
        assert!(
            self.initial_capacity >= 1,
            "initial capacity must be at least 1"
        );
    }
}

impl Default for GrowthPolicy {
    fn default() -> GrowthPolicy {
        GrowthPolicy::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        GrowthPolicy::default().validate();
        assert_eq!(GrowthPolicy::default(), GrowthPolicy::DEFAULT);
    }

    #[test]
    #[should_panic(expected = "growth factor")]
    fn rejects_growth_factor_of_one() {
        GrowthPolicy {
            growth_factor: 1,
            ..GrowthPolicy::DEFAULT
        }
        .validate();
    }

    #[test]
    #[should_panic(expected = "shrink threshold")]
    fn rejects_threshold_equal_to_shrink_factor() {
        GrowthPolicy {
            shrink_factor: 2,
            shrink_threshold: 2,
            ..GrowthPolicy::DEFAULT
        }
        .validate();
    }

    #[test]
    #[should_panic(expected = "initial capacity")]
    fn rejects_zero_initial_capacity() {
        GrowthPolicy {
            initial_capacity: 0,
            ..GrowthPolicy::DEFAULT
        }
        .validate();
    }
}
