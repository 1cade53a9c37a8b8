//! Inclusive integer range used by the slider and stepper fields.

use serde::Serialize;

/// Inclusive `[min, max]` range. `min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Bounds {
    min: u32,
    max: u32,
}

impl Bounds {
    /// Build a range, swapping the ends if they arrive reversed.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Lower end, inclusive.
    #[must_use]
    pub const fn min(self) -> u32 {
        self.min
    }

    /// Upper end, inclusive.
    #[must_use]
    pub const fn max(self) -> u32 {
        self.max
    }

    /// Whether `value` lies in the range.
    #[must_use]
    pub const fn contains(self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp `value` into the range.
    #[must_use]
    pub fn clamp(self, value: u32) -> u32 {
        value.clamp(self.min, self.max)
    }

    /// Whether `self` lies entirely inside `outer`.
    #[must_use]
    pub const fn is_within(self, outer: Self) -> bool {
        self.min >= outer.min && self.max <= outer.max
    }

    /// Raise the lower end. Never lowers it and never passes the upper end.
    pub fn raise_min(&mut self, floor: u32) {
        self.min = self.min.max(floor.min(self.max));
    }

    /// Lower the upper end. Never raises it and never passes the lower end.
    pub fn lower_max(&mut self, ceiling: u32) {
        self.max = self.max.min(ceiling.max(self.min));
    }
}
