//! Quarter turns about the vertical axis
//!
//! The planar directions `+x, +y, -x, -y` are listed clockwise, so turning a
//! direction by `r` quarter turns is `(index + r) % 4`. `+z` and `-z` are
//! left alone, which makes every rotation a yaw.

use crate::spatial::direction::{Direction, DirectionKind, DirectionSet};
use std::fmt;

const PLANAR: usize = 4;

/// Clockwise quarter turns, always in `0..4`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rotation(u8);

impl Rotation {
    /// No turn
    pub const IDENTITY: Self = Self(0);

    /// Every distinct rotation, identity first
    pub const ALL: [Self; 4] = [Self(0), Self(1), Self(2), Self(3)];

    /// Rotation by `turns` quarter turns, wrapping past a full turn
    pub const fn quarter_turns(turns: usize) -> Self {
        Self((turns % PLANAR) as u8)
    }

    /// Number of quarter turns
    pub const fn turns(self) -> usize {
        self.0 as usize
    }

    /// Angle in degrees
    pub const fn degrees(self) -> u16 {
        self.0 as u16 * 90
    }

    /// This rotation followed by `other`
    #[must_use]
    pub const fn combine(self, other: Self) -> Self {
        Self::quarter_turns(self.turns() + other.turns())
    }

    /// The rotation undoing this one
    #[must_use]
    pub const fn inverse(self) -> Self {
        Self::quarter_turns(PLANAR - self.turns())
    }

    /// True if `directions` can be rotated at all
    pub fn supports(directions: &DirectionSet) -> bool {
        directions.kind() != DirectionKind::Custom
    }

    /// Turn a direction of `directions`
    ///
    /// Returns `None` for directions outside the set, and for any actual
    /// turn of a custom set.
    pub fn apply(self, directions: &DirectionSet, direction: Direction) -> Option<Direction> {
        if !directions.contains(direction) {
            return None;
        }
        if self == Self::IDENTITY {
            return Some(direction);
        }
        if !Self::supports(directions) {
            return None;
        }
        if direction.index() >= PLANAR {
            return Some(direction);
        }
        Some(Direction::new(((direction.index() + self.turns()) % PLANAR) as u8))
    }

    /// Name of the variant of `base` turned by this rotation
    ///
    /// The unturned variant keeps the base name; the others get `@90`,
    /// `@180` or `@270` appended.
    pub fn variant_name(self, base: &str) -> String {
        if self == Self::IDENTITY {
            base.to_string()
        } else {
            format!("{base}@{}", self.degrees())
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}deg", self.degrees())
    }
}
