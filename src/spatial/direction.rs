//! Directions between neighbouring cells and the sets they come in
//!
//! A direction is a dense index into a [`DirectionSet`]. The set names each
//! direction and pairs it with its opposite, which is what keeps adjacency
//! rules and neighbour relations symmetric.

use crate::io::error::DefinitionError;
use std::fmt;

/// Index of a direction within its [`DirectionSet`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Direction(u8);

impl Direction {
    /// Toward increasing x
    pub const POS_X: Self = Self(0);
    /// Toward increasing y
    pub const POS_Y: Self = Self(1);
    /// Toward decreasing x
    pub const NEG_X: Self = Self(2);
    /// Toward decreasing y
    pub const NEG_Y: Self = Self(3);
    /// Toward increasing z (3D sets only)
    pub const POS_Z: Self = Self(4);
    /// Toward decreasing z (3D sets only)
    pub const NEG_Z: Self = Self(5);

    /// Create a direction from its index
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Position of this direction within its set
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which family a direction set belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectionKind {
    /// `+x`, `+y`, `-x`, `-y`
    Cartesian2D,
    /// `+x`, `+y`, `-x`, `-y`, `+z`, `-z`
    Cartesian3D,
    /// User supplied names and opposites, used by graph shapes
    Custom,
}

/// Named directions paired with their opposites
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectionSet {
    kind: DirectionKind,
    names: Vec<String>,
    opposites: Vec<Direction>,
}

const CARTESIAN_NAMES: [&str; 6] = ["+x", "+y", "-x", "-y", "+z", "-z"];

impl DirectionSet {
    /// The four planar directions, clockwise from `+x`
    pub fn cartesian_2d() -> Self {
        Self {
            kind: DirectionKind::Cartesian2D,
            names: CARTESIAN_NAMES.iter().take(4).map(ToString::to_string).collect(),
            opposites: vec![
                Direction::NEG_X,
                Direction::NEG_Y,
                Direction::POS_X,
                Direction::POS_Y,
            ],
        }
    }

    /// The planar directions followed by `+z` and `-z`
    pub fn cartesian_3d() -> Self {
        Self {
            kind: DirectionKind::Cartesian3D,
            names: CARTESIAN_NAMES.iter().map(ToString::to_string).collect(),
            opposites: vec![
                Direction::NEG_X,
                Direction::NEG_Y,
                Direction::POS_X,
                Direction::POS_Y,
                Direction::NEG_Z,
                Direction::POS_Z,
            ],
        }
    }

    /// A custom set, where `opposites[i]` is the index of the direction reversing `names[i]`
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] if the set is empty or larger than 256 directions,
    /// names repeat, the lengths differ, or `opposites` is not an involution.
    pub fn custom(names: Vec<String>, opposites: Vec<usize>) -> Result<Self, DefinitionError> {
        if names.is_empty() || names.len() > usize::from(u8::MAX) + 1 {
            return Err(DefinitionError::InvalidDirectionSet {
                reason: format!("expected 1..=256 directions, got {}", names.len()),
            });
        }
        if names.len() != opposites.len() {
            return Err(DefinitionError::InvalidDirectionSet {
                reason: format!(
                    "{} direction names but {} opposites",
                    names.len(),
                    opposites.len()
                ),
            });
        }
        for (i, name) in names.iter().enumerate() {
            if names.iter().skip(i + 1).any(|other| other == name) {
                return Err(DefinitionError::InvalidDirectionSet {
                    reason: format!("direction name '{name}' is repeated"),
                });
            }
        }
        for (i, &opposite) in opposites.iter().enumerate() {
            let round_trip = opposites.get(opposite).copied();
            if round_trip != Some(i) {
                return Err(DefinitionError::InvalidDirectionSet {
                    reason: format!("opposite of direction {i} does not lead back to it"),
                });
            }
        }

        Ok(Self {
            kind: DirectionKind::Custom,
            names,
            opposites: opposites
                .into_iter()
                .map(|index| Direction(index as u8))
                .collect(),
        })
    }

    /// Family of this set
    pub const fn kind(&self) -> DirectionKind {
        self.kind
    }

    /// Number of directions
    pub fn len(&self) -> usize {
        self.opposites.len()
    }

    /// True when the set holds no directions (never the case for a validated set)
    pub fn is_empty(&self) -> bool {
        self.opposites.is_empty()
    }

    /// True if the direction belongs to this set
    pub fn contains(&self, direction: Direction) -> bool {
        direction.index() < self.len()
    }

    /// The direction reversing `direction`
    ///
    /// Out-of-range directions are returned unchanged.
    pub fn opposite(&self, direction: Direction) -> Direction {
        self.opposites
            .get(direction.index())
            .copied()
            .unwrap_or(direction)
    }

    /// Human readable name of a direction
    pub fn name(&self, direction: Direction) -> Option<&str> {
        self.names.get(direction.index()).map(String::as_str)
    }

    /// Look a direction up by name
    pub fn find(&self, name: &str) -> Option<Direction> {
        self.names
            .iter()
            .position(|candidate| candidate == name)
            .map(|index| Direction(index as u8))
    }

    /// Every direction in index order
    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        (0..self.len()).map(|index| Direction(index as u8))
    }
}

impl fmt::Display for DirectionSet {
    /// `Kind(name|opposite, ...)`, enough to tell two sets of equal size apart
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}(", self.kind)?;
        for (index, direction) in self.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            let name = self.name(direction).unwrap_or_default();
            let opposite = self.name(self.opposite(direction)).unwrap_or_default();
            write!(f, "{name}|{opposite}")?;
        }
        write!(f, ")")
    }
}
