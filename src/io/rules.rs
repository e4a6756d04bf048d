//! JSON rule files describing a tileset
//!
//! ```json
//! {
//!   "directions": "cartesian2d",
//!   "candidates": [
//!     { "name": "grass", "weight": 3.0 },
//!     { "name": "water" },
//!     { "name": "bridge", "rotatable": true }
//!   ],
//!   "rules": [["grass", "+x", "water"], ["bridge", "+y", "water"]],
//!   "boundary": [["water", "-y"]],
//!   "limits": [{ "candidates": ["bridge", "bridge@90"], "max": 2 }]
//! }
//! ```
//!
//! `directions` is `"cartesian2d"`, `"cartesian3d"` or an object with
//! `names` and `opposites` (index of each direction's opposite). Every rule
//! `[a, d, b]` also allows `a` next to `b` in the opposite direction. A
//! rotatable candidate brings `@90`, `@180` and `@270` variants, and rules
//! naming any of them are turned along.

use crate::io::configuration::DEFAULT_CANDIDATE_WEIGHT;
use crate::io::error::{AlgorithmError, DefinitionError, Result, WithContext};
use crate::spatial::direction::DirectionSet;
use crate::spatial::tiles::TileSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Direction set as written in a rule file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DirectionsEntry {
    /// `"cartesian2d"` or `"cartesian3d"`
    Builtin(String),
    /// Named directions with their opposites
    Custom {
        /// Direction names, in index order
        names: Vec<String>,
        /// Index of the opposite of each direction
        opposites: Vec<usize>,
    },
}

/// One candidate as written in a rule file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CandidateEntry {
    /// Unique name
    pub name: String,
    /// Base weight, 1.0 when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Also define the three quarter-turned variants
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub rotatable: bool,
}

/// Cap on a group of candidates as written in a rule file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitEntry {
    /// Candidate names sharing the cap
    pub candidates: Vec<String>,
    /// Most cells allowed to resolve into the group
    pub max: usize,
}

/// Parsed rule file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleFile {
    /// Direction set the rules use
    pub directions: DirectionsEntry,
    /// Candidates in id order
    pub candidates: Vec<CandidateEntry>,
    /// Allowed adjacencies as `[from, direction, to]`
    #[serde(default)]
    pub rules: Vec<(String, String, String)>,
    /// Candidates barred from the grid edge as `[name, direction]`
    #[serde(default)]
    pub boundary: Vec<(String, String)>,
    /// Caps on how often groups of candidates may appear
    #[serde(default)]
    pub limits: Vec<LimitEntry>,
}

impl RuleFile {
    /// Parse rule file text
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the text is not a valid rule file.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Build the direction set named by the file
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::InvalidDirectionSet`] for unknown built-in
    /// names or malformed custom sets.
    pub fn direction_set(&self) -> std::result::Result<DirectionSet, DefinitionError> {
        match &self.directions {
            DirectionsEntry::Builtin(name) => match name.to_ascii_lowercase().as_str() {
                "cartesian2d" | "2d" => Ok(DirectionSet::cartesian_2d()),
                "cartesian3d" | "3d" => Ok(DirectionSet::cartesian_3d()),
                other => Err(DefinitionError::InvalidDirectionSet {
                    reason: format!("unknown direction set '{other}'"),
                }),
            },
            DirectionsEntry::Custom { names, opposites } => {
                DirectionSet::custom(names.clone(), opposites.clone())
            }
        }
    }

    /// Convert into a validated tileset
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] for anything the tileset builder rejects.
    pub fn to_tileset(&self) -> std::result::Result<TileSet, DefinitionError> {
        let mut builder = TileSet::builder(self.direction_set()?);
        for candidate in &self.candidates {
            let weight = candidate.weight.unwrap_or(DEFAULT_CANDIDATE_WEIGHT);
            if candidate.rotatable {
                builder.add_rotatable(candidate.name.as_str(), weight);
            } else {
                builder.add_candidate(candidate.name.as_str(), weight);
            }
        }
        for (from, direction, to) in &self.rules {
            builder.allow(from.as_str(), direction.as_str(), to.as_str());
        }
        for (name, direction) in &self.boundary {
            builder.prohibit_boundary(name.as_str(), direction.as_str());
        }
        for limit in &self.limits {
            builder.limit_count(limit.candidates.iter().map(String::as_str), limit.max);
        }
        builder.build()
    }
}

/// Read a rule file and build its tileset
///
/// # Errors
///
/// Returns [`AlgorithmError::FileSystem`] if the file cannot be read,
/// [`AlgorithmError::RulesLoad`] if it is not valid JSON for a rule file, and
/// [`AlgorithmError::Definition`] if the rules are inconsistent.
pub fn load(path: &Path) -> Result<TileSet> {
    let text = std::fs::read_to_string(path).with_path(path, "read rules")?;
    let rules = RuleFile::from_json(&text).map_err(|source| AlgorithmError::RulesLoad {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(rules.to_tileset()?)
}
