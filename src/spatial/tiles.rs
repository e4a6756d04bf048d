//! Candidate definitions and the directional adjacency model
//!
//! A [`TileSet`] is built once through [`TileSetBuilder`], validated, and then
//! shared read-only by every solve that uses it.

use crate::algorithm::bitset::Domain;
use crate::io::configuration::DEFAULT_CANDIDATE_WEIGHT;
use crate::io::error::DefinitionError;
use crate::spatial::direction::{Direction, DirectionSet};
use crate::spatial::rotation::Rotation;
use std::collections::BTreeMap;
use std::fmt;

/// Dense identifier of a candidate within its tileset
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidateId(usize);

impl CandidateId {
    /// Create an id from its index
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the candidate within its tileset
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

/// A tile variant that may occupy a cell
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Identifier, equal to the candidate's position in the tileset
    pub id: CandidateId,
    /// Unique name used by rule files and hosts
    pub name: String,
    /// Base weight for entropy and weighted choice, always positive
    pub weight: f64,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}(W{:.2})", self.id, self.name, self.weight)
    }
}

/// Rule endpoint, resolved to ids at build time
#[derive(Clone, Debug)]
enum RuleRef {
    Name(String),
    Id(CandidateId),
}

#[derive(Clone, Debug)]
struct PendingRule {
    from: RuleRef,
    direction: String,
    to: RuleRef,
}

/// Cap on how many cells may end up holding a candidate of `group`
///
/// A cell counts once it is down to a single candidate, whether by a
/// decision or by propagation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountLimit {
    /// Candidates sharing the cap
    pub group: Domain,
    /// Largest number of resolved cells allowed in the group
    pub max: usize,
}

const UNTURNED: [Rotation; 1] = [Rotation::IDENTITY];

/// Collects candidates and rules, validating everything in [`TileSetBuilder::build`]
#[derive(Clone, Debug)]
pub struct TileSetBuilder {
    directions: DirectionSet,
    candidates: Vec<(String, f64)>,
    rotatable: Vec<usize>,
    rules: Vec<PendingRule>,
    boundary: Vec<(RuleRef, String)>,
    limits: Vec<(Vec<RuleRef>, usize)>,
}

impl TileSetBuilder {
    /// Start an empty tileset over a direction set
    pub const fn new(directions: DirectionSet) -> Self {
        Self {
            directions,
            candidates: Vec::new(),
            rotatable: Vec::new(),
            rules: Vec::new(),
            boundary: Vec::new(),
            limits: Vec::new(),
        }
    }

    /// Define a candidate and return the id it will receive
    pub fn add_candidate(&mut self, name: impl Into<String>, weight: f64) -> CandidateId {
        self.candidates.push((name.into(), weight));
        CandidateId(self.candidates.len() - 1)
    }

    /// Define a candidate with the default weight
    pub fn add_candidate_default(&mut self, name: impl Into<String>) -> CandidateId {
        self.add_candidate(name, DEFAULT_CANDIDATE_WEIGHT)
    }

    /// Define a candidate together with its three quarter-turned variants
    ///
    /// The variants are named by [`Rotation::variant_name`] and receive
    /// consecutive ids after the returned base id. Every rule or boundary
    /// prohibition that mentions one of them is replicated for each turn,
    /// with its direction turned the same way.
    pub fn add_rotatable(&mut self, name: impl Into<String>, weight: f64) -> CandidateId {
        let name = name.into();
        let base = self.candidates.len();
        for rotation in Rotation::ALL {
            self.candidates.push((rotation.variant_name(&name), weight));
        }
        self.rotatable.push(base);
        CandidateId(base)
    }

    /// Allow at most `max` cells to resolve to any candidate named in `names`
    pub fn limit_count<I, S>(&mut self, names: I, max: usize) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let group = names.into_iter().map(|name| RuleRef::Name(name.into())).collect();
        self.limits.push((group, max));
        self
    }

    /// Allow `to` to be placed in `direction` from `from`
    ///
    /// The reverse adjacency (`from` in the opposite direction from `to`) is
    /// recorded as well, since both describe the same pair of cells.
    pub fn allow(
        &mut self,
        from: impl Into<String>,
        direction: impl Into<String>,
        to: impl Into<String>,
    ) -> &mut Self {
        self.rules.push(PendingRule {
            from: RuleRef::Name(from.into()),
            direction: direction.into(),
            to: RuleRef::Name(to.into()),
        });
        self
    }

    /// Id based variant of [`TileSetBuilder::allow`]
    pub fn allow_ids(&mut self, from: CandidateId, direction: Direction, to: CandidateId) -> &mut Self {
        let direction = self
            .directions
            .name(direction)
            .map_or_else(|| direction.to_string(), ToString::to_string);
        self.rules.push(PendingRule {
            from: RuleRef::Id(from),
            direction,
            to: RuleRef::Id(to),
        });
        self
    }

    /// Forbid a candidate in cells whose neighbour in `direction` lies outside the grid
    pub fn prohibit_boundary(
        &mut self,
        candidate: impl Into<String>,
        direction: impl Into<String>,
    ) -> &mut Self {
        self.boundary
            .push((RuleRef::Name(candidate.into()), direction.into()));
        self
    }

    /// Validate and freeze the tileset
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] if:
    /// - No candidates were defined
    /// - Two candidates share a name
    /// - A weight is not a positive finite number
    /// - A rule references an undefined candidate or an unknown direction
    /// - A count limit is empty or has a maximum of zero
    /// - A candidate is rotatable but the direction set is custom
    pub fn build(&self) -> Result<TileSet, DefinitionError> {
        if self.candidates.is_empty() {
            return Err(DefinitionError::EmptyTileSet);
        }
        if let Some(&base) = self.rotatable.first()
            && !Rotation::supports(&self.directions)
        {
            let candidate = self
                .candidates
                .get(base)
                .map_or_else(String::new, |(name, _)| name.clone());
            return Err(DefinitionError::RotationUnsupported { candidate });
        }

        let mut candidates = Vec::with_capacity(self.candidates.len());
        for (index, (name, weight)) in self.candidates.iter().enumerate() {
            if self.candidates.iter().take(index).any(|(other, _)| other == name) {
                return Err(DefinitionError::DuplicateCandidate { name: name.clone() });
            }
            validate_weight(name, *weight)?;
            candidates.push(Candidate {
                id: CandidateId(index),
                name: name.clone(),
                weight: *weight,
            });
        }

        let variants = self.variants();
        let count = candidates.len();
        let mut compatibility = vec![Domain::empty(count); self.directions.len() * count];
        for rule in &self.rules {
            let from = self.resolve(&rule.from, &candidates)?;
            let to = self.resolve(&rule.to, &candidates)?;
            let direction = self.resolve_direction(&rule.direction)?;

            for &turn in self.turns_for(&variants, &[from, to]) {
                let Some(direction) = turn.apply(&self.directions, direction) else {
                    continue;
                };
                let from = self.turn_candidate(&variants, from, turn);
                let to = self.turn_candidate(&variants, to, turn);
                let reverse = self.directions.opposite(direction);

                if let Some(row) = compatibility.get_mut(direction.index() * count + from.index()) {
                    row.insert(to);
                }
                if let Some(row) = compatibility.get_mut(reverse.index() * count + to.index()) {
                    row.insert(from);
                }
            }
        }

        let mut boundary_allowed = vec![Domain::full(count); self.directions.len()];
        for (candidate, direction) in &self.boundary {
            let candidate = self.resolve(candidate, &candidates)?;
            let direction = self.resolve_direction(direction)?;
            for &turn in self.turns_for(&variants, &[candidate]) {
                let Some(direction) = turn.apply(&self.directions, direction) else {
                    continue;
                };
                if let Some(allowed) = boundary_allowed.get_mut(direction.index()) {
                    allowed.remove(self.turn_candidate(&variants, candidate, turn));
                }
            }
        }

        let mut limits = Vec::with_capacity(self.limits.len());
        for (names, max) in &self.limits {
            if names.is_empty() || *max == 0 {
                return Err(DefinitionError::InvalidCountLimit {
                    reason: format!("{} candidates with a maximum of {max}", names.len()),
                });
            }
            let mut group = Domain::empty(count);
            for name in names {
                group.insert(self.resolve(name, &candidates)?);
            }
            limits.push(CountLimit { group, max: *max });
        }

        Ok(TileSet::from_parts(
            self.directions.clone(),
            candidates,
            compatibility,
            boundary_allowed,
            limits,
            variants,
        ))
    }

    /// Base id and rotation of every candidate
    fn variants(&self) -> Vec<(CandidateId, Rotation)> {
        let mut variants: Vec<(CandidateId, Rotation)> = (0..self.candidates.len())
            .map(|index| (CandidateId(index), Rotation::IDENTITY))
            .collect();
        for &base in &self.rotatable {
            for rotation in Rotation::ALL {
                if let Some(slot) = variants.get_mut(base + rotation.turns()) {
                    *slot = (CandidateId(base), rotation);
                }
            }
        }
        variants
    }

    fn is_rotatable(&self, variants: &[(CandidateId, Rotation)], id: CandidateId) -> bool {
        variants
            .get(id.index())
            .is_some_and(|(base, _)| self.rotatable.contains(&base.index()))
    }

    /// Turns a rule over `ids` is replicated for
    fn turns_for(&self, variants: &[(CandidateId, Rotation)], ids: &[CandidateId]) -> &'static [Rotation] {
        if ids.iter().any(|&id| self.is_rotatable(variants, id)) {
            &Rotation::ALL
        } else {
            &UNTURNED
        }
    }

    /// The variant of `id` turned a further `turn`; other candidates stay put
    fn turn_candidate(
        &self,
        variants: &[(CandidateId, Rotation)],
        id: CandidateId,
        turn: Rotation,
    ) -> CandidateId {
        match variants.get(id.index()) {
            Some(&(base, rotation)) if self.is_rotatable(variants, id) => {
                CandidateId(base.index() + rotation.combine(turn).turns())
            }
            _ => id,
        }
    }

    fn resolve(&self, reference: &RuleRef, candidates: &[Candidate]) -> Result<CandidateId, DefinitionError> {
        match reference {
            RuleRef::Name(name) => candidates
                .iter()
                .find(|candidate| &candidate.name == name)
                .map(|candidate| candidate.id)
                .ok_or_else(|| DefinitionError::UndefinedCandidate { name: name.clone() }),
            RuleRef::Id(id) if id.index() < candidates.len() => Ok(*id),
            RuleRef::Id(id) => Err(DefinitionError::UndefinedCandidate {
                name: id.to_string(),
            }),
        }
    }

    fn resolve_direction(&self, name: &str) -> Result<Direction, DefinitionError> {
        self.directions
            .find(name)
            .ok_or_else(|| DefinitionError::UnknownDirection {
                name: name.to_string(),
            })
    }
}

fn validate_weight(name: &str, weight: f64) -> Result<(), DefinitionError> {
    if weight.is_finite() && weight > 0.0 {
        Ok(())
    } else {
        Err(DefinitionError::InvalidWeight {
            candidate: name.to_string(),
            weight,
        })
    }
}

/// Immutable candidates plus compatibility tables
///
/// `compatibility[d * n + a]` holds every candidate that may sit in direction
/// `d` from candidate `a`, which makes the support of a whole domain a union of
/// rows.
#[derive(Clone, Debug)]
pub struct TileSet {
    directions: DirectionSet,
    candidates: Vec<Candidate>,
    compatibility: Vec<Domain>,
    boundary_allowed: Vec<Domain>,
    limits: Vec<CountLimit>,
    variants: Vec<(CandidateId, Rotation)>,
    weight_log_weights: Vec<f64>,
}

impl TileSet {
    /// Start building a tileset
    pub const fn builder(directions: DirectionSet) -> TileSetBuilder {
        TileSetBuilder::new(directions)
    }

    fn from_parts(
        directions: DirectionSet,
        candidates: Vec<Candidate>,
        compatibility: Vec<Domain>,
        boundary_allowed: Vec<Domain>,
        limits: Vec<CountLimit>,
        variants: Vec<(CandidateId, Rotation)>,
    ) -> Self {
        let weight_log_weights = candidates
            .iter()
            .map(|candidate| candidate.weight * candidate.weight.ln())
            .collect();
        Self {
            directions,
            candidates,
            compatibility,
            boundary_allowed,
            limits,
            variants,
            weight_log_weights,
        }
    }

    /// Copy of this tileset with some weights replaced by name
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] if an override names an undefined
    /// candidate or carries a non-positive weight.
    pub fn with_weights(&self, overrides: &BTreeMap<String, f64>) -> Result<Self, DefinitionError> {
        let mut candidates = self.candidates.clone();
        for (name, &weight) in overrides {
            let candidate = candidates
                .iter_mut()
                .find(|candidate| &candidate.name == name)
                .ok_or_else(|| DefinitionError::UndefinedCandidate { name: name.clone() })?;
            validate_weight(name, weight)?;
            candidate.weight = weight;
        }
        Ok(Self::from_parts(
            self.directions.clone(),
            candidates,
            self.compatibility.clone(),
            self.boundary_allowed.clone(),
            self.limits.clone(),
            self.variants.clone(),
        ))
    }

    /// Direction set the rules are expressed in
    pub const fn directions(&self) -> &DirectionSet {
        &self.directions
    }

    /// All candidates in id order
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Look up a candidate by id
    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.get(id.index())
    }

    /// Look up a candidate by name
    pub fn find(&self, name: &str) -> Option<CandidateId> {
        self.candidates
            .iter()
            .find(|candidate| candidate.name == name)
            .map(|candidate| candidate.id)
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// True if there are no candidates (never the case for a built tileset)
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Base weight of a candidate, zero for unknown ids
    pub fn weight(&self, id: CandidateId) -> f64 {
        self.candidates.get(id.index()).map_or(0.0, |c| c.weight)
    }

    /// Precomputed `w * ln(w)` of a candidate
    pub fn weight_log_weight(&self, id: CandidateId) -> f64 {
        self.weight_log_weights.get(id.index()).copied().unwrap_or(0.0)
    }

    /// True if `b` may be placed in `direction` from `a`
    ///
    /// Total over its inputs: unknown ids or directions are simply incompatible.
    pub fn is_compatible(&self, a: CandidateId, b: CandidateId, direction: Direction) -> bool {
        if a.index() >= self.len() || !self.directions.contains(direction) {
            return false;
        }
        self.compatibility
            .get(direction.index() * self.len() + a.index())
            .is_some_and(|row| row.contains(b))
    }

    /// Candidates allowed in `direction` from a single candidate
    pub fn compatible_with(&self, a: CandidateId, direction: Direction) -> Domain {
        if a.index() >= self.len() {
            return Domain::empty(self.len());
        }
        self.compatibility
            .get(direction.index() * self.len() + a.index())
            .cloned()
            .unwrap_or_else(|| Domain::empty(self.len()))
    }

    /// Every candidate with at least one compatible partner in `domain` along `direction`
    pub fn supported(&self, domain: &Domain, direction: Direction) -> Domain {
        let mut support = Domain::empty(self.len());
        let base = direction.index() * self.len();
        for candidate in domain.iter() {
            if let Some(row) = self.compatibility.get(base + candidate.index()) {
                support.union_with(row);
            }
        }
        support
    }

    /// Candidates allowed next to the grid edge in `direction`
    pub fn boundary_allowed(&self, direction: Direction) -> Domain {
        self.boundary_allowed
            .get(direction.index())
            .cloned()
            .unwrap_or_else(|| Domain::full(self.len()))
    }

    /// Count limits in definition order
    pub fn count_limits(&self) -> &[CountLimit] {
        &self.limits
    }

    /// Candidate a variant was turned from, itself for unrotated candidates
    pub fn base(&self, id: CandidateId) -> CandidateId {
        self.variants.get(id.index()).map_or(id, |&(base, _)| base)
    }

    /// How far a variant is turned from its base
    pub fn rotation(&self, id: CandidateId) -> Rotation {
        self.variants
            .get(id.index())
            .map_or(Rotation::IDENTITY, |&(_, rotation)| rotation)
    }

    /// True if some candidate carries a boundary prohibition
    pub fn has_boundary_rules(&self) -> bool {
        self.boundary_allowed
            .iter()
            .any(|allowed| allowed.count() < self.len())
    }

    /// Readable label for debug output
    pub fn describe(&self, id: CandidateId) -> String {
        self.candidate(id)
            .map_or_else(|| id.to_string(), ToString::to_string)
    }
}
