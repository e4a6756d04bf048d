use crate::spatial::tiles::CandidateId;
use bitvec::prelude::*;
use std::fmt;

/// Fixed-size bitset of candidates still possible at a cell
///
/// Bit `i` is set when the candidate with id `i` is present. Capacity is the
/// tileset size and never changes, so two domains of the same tileset can be
/// combined with plain bitwise operations.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Domain {
    bits: BitVec,
}

impl Domain {
    /// Create a domain with no candidates present
    pub fn empty(capacity: usize) -> Self {
        Self {
            bits: bitvec![0; capacity],
        }
    }

    /// Create a domain containing every candidate
    pub fn full(capacity: usize) -> Self {
        Self {
            bits: bitvec![1; capacity],
        }
    }

    /// Create a domain holding exactly one candidate
    pub fn single(capacity: usize, candidate: CandidateId) -> Self {
        let mut domain = Self::empty(capacity);
        domain.insert(candidate);
        domain
    }

    /// Wrap an existing bit slice
    pub fn from_bits(bits: &BitSlice) -> Self {
        Self {
            bits: bits.to_bitvec(),
        }
    }

    /// Raw bits, one per candidate id
    pub fn bits(&self) -> &BitSlice {
        &self.bits
    }

    /// Number of candidate slots, present or not
    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Insert a candidate; ids past capacity are ignored
    pub fn insert(&mut self, candidate: CandidateId) {
        if let Some(mut bit) = self.bits.get_mut(candidate.index()) {
            *bit = true;
        }
    }

    /// Remove a candidate, returning whether it was present
    pub fn remove(&mut self, candidate: CandidateId) -> bool {
        self.bits
            .get_mut(candidate.index())
            .is_some_and(|mut bit| std::mem::replace(&mut *bit, false))
    }

    /// Test candidate membership
    pub fn contains(&self, candidate: CandidateId) -> bool {
        self.bits.get(candidate.index()).as_deref() == Some(&true)
    }

    /// Intersect this domain with another in-place
    pub fn intersect_with(&mut self, other: &Self) {
        self.bits &= &other.bits;
    }

    /// Union this domain with another in-place
    pub fn union_with(&mut self, other: &Self) {
        self.bits |= &other.bits;
    }

    /// Create a new domain containing the intersection
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.intersect_with(other);
        result
    }

    /// Test if every candidate of this domain is also in `other`
    pub fn is_subset(&self, other: &Self) -> bool {
        self.bits.len() == other.bits.len()
            && self
                .bits
                .iter_ones()
                .all(|index| other.bits.get(index).as_deref() == Some(&true))
    }

    /// Test if no candidates are present
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Count candidates in the set
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// The only candidate, when exactly one is present
    pub fn single_candidate(&self) -> Option<CandidateId> {
        if self.count() == 1 {
            self.bits.first_one().map(CandidateId::new)
        } else {
            None
        }
    }

    /// Iterate present candidates in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = CandidateId> + '_ {
        self.bits.iter_ones().map(CandidateId::new)
    }

    /// Extract all candidate ids as a vector
    pub fn to_vec(&self) -> Vec<CandidateId> {
        self.iter().collect()
    }
}

impl FromIterator<CandidateId> for Domain {
    /// Collects into a domain sized to the largest id seen
    ///
    /// Prefer [`Domain::empty`] plus [`Domain::insert`] when the tileset size is known.
    fn from_iter<I: IntoIterator<Item = CandidateId>>(iter: I) -> Self {
        let ids: Vec<CandidateId> = iter.into_iter().collect();
        let capacity = ids.iter().map(|id| id.index() + 1).max().unwrap_or(0);
        let mut domain = Self::empty(capacity);
        for id in ids {
            domain.insert(id);
        }
        domain
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<usize> = self.bits.iter_ones().collect();
        write!(f, "Domain({} candidates: {ids:?})", self.count())
    }
}
