//! Domain types: participants, competencies, assessment records.
//!
//! All persisted state lives in these types; the engine holds no private
//! copies across calls. Every operation reads current state from the
//! store, computes a new state, and writes it back in one atomic batch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{MAX_ASSESSORS, MAX_SCORE, MIN_ASSESSORS, VERIFY_THRESHOLD};
use crate::error::EngineError;
use crate::stats;

/// Dense, zero-based competency identifier.
pub type CompetencyId = u64;

/// Opaque 32-byte participant identity.
///
/// The engine never interprets the bytes; any registration substrate that
/// hands out unique 32-byte keys works.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct ParticipantId(pub [u8; 32]);

impl ParticipantId {
    /// Create an identity from a byte array.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 32]> for ParticipantId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for ParticipantId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for ParticipantId {
    type Err = hex::FromHexError;

    /// Parse a 64-character hex identity string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = hex::decode(s)?;
        let bytes: [u8; 32] = raw
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(bytes))
    }
}

/// A registered participant and their aggregate reputation.
///
/// Created at registration, mutated only by the reputation sweep at
/// finalize time, never destroyed.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct Participant {
    /// Opaque identity key.
    pub id: ParticipantId,
    /// Ledger height at which the participant registered.
    pub registered_at: u64,
    /// Aggregate reputation counter. Never goes below zero.
    pub reputation: u64,
    /// Lifetime count of assessments contributed.
    pub total_assessments_given: u64,
    /// Lifetime count of contributions that disagreed with the aggregate.
    pub invalid_assessments_given: u64,
}

impl Participant {
    /// A fresh participant registered at the given height.
    pub fn new(id: ParticipantId, registered_at: u64) -> Self {
        Self {
            id,
            registered_at,
            reputation: 0,
            total_assessments_given: 0,
            invalid_assessments_given: 0,
        }
    }
}

/// A skill defined once by the catalog administrator. Immutable thereafter.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct Competency {
    /// Dense, zero-based id assigned by the catalog allocator.
    pub id: CompetencyId,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Contribution target for one assessment, in `1..=MAX_ASSESSORS`.
    /// Submissions close once this many scores have been collected.
    pub required_assessors: u32,
}

/// Per-(participant, competency) reputation counters.
///
/// Created lazily on first contribution with all-zero defaults.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct SkillReputation {
    pub participant: ParticipantId,
    pub competency_id: CompetencyId,
    /// Skill-specific reputation counter. Never goes below zero.
    pub reputation: u64,
    /// Contributions made under this competency.
    pub assessments_given: u64,
    /// Contributions that agreed with the aggregate.
    pub valid_assessments_given: u64,
}

impl SkillReputation {
    /// All-zero counters for a first-time contributor.
    pub fn new(participant: ParticipantId, competency_id: CompetencyId) -> Self {
        Self {
            participant,
            competency_id,
            reputation: 0,
            assessments_given: 0,
            valid_assessments_given: 0,
        }
    }
}

/// The accumulating state for one (competency, subject) evaluation.
///
/// # Invariants
///
/// * `assessors.len() == scores.len() <= MAX_ASSESSORS`
/// * entries in `assessors` are pairwise distinct
/// * the subject never appears in `assessors`
/// * `finalized` transitions false→true exactly once; `verified` is set
///   only in that transition and never reverts
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct AssessmentRecord {
    pub competency_id: CompetencyId,
    pub subject: ParticipantId,
    /// Contributing assessors, in submission order.
    pub assessors: Vec<ParticipantId>,
    /// Scores positionally paired with `assessors`.
    pub scores: Vec<u32>,
    /// Floor-average of `scores`, recomputed on every contribution.
    pub mean_score: u32,
    /// Integer spread of `scores`, recomputed on every contribution.
    pub score_spread: u32,
    /// Verification outcome. False until finalize, thereafter fixed.
    pub verified: bool,
    /// Terminal-state flag: once set, the record accepts no mutation.
    pub finalized: bool,
    /// Ledger height at which the assessment was requested.
    pub opened_at: u64,
}

impl AssessmentRecord {
    /// Open a fresh record with empty sequences.
    pub fn open(competency_id: CompetencyId, subject: ParticipantId, opened_at: u64) -> Self {
        Self {
            competency_id,
            subject,
            assessors: Vec::new(),
            scores: Vec::new(),
            mean_score: 0,
            score_spread: 0,
            verified: false,
            finalized: false,
            opened_at,
        }
    }

    /// Number of contributions collected so far.
    pub fn assessor_count(&self) -> usize {
        self.assessors.len()
    }

    /// Whether the given participant has already contributed.
    pub fn has_assessor(&self, id: &ParticipantId) -> bool {
        self.assessors.contains(id)
    }

    /// Iterate the paired `(assessor, score)` contributions in submission
    /// order. The pairing is positional; iterating the tuples avoids
    /// index-alignment mistakes in the reputation sweep.
    pub fn opinions(&self) -> impl Iterator<Item = (&ParticipantId, u32)> {
        self.assessors.iter().zip(self.scores.iter().copied())
    }

    /// Append one contribution and recompute the derived statistics.
    ///
    /// `capacity` is the per-competency submission cap, already clamped to
    /// [`MAX_ASSESSORS`] by the caller.
    ///
    /// # Errors
    ///
    /// - [`EngineError::AlreadyFinalized`] if the record is terminal
    /// - [`EngineError::SelfAssessment`] if `assessor` is the subject
    /// - [`EngineError::ScoreOutOfRange`] for scores above [`MAX_SCORE`]
    /// - [`EngineError::DuplicateAssessor`] if `assessor` already scored
    /// - [`EngineError::CapacityExceeded`] once `capacity` is reached
    pub fn record_score(
        &mut self,
        assessor: ParticipantId,
        score: u32,
        capacity: usize,
    ) -> Result<(), EngineError> {
        if self.finalized {
            return Err(EngineError::AlreadyFinalized);
        }
        if assessor == self.subject {
            return Err(EngineError::SelfAssessment);
        }
        if score > MAX_SCORE {
            return Err(EngineError::ScoreOutOfRange(score));
        }
        if self.has_assessor(&assessor) {
            return Err(EngineError::DuplicateAssessor(assessor));
        }
        let capacity = capacity.min(MAX_ASSESSORS);
        if self.assessors.len() >= capacity {
            return Err(EngineError::CapacityExceeded { max: capacity });
        }

        self.assessors.push(assessor);
        self.scores.push(score);
        self.mean_score = stats::mean(&self.scores);
        self.score_spread = stats::dispersion(&self.scores, self.mean_score);

        debug_assert_eq!(self.assessors.len(), self.scores.len());
        Ok(())
    }

    /// Transition to the terminal state and fix the verification outcome.
    ///
    /// # Errors
    ///
    /// - [`EngineError::AlreadyFinalized`] on a second call
    /// - [`EngineError::InsufficientAssessors`] below [`MIN_ASSESSORS`]
    pub fn finalize(&mut self) -> Result<(), EngineError> {
        if self.finalized {
            return Err(EngineError::AlreadyFinalized);
        }
        if self.assessors.len() < MIN_ASSESSORS {
            return Err(EngineError::InsufficientAssessors {
                have: self.assessors.len(),
                need: MIN_ASSESSORS,
            });
        }
        self.verified = self.mean_score >= VERIFY_THRESHOLD;
        self.finalized = true;
        Ok(())
    }
}
