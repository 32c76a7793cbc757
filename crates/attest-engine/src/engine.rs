//! Assessment lifecycle orchestration.
//!
//! [`AssessmentEngine`] is a stateless coordinator over a
//! [`StateStore`]. Every operation validates all preconditions against a
//! fresh read of the store, then commits its whole effect as one atomic
//! [`StateBatch`] — a failed call leaves nothing behind.
//!
//! Caller identity and ledger height come from the host substrate and are
//! passed in per call; the engine keeps only the fixed administrator
//! identity as configuration.

use serde::Serialize;
use tracing::{debug, info};

use attest_core::constants::{AGREEMENT_BAND, MAX_ASSESSORS};
use attest_core::error::{EngineError, StoreError};
use attest_core::stats;
use attest_core::store::{StateBatch, StateStore};
use attest_core::types::{
    AssessmentRecord, Competency, CompetencyId, ParticipantId, SkillReputation,
};

use crate::catalog::{self, CompetencyDraft};
use crate::registry;
use crate::reputation;

/// Summary of a finalize decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalizeOutcome {
    /// Whether the subject's claimed competency verified.
    pub verified: bool,
    /// Final mean over all collected scores.
    pub mean_score: u32,
    /// Final spread over all collected scores.
    pub score_spread: u32,
    /// Assessors whose score agreed with the mean (each rewarded).
    pub rewarded: usize,
    /// Assessors whose score disagreed (each penalized).
    pub penalized: usize,
}

/// The peer-verification engine.
///
/// Generic over the store so tests run on [`MemoryStore`] and production
/// on RocksDB (attest-store).
///
/// [`MemoryStore`]: attest_core::store::MemoryStore
#[derive(Debug, Clone)]
pub struct AssessmentEngine {
    admin: ParticipantId,
}

impl AssessmentEngine {
    /// Create an engine with the given catalog administrator.
    pub fn new(admin: ParticipantId) -> Self {
        Self { admin }
    }

    /// The catalog administrator identity.
    pub fn admin(&self) -> &ParticipantId {
        &self.admin
    }

    /// Register the calling identity as a participant.
    ///
    /// See [`registry::register`].
    pub fn register_participant<S: StateStore>(
        &self,
        store: &mut S,
        caller: ParticipantId,
        height: u64,
    ) -> Result<(), EngineError> {
        registry::register(store, caller, height).map(|_| ())
    }

    /// Create a competency. Administrator only.
    ///
    /// See [`catalog::create_competency`].
    pub fn create_competency<S: StateStore>(
        &self,
        store: &mut S,
        caller: &ParticipantId,
        draft: CompetencyDraft,
    ) -> Result<Competency, EngineError> {
        catalog::create_competency(store, caller, &self.admin, draft)
    }

    /// Open an assessment of `subject` for `competency_id`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidCompetency`] for an unknown competency id
    /// - [`EngineError::NotRegistered`] if the subject is unknown
    /// - [`EngineError::AlreadyRequested`] if a record already exists for
    ///   this `(competency, subject)` pair
    pub fn request_assessment<S: StateStore>(
        &self,
        store: &mut S,
        competency_id: CompetencyId,
        subject: ParticipantId,
        height: u64,
    ) -> Result<(), EngineError> {
        if store.get_competency(competency_id)?.is_none() {
            return Err(EngineError::InvalidCompetency(competency_id));
        }
        if !store.is_registered(&subject)? {
            return Err(EngineError::NotRegistered(subject));
        }
        if store.get_record(competency_id, &subject)?.is_some() {
            return Err(EngineError::AlreadyRequested);
        }

        let mut batch = StateBatch::new();
        batch.put_record(AssessmentRecord::open(competency_id, subject, height));
        store.apply(batch)?;

        info!(competency_id, subject = %subject, height, "assessment requested");
        Ok(())
    }

    /// Record one assessor's score for an open assessment.
    ///
    /// The submission cap is the competency's `required_assessors` target,
    /// clamped to the hard bound of [`MAX_ASSESSORS`].
    ///
    /// # Errors
    ///
    /// - [`EngineError::NoSuchAssessment`] if no record was opened
    /// - [`EngineError::NotRegistered`] if the assessor is unknown
    /// - plus every record-level failure of
    ///   [`AssessmentRecord::record_score`]
    pub fn submit_score<S: StateStore>(
        &self,
        store: &mut S,
        competency_id: CompetencyId,
        subject: &ParticipantId,
        assessor: ParticipantId,
        score: u32,
    ) -> Result<(), EngineError> {
        let competency = store
            .get_competency(competency_id)?
            .ok_or(EngineError::InvalidCompetency(competency_id))?;
        let mut record = store
            .get_record(competency_id, subject)?
            .ok_or(EngineError::NoSuchAssessment)?;
        if !store.is_registered(&assessor)? {
            return Err(EngineError::NotRegistered(assessor));
        }

        let capacity = (competency.required_assessors as usize).min(MAX_ASSESSORS);
        record.record_score(assessor, score, capacity)?;

        debug!(
            competency_id,
            subject = %subject,
            assessor = %assessor,
            score,
            count = record.assessor_count(),
            mean = record.mean_score,
            "score submitted"
        );

        let mut batch = StateBatch::new();
        batch.put_record(record);
        store.apply(batch)?;
        Ok(())
    }

    /// Finalize an assessment: fix the verification outcome and apply the
    /// reputation sweep.
    ///
    /// Phase 1 sets `verified = (mean_score >= VERIFY_THRESHOLD)` and
    /// marks the record terminal. Phase 2 walks the paired
    /// `(assessor, score)` contributions in submission order and applies
    /// [`reputation::apply_feedback`] for each, classifying a contribution
    /// as valid when its deviation from the final mean is strictly under
    /// [`AGREEMENT_BAND`]. Both phases commit in a single batch.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidCompetency`] for an unknown competency id
    /// - [`EngineError::NoSuchAssessment`] if no record was opened
    /// - [`EngineError::AlreadyFinalized`] on repeat calls — the sweep is
    ///   applied exactly once
    /// - [`EngineError::InsufficientAssessors`] below the finalize floor
    pub fn finalize<S: StateStore>(
        &self,
        store: &mut S,
        competency_id: CompetencyId,
        subject: &ParticipantId,
    ) -> Result<FinalizeOutcome, EngineError> {
        if store.get_competency(competency_id)?.is_none() {
            return Err(EngineError::InvalidCompetency(competency_id));
        }
        let mut record = store
            .get_record(competency_id, subject)?
            .ok_or(EngineError::NoSuchAssessment)?;

        record.finalize()?;

        let mut batch = StateBatch::new();
        let mut rewarded = 0usize;
        let mut penalized = 0usize;

        // Assessors are pairwise distinct, so each participant is read and
        // written exactly once in this sweep.
        for (assessor, score) in record.opinions() {
            let valid = stats::deviation(score, record.mean_score) < AGREEMENT_BAND;

            let mut participant = store.get_participant(assessor)?.ok_or_else(|| {
                StoreError::Corrupt(format!("recorded assessor {assessor} has no participant"))
            })?;
            let mut skill = store
                .get_skill_reputation(assessor, competency_id)?
                .unwrap_or_else(|| SkillReputation::new(*assessor, competency_id));

            reputation::apply_feedback(&mut participant, &mut skill, valid);
            if valid {
                rewarded += 1;
            } else {
                penalized += 1;
            }

            batch.put_participant(participant);
            batch.put_skill_reputation(skill);
        }

        let outcome = FinalizeOutcome {
            verified: record.verified,
            mean_score: record.mean_score,
            score_spread: record.score_spread,
            rewarded,
            penalized,
        };

        batch.put_record(record);
        store.apply(batch)?;

        info!(
            competency_id,
            subject = %subject,
            verified = outcome.verified,
            mean = outcome.mean_score,
            spread = outcome.score_spread,
            rewarded,
            penalized,
            "assessment finalized"
        );
        Ok(outcome)
    }

    // --- Read accessors ---

    /// The assessment record for `(competency, subject)`, if any.
    pub fn get_record<S: StateStore>(
        &self,
        store: &S,
        competency_id: CompetencyId,
        subject: &ParticipantId,
    ) -> Result<Option<AssessmentRecord>, EngineError> {
        Ok(store.get_record(competency_id, subject)?)
    }

    /// A participant's aggregate reputation counter.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NotRegistered`] for unknown identities
    pub fn get_reputation<S: StateStore>(
        &self,
        store: &S,
        id: &ParticipantId,
    ) -> Result<u64, EngineError> {
        store
            .get_participant(id)?
            .map(|p| p.reputation)
            .ok_or(EngineError::NotRegistered(*id))
    }

    /// Skill-specific reputation counters for `(participant, competency)`.
    ///
    /// Absent counters read as all-zero, matching their lazy creation on
    /// first contribution.
    pub fn get_skill_reputation<S: StateStore>(
        &self,
        store: &S,
        id: &ParticipantId,
        competency_id: CompetencyId,
    ) -> Result<SkillReputation, EngineError> {
        Ok(store
            .get_skill_reputation(id, competency_id)?
            .unwrap_or_else(|| SkillReputation::new(*id, competency_id)))
    }

    /// Number of contributions collected for `(competency, subject)`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NoSuchAssessment`] if no record was opened
    pub fn assessor_count<S: StateStore>(
        &self,
        store: &S,
        competency_id: CompetencyId,
        subject: &ParticipantId,
    ) -> Result<usize, EngineError> {
        store
            .get_record(competency_id, subject)?
            .map(|r| r.assessor_count())
            .ok_or(EngineError::NoSuchAssessment)
    }
}
