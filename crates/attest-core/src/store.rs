//! State store contract and in-memory implementation.
//!
//! Provides the [`StateStore`] trait the engine runs against and the
//! [`MemoryStore`] used in tests. The production deployment uses RocksDB
//! (attest-store).
//!
//! Mutations go through [`StateStore::apply`] as one [`StateBatch`]:
//! either every write in the batch commits or none does. The engine
//! validates all preconditions before building a batch, so a failed call
//! leaves no partial state behind.

use std::collections::HashMap;

use crate::error::StoreError;
use crate::types::{
    AssessmentRecord, Competency, CompetencyId, Participant, ParticipantId, SkillReputation,
};

/// One typed write against the state space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Participant(Participant),
    Competency(Competency),
    Record(AssessmentRecord),
    SkillReputation(SkillReputation),
}

/// An ordered batch of writes, committed atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateBatch(pub Vec<WriteOp>);

impl StateBatch {
    /// An empty batch.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn put_participant(&mut self, p: Participant) {
        self.0.push(WriteOp::Participant(p));
    }

    pub fn put_competency(&mut self, c: Competency) {
        self.0.push(WriteOp::Competency(c));
    }

    pub fn put_record(&mut self, r: AssessmentRecord) {
        self.0.push(WriteOp::Record(r));
    }

    pub fn put_skill_reputation(&mut self, s: SkillReputation) {
        self.0.push(WriteOp::SkillReputation(s));
    }

    /// Number of writes in the batch.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the batch contains no writes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Keyed state storage for the engine.
///
/// Key spaces: participants by identity, competencies by dense id,
/// assessment records by `(competency id, subject)`, skill reputations by
/// `(participant, competency id)`.
///
/// Implementations must guarantee read-your-writes within one call and
/// serializability across calls; the engine relies on both and takes no
/// locks of its own.
pub trait StateStore: Send + Sync {
    /// Look up a participant. Returns `None` for unknown identities.
    fn get_participant(&self, id: &ParticipantId) -> Result<Option<Participant>, StoreError>;

    /// Whether the identity has registered.
    ///
    /// Default implementation delegates to [`get_participant`](Self::get_participant).
    fn is_registered(&self, id: &ParticipantId) -> Result<bool, StoreError> {
        Ok(self.get_participant(id)?.is_some())
    }

    /// Look up a competency by id. Returns `None` for ids never allocated.
    fn get_competency(&self, id: CompetencyId) -> Result<Option<Competency>, StoreError>;

    /// Number of competencies created so far.
    ///
    /// Ids are dense and zero-based, so this doubles as the allocator:
    /// the next competency gets `competency_count()` as its id.
    fn competency_count(&self) -> Result<u64, StoreError>;

    /// Look up the assessment record for `(competency, subject)`.
    fn get_record(
        &self,
        competency_id: CompetencyId,
        subject: &ParticipantId,
    ) -> Result<Option<AssessmentRecord>, StoreError>;

    /// Look up skill-specific reputation for `(participant, competency)`.
    fn get_skill_reputation(
        &self,
        participant: &ParticipantId,
        competency_id: CompetencyId,
    ) -> Result<Option<SkillReputation>, StoreError>;

    /// Commit a batch of writes atomically, in order.
    fn apply(&mut self, batch: StateBatch) -> Result<(), StoreError>;
}

/// In-memory state store for tests.
///
/// `HashMap`s with no persistence. Not suitable for production use.
#[derive(Debug, Default)]
pub struct MemoryStore {
    participants: HashMap<ParticipantId, Participant>,
    competencies: HashMap<CompetencyId, Competency>,
    records: HashMap<(CompetencyId, ParticipantId), AssessmentRecord>,
    skill_reputations: HashMap<(ParticipantId, CompetencyId), SkillReputation>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered participants.
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Number of assessment records ever opened.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

impl StateStore for MemoryStore {
    fn get_participant(&self, id: &ParticipantId) -> Result<Option<Participant>, StoreError> {
        Ok(self.participants.get(id).cloned())
    }

    fn get_competency(&self, id: CompetencyId) -> Result<Option<Competency>, StoreError> {
        Ok(self.competencies.get(&id).cloned())
    }

    fn competency_count(&self) -> Result<u64, StoreError> {
        Ok(self.competencies.len() as u64)
    }

    fn get_record(
        &self,
        competency_id: CompetencyId,
        subject: &ParticipantId,
    ) -> Result<Option<AssessmentRecord>, StoreError> {
        Ok(self.records.get(&(competency_id, *subject)).cloned())
    }

    fn get_skill_reputation(
        &self,
        participant: &ParticipantId,
        competency_id: CompetencyId,
    ) -> Result<Option<SkillReputation>, StoreError> {
        Ok(self
            .skill_reputations
            .get(&(*participant, competency_id))
            .cloned())
    }

    fn apply(&mut self, batch: StateBatch) -> Result<(), StoreError> {
        // HashMap inserts cannot fail, so the whole batch always lands.
        for op in batch.0 {
            match op {
                WriteOp::Participant(p) => {
                    self.participants.insert(p.id, p);
                }
                WriteOp::Competency(c) => {
                    self.competencies.insert(c.id, c);
                }
                WriteOp::Record(r) => {
                    self.records.insert((r.competency_id, r.subject), r);
                }
                WriteOp::SkillReputation(s) => {
                    self.skill_reputations
                        .insert((s.participant, s.competency_id), s);
                }
            }
        }
        Ok(())
    }
}
