//! Error types for the Attest engine.
use thiserror::Error;

use crate::types::{CompetencyId, ParticipantId};

/// Failures of the persistence backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("backend: {0}")] Backend(String),
    #[error("corrupt value under key {0}")] Corrupt(String),
}

/// Caller-visible failures of engine operations.
///
/// Every variant is detected before any state mutation: an operation that
/// returns an error has committed nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("caller is not authorized")] NotAuthorized,
    #[error("participant already registered: {0}")] AlreadyRegistered(ParticipantId),
    #[error("participant not registered: {0}")] NotRegistered(ParticipantId),
    #[error("unknown competency id: {0}")] InvalidCompetency(CompetencyId),
    #[error("invalid input: {0}")] InvalidInput(String),
    #[error("assessment already requested for this competency and subject")] AlreadyRequested,
    #[error("no assessment for this competency and subject")] NoSuchAssessment,
    #[error("subjects may not assess themselves")] SelfAssessment,
    #[error("score out of range: {0}")] ScoreOutOfRange(u32),
    #[error("assessor has already scored this assessment: {0}")] DuplicateAssessor(ParticipantId),
    #[error("assessor capacity reached: {max}")] CapacityExceeded { max: usize },
    #[error("insufficient assessors: have {have}, need {need}")] InsufficientAssessors { have: usize, need: usize },
    #[error("assessment already finalized")] AlreadyFinalized,
    #[error("storage: {0}")] Storage(#[from] StoreError),
}

/// Top-level error for callers that mix engine and store access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttestError {
    #[error(transparent)] Engine(#[from] EngineError),
    #[error(transparent)] Store(#[from] StoreError),
}
