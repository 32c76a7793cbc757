//! # attest-engine — Peer-verification engine.
//!
//! Orchestrates the assessment lifecycle over a [`StateStore`]:
//!
//! - **Registry**: participants register once and are never destroyed.
//! - **Catalog**: a single privileged administrator defines competencies
//!   with dense, monotonically allocated ids.
//! - **Assessments**: a subject requests evaluation, independent assessors
//!   each contribute one score, and `finalize` turns the accumulated
//!   statistics into a verification decision.
//! - **Reputation**: at finalize time every assessor is rewarded or
//!   penalized by how closely their score agreed with the aggregate mean.
//!
//! The engine is a stateless coordinator: caller identity and ledger
//! height are supplied per call, every operation reads current state,
//! validates all preconditions, and commits one atomic write batch.
//!
//! [`StateStore`]: attest_core::store::StateStore

pub mod catalog;
pub mod engine;
pub mod registry;
pub mod reputation;

pub use engine::{AssessmentEngine, FinalizeOutcome};
