//! Shared test helpers for E2E and adversarial tests.

use attest_core::store::{MemoryStore, StateStore};
use attest_core::types::ParticipantId;
use attest_engine::AssessmentEngine;
use attest_engine::catalog::CompetencyDraft;

/// Simple participant identity from a seed byte.
pub fn pid(seed: u8) -> ParticipantId {
    ParticipantId([seed; 32])
}

/// The administrator identity used throughout the suite.
pub fn admin() -> ParticipantId {
    pid(0)
}

/// A valid competency draft with the given contribution target.
pub fn draft(required: u32) -> CompetencyDraft {
    CompetencyDraft {
        name: "tig welding".into(),
        description: "manual TIG welding on thin-wall stainless".into(),
        category: "fabrication".into(),
        required_assessors: required,
    }
}

/// Engine plus a store seeded with the admin, one competency (id 0,
/// `required` assessors), and participants `1..=participants` registered
/// at height 0.
pub fn seeded(required: u32, participants: u8) -> (AssessmentEngine, MemoryStore) {
    let engine = AssessmentEngine::new(admin());
    let mut store = MemoryStore::new();
    engine
        .register_participant(&mut store, admin(), 0)
        .expect("admin registers");
    engine
        .create_competency(&mut store, &admin(), draft(required))
        .expect("competency 0");
    for seed in 1..=participants {
        engine
            .register_participant(&mut store, pid(seed), 0)
            .expect("participant registers");
    }
    (engine, store)
}

/// Run a full assessment: request for `subject`, one submission per
/// `(assessor, score)` pair, in order.
pub fn fill<S: StateStore>(
    engine: &AssessmentEngine,
    store: &mut S,
    subject: ParticipantId,
    opinions: &[(u8, u32)],
) {
    engine
        .request_assessment(store, 0, subject, 1)
        .expect("request");
    for &(seed, score) in opinions {
        engine
            .submit_score(store, 0, &subject, pid(seed), score)
            .expect("submit");
    }
}
