//! End-to-end lifecycle tests for Attest.
//!
//! Each test walks a complete flow — register, define a competency,
//! request, submit, finalize — and checks the verification decision,
//! the derived statistics, and the reputation feedback, on the in-memory
//! store and (for persistence) on RocksDB.

use attest_core::constants::{MIN_ASSESSORS, REPUTATION_REWARD};
use attest_core::error::EngineError;
use attest_core::store::StateStore;
use attest_core::types::ParticipantId;
use attest_engine::AssessmentEngine;
use attest_store::RocksStore;
use attest_tests::helpers::*;

// ======================================================================
// E2E 1: verified outcome
// Scores 80, 75, 90 -> mean 81 >= 70, all deviations under the band.
// ======================================================================

#[test]
fn e2e_verified_assessment_rewards_all() {
    let (engine, mut store) = seeded(3, 4);
    fill(&engine, &mut store, pid(1), &[(2, 80), (3, 75), (4, 90)]);

    let outcome = engine.finalize(&mut store, 0, &pid(1)).unwrap();
    assert!(outcome.verified, "mean 81 should verify");
    assert_eq!(outcome.mean_score, 81);
    assert_eq!(outcome.score_spread, 7);
    assert_eq!(outcome.rewarded, 3);
    assert_eq!(outcome.penalized, 0);

    let record = engine.get_record(&store, 0, &pid(1)).unwrap().unwrap();
    assert!(record.verified);
    assert!(record.finalized);

    for seed in [2u8, 3, 4] {
        assert_eq!(
            engine.get_reputation(&store, &pid(seed)).unwrap(),
            REPUTATION_REWARD
        );
        let skill = engine.get_skill_reputation(&store, &pid(seed), 0).unwrap();
        assert_eq!(skill.reputation, REPUTATION_REWARD);
        assert_eq!(skill.assessments_given, 1);
        assert_eq!(skill.valid_assessments_given, 1);
    }
}

// ======================================================================
// E2E 2: rejected outcome, agreement still rewarded
// Scores 10, 20, 30 -> mean 20 < 70, deviations 10, 0, 10 all under 15.
// ======================================================================

#[test]
fn e2e_rejected_assessment_still_rewards_agreement() {
    let (engine, mut store) = seeded(3, 4);
    fill(&engine, &mut store, pid(1), &[(2, 10), (3, 20), (4, 30)]);

    let outcome = engine.finalize(&mut store, 0, &pid(1)).unwrap();
    assert!(!outcome.verified, "mean 20 must not verify");
    assert_eq!(outcome.mean_score, 20);
    assert_eq!(outcome.rewarded, 3);
    assert_eq!(outcome.penalized, 0);

    // Reputation rewards agreement with the aggregate, not the outcome.
    for seed in [2u8, 3, 4] {
        assert_eq!(
            engine.get_reputation(&store, &pid(seed)).unwrap(),
            REPUTATION_REWARD
        );
    }
}

// ======================================================================
// E2E 3: mixed agreement
// ======================================================================

#[test]
fn e2e_outlier_penalized_while_majority_rewarded() {
    // Scores 80, 82, 84, 20: mean 66; deviations 14, 16, 18, 46.
    let (engine, mut store) = seeded(4, 5);
    fill(&engine, &mut store, pid(1), &[(2, 80), (3, 82), (4, 84), (5, 20)]);

    let outcome = engine.finalize(&mut store, 0, &pid(1)).unwrap();
    assert!(!outcome.verified);
    assert_eq!(outcome.mean_score, 66);
    assert_eq!(outcome.rewarded, 1);
    assert_eq!(outcome.penalized, 3);

    assert_eq!(engine.get_reputation(&store, &pid(2)).unwrap(), 2);
    for seed in [3u8, 4, 5] {
        assert_eq!(engine.get_reputation(&store, &pid(seed)).unwrap(), 0);
        let p = store.get_participant(&pid(seed)).unwrap().unwrap();
        assert_eq!(p.invalid_assessments_given, 1);
        assert_eq!(p.total_assessments_given, 1);
    }
}

// ======================================================================
// E2E 4: multiple competencies and subjects share assessor reputation
// ======================================================================

#[test]
fn e2e_reputation_accumulates_across_competencies() {
    let (engine, mut store) = seeded(3, 5);
    engine
        .create_competency(&mut store, &admin(), draft(3))
        .unwrap();

    // Competency 0: subject 1. Competency 1: subject 5.
    fill(&engine, &mut store, pid(1), &[(2, 70), (3, 72), (4, 74)]);
    engine.finalize(&mut store, 0, &pid(1)).unwrap();

    engine.request_assessment(&mut store, 1, pid(5), 2).unwrap();
    for seed in [2u8, 3, 4] {
        engine
            .submit_score(&mut store, 1, &pid(5), pid(seed), 90)
            .unwrap();
    }
    engine.finalize(&mut store, 1, &pid(5)).unwrap();

    for seed in [2u8, 3, 4] {
        // Two rewards globally, one per competency.
        assert_eq!(engine.get_reputation(&store, &pid(seed)).unwrap(), 4);
        assert_eq!(
            engine.get_skill_reputation(&store, &pid(seed), 0).unwrap().reputation,
            2
        );
        assert_eq!(
            engine.get_skill_reputation(&store, &pid(seed), 1).unwrap().reputation,
            2
        );
    }
}

// ======================================================================
// E2E 5: full capacity run at the hard bound
// ======================================================================

#[test]
fn e2e_twenty_assessors_fill_and_finalize() {
    let (engine, mut store) = seeded(20, 25);
    engine.request_assessment(&mut store, 0, pid(25), 1).unwrap();

    for seed in 1..=20u8 {
        engine
            .submit_score(&mut store, 0, &pid(25), pid(seed), 60 + seed as u32)
            .unwrap();
    }
    // 21st submission hits the bound.
    assert_eq!(
        engine.submit_score(&mut store, 0, &pid(25), pid(21), 80),
        Err(EngineError::CapacityExceeded { max: 20 })
    );

    let record = engine.get_record(&store, 0, &pid(25)).unwrap().unwrap();
    assert_eq!(record.assessor_count(), 20);
    assert_eq!(record.scores.len(), 20);

    let outcome = engine.finalize(&mut store, 0, &pid(25)).unwrap();
    // Scores 61..=80: mean 70, at the verification threshold.
    assert_eq!(outcome.mean_score, 70);
    assert!(outcome.verified);
    assert_eq!(outcome.rewarded + outcome.penalized, 20);
}

// ======================================================================
// E2E 6: persistence — the whole lifecycle on RocksDB, surviving reopen
// ======================================================================

#[test]
fn e2e_rocksdb_lifecycle_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let engine = AssessmentEngine::new(admin());

    {
        let mut store = RocksStore::open(dir.path()).unwrap();
        store.set_admin(&admin()).unwrap();
        engine.register_participant(&mut store, admin(), 0).unwrap();
        engine
            .create_competency(&mut store, &admin(), draft(3))
            .unwrap();
        for seed in 1..=4u8 {
            let height = store.advance_height().unwrap();
            engine
                .register_participant(&mut store, pid(seed), height)
                .unwrap();
        }
        let height = store.advance_height().unwrap();
        engine
            .request_assessment(&mut store, 0, pid(1), height)
            .unwrap();
        for (seed, score) in [(2u8, 80), (3, 75), (4, 90)] {
            engine
                .submit_score(&mut store, 0, &pid(1), pid(seed), score)
                .unwrap();
        }
        store.flush().unwrap();
    }

    // Reopen: the open record is intact and finalize works on the new handle.
    let mut store = RocksStore::open(dir.path()).unwrap();
    assert_eq!(store.admin().unwrap(), Some(admin()));
    assert_eq!(store.height().unwrap(), 5);

    let record = engine.get_record(&store, 0, &pid(1)).unwrap().unwrap();
    assert_eq!(record.assessor_count(), 3);
    assert_eq!(record.mean_score, 81);
    assert!(!record.finalized);

    let outcome = engine.finalize(&mut store, 0, &pid(1)).unwrap();
    assert!(outcome.verified);

    // And the finalized state persists too.
    drop(store);
    let store = RocksStore::open(dir.path()).unwrap();
    let record = engine.get_record(&store, 0, &pid(1)).unwrap().unwrap();
    assert!(record.finalized);
    assert!(record.verified);
    assert_eq!(engine.get_reputation(&store, &pid(2)).unwrap(), 2);
}

// ======================================================================
// E2E 7: minimum viable finalize
// ======================================================================

#[test]
fn e2e_finalize_at_exact_minimum() {
    let (engine, mut store) = seeded(10, 4);
    fill(&engine, &mut store, pid(1), &[(2, 70), (3, 70), (4, 70)]);

    assert_eq!(
        engine.assessor_count(&store, 0, &pid(1)).unwrap(),
        MIN_ASSESSORS
    );
    let outcome = engine.finalize(&mut store, 0, &pid(1)).unwrap();
    assert!(outcome.verified);
    assert_eq!(outcome.score_spread, 0);
}

// ======================================================================
// E2E 8: read accessors are stable between mutations
// ======================================================================

#[test]
fn e2e_get_record_idempotent() {
    let (engine, mut store) = seeded(3, 3);
    fill(&engine, &mut store, pid(1), &[(2, 55), (3, 65)]);

    let first = engine.get_record(&store, 0, &pid(1)).unwrap().unwrap();
    let second = engine.get_record(&store, 0, &pid(1)).unwrap().unwrap();
    assert_eq!(first, second);

    // A mutation changes the observed record; reads settle again after.
    engine.submit_score(&mut store, 0, &pid(1), admin(), 60).unwrap();
    let third = engine.get_record(&store, 0, &pid(1)).unwrap().unwrap();
    assert_ne!(first, third);
    assert_eq!(third, engine.get_record(&store, 0, &pid(1)).unwrap().unwrap());
}

// ======================================================================
// E2E 9: separate subjects do not interfere
// ======================================================================

#[test]
fn e2e_records_are_isolated_per_subject() {
    let (engine, mut store) = seeded(3, 6);
    fill(&engine, &mut store, pid(1), &[(3, 90), (4, 92), (5, 88)]);
    fill(&engine, &mut store, pid(2), &[(3, 10), (4, 12), (5, 14)]);

    let first = engine.finalize(&mut store, 0, &pid(1)).unwrap();
    let second = engine.finalize(&mut store, 0, &pid(2)).unwrap();
    assert!(first.verified);
    assert!(!second.verified);

    // Shared assessors were swept once per finalize.
    for seed in [3u8, 4, 5] {
        let p = store.get_participant(&pid(seed)).unwrap().unwrap();
        assert_eq!(p.total_assessments_given, 2);
        assert_eq!(p.reputation, 4);
    }
}

#[test]
fn e2e_unknown_subject_record_is_absent() {
    let (engine, store) = seeded(3, 2);
    let missing: Option<_> = engine
        .get_record(&store, 0, &ParticipantId([0xEE; 32]))
        .unwrap();
    assert!(missing.is_none());
}
