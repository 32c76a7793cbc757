//! Reputation ledger updates.
//!
//! Pure integer mutation of the two reputation counters a contribution
//! touches: the participant's aggregate counter and their skill-specific
//! counter. Applied unconditionally during the finalize sweep — only
//! already-registered assessors can appear in a record, so there is no
//! failure path.

use attest_core::constants::{REPUTATION_PENALTY, REPUTATION_REWARD};
use attest_core::types::{Participant, SkillReputation};

/// Apply one contribution's reputation feedback.
///
/// `valid` means the assessor's score deviated from the final mean by
/// less than the agreement band. Valid contributions earn
/// [`REPUTATION_REWARD`] on both counters; invalid ones lose
/// [`REPUTATION_PENALTY`], floored at zero. Lifetime counters are
/// incremented either way.
///
/// # Examples
///
/// ```
/// use attest_core::types::{Participant, ParticipantId, SkillReputation};
/// use attest_engine::reputation::apply_feedback;
///
/// let id = ParticipantId([7; 32]);
/// let mut p = Participant::new(id, 0);
/// let mut s = SkillReputation::new(id, 0);
///
/// apply_feedback(&mut p, &mut s, true);
/// assert_eq!(p.reputation, 2);
/// assert_eq!(s.reputation, 2);
///
/// apply_feedback(&mut p, &mut s, false);
/// assert_eq!(p.reputation, 0); // floored, not negative
/// assert_eq!(p.total_assessments_given, 2);
/// ```
pub fn apply_feedback(participant: &mut Participant, skill: &mut SkillReputation, valid: bool) {
    if valid {
        participant.reputation += REPUTATION_REWARD;
        skill.reputation += REPUTATION_REWARD;
        skill.valid_assessments_given += 1;
    } else {
        participant.reputation = participant.reputation.saturating_sub(REPUTATION_PENALTY);
        skill.reputation = skill.reputation.saturating_sub(REPUTATION_PENALTY);
        participant.invalid_assessments_given += 1;
    }
    participant.total_assessments_given += 1;
    skill.assessments_given += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_core::types::ParticipantId;

    fn fresh() -> (Participant, SkillReputation) {
        let id = ParticipantId([1; 32]);
        (Participant::new(id, 0), SkillReputation::new(id, 0))
    }

    #[test]
    fn valid_contribution_rewards_both_counters() {
        let (mut p, mut s) = fresh();
        apply_feedback(&mut p, &mut s, true);
        assert_eq!(p.reputation, REPUTATION_REWARD);
        assert_eq!(s.reputation, REPUTATION_REWARD);
        assert_eq!(p.total_assessments_given, 1);
        assert_eq!(p.invalid_assessments_given, 0);
        assert_eq!(s.assessments_given, 1);
        assert_eq!(s.valid_assessments_given, 1);
    }

    #[test]
    fn invalid_contribution_penalizes_and_floors_at_zero() {
        let (mut p, mut s) = fresh();
        apply_feedback(&mut p, &mut s, false);
        assert_eq!(p.reputation, 0);
        assert_eq!(s.reputation, 0);
        assert_eq!(p.invalid_assessments_given, 1);
        assert_eq!(s.valid_assessments_given, 0);
    }

    #[test]
    fn penalty_subtracts_from_accumulated_reputation() {
        let (mut p, mut s) = fresh();
        for _ in 0..4 {
            apply_feedback(&mut p, &mut s, true);
        }
        assert_eq!(p.reputation, 8);
        apply_feedback(&mut p, &mut s, false);
        assert_eq!(p.reputation, 3);
        assert_eq!(s.reputation, 3);
        assert_eq!(p.total_assessments_given, 5);
    }

    #[test]
    fn counters_never_desync() {
        let (mut p, mut s) = fresh();
        let outcomes = [true, false, false, true, false, true];
        for valid in outcomes {
            apply_feedback(&mut p, &mut s, valid);
        }
        assert_eq!(p.total_assessments_given, s.assessments_given);
        assert_eq!(
            p.total_assessments_given,
            s.valid_assessments_given + p.invalid_assessments_given
        );
        // Global and skill counters move in lockstep for a single-skill life.
        assert_eq!(p.reputation, s.reputation);
    }
}
