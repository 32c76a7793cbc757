//! Engine constants. Scores are dimensionless integers in the range `0–100`.
//!
//! These are fixed protocol configuration, not mutable state: every
//! deployment runs with the same thresholds.

/// Highest score an assessor may submit.
pub const MAX_SCORE: u32 = 100;

/// Minimum number of assessors before an assessment may be finalized.
pub const MIN_ASSESSORS: usize = 3;

/// Hard upper bound on assessors per assessment record.
///
/// The per-competency `required_assessors` target may be lower, never
/// higher. All aggregate statistics run over at most this many entries.
pub const MAX_ASSESSORS: usize = 20;

/// Mean score at or above which an assessment verifies.
///
/// # Examples
///
/// ```
/// use attest_core::constants::VERIFY_THRESHOLD;
/// assert!(81 >= VERIFY_THRESHOLD);
/// assert!(69 < VERIFY_THRESHOLD);
/// ```
pub const VERIFY_THRESHOLD: u32 = 70;

/// An assessor's score must deviate from the final mean by strictly less
/// than this to count as a valid (agreeing) contribution.
pub const AGREEMENT_BAND: u32 = 15;

/// Reputation credit for an agreeing contribution.
pub const REPUTATION_REWARD: u64 = 2;

/// Reputation debit for a disagreeing contribution, floored at zero.
pub const REPUTATION_PENALTY: u64 = 5;

/// Maximum length of a competency name in bytes.
pub const MAX_NAME_LEN: usize = 64;

/// Maximum length of a competency description in bytes.
pub const MAX_DESCRIPTION_LEN: usize = 256;

/// Maximum length of a competency category in bytes.
pub const MAX_CATEGORY_LEN: usize = 64;
