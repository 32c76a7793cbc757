//! Competency catalog.
//!
//! Competencies are created once by the privileged administrator and are
//! immutable thereafter — there is no update or delete path. Ids are
//! dense, zero-based, and allocated monotonically: the next id is always
//! the current catalog size.

use tracing::info;

use attest_core::constants::{
    MAX_ASSESSORS, MAX_CATEGORY_LEN, MAX_DESCRIPTION_LEN, MAX_NAME_LEN,
};
use attest_core::error::EngineError;
use attest_core::store::{StateBatch, StateStore};
use attest_core::types::{Competency, ParticipantId};

/// Caller-supplied fields for a new competency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetencyDraft {
    pub name: String,
    pub description: String,
    pub category: String,
    /// Contribution target, in `1..=MAX_ASSESSORS`.
    pub required_assessors: u32,
}

fn check_text(field: &'static str, value: &str, max: usize) -> Result<(), EngineError> {
    if value.is_empty() {
        return Err(EngineError::InvalidInput(format!("{field} must not be empty")));
    }
    if value.len() > max {
        return Err(EngineError::InvalidInput(format!(
            "{field} exceeds {max} bytes"
        )));
    }
    Ok(())
}

/// Create a new competency.
///
/// Only `admin` may create catalog entries. The allocated id is returned
/// inside the stored [`Competency`].
///
/// # Errors
///
/// - [`EngineError::NotAuthorized`] if `caller` is not the administrator
/// - [`EngineError::InvalidInput`] for empty/oversized text fields or a
///   `required_assessors` outside `1..=MAX_ASSESSORS`
pub fn create_competency<S: StateStore>(
    store: &mut S,
    caller: &ParticipantId,
    admin: &ParticipantId,
    draft: CompetencyDraft,
) -> Result<Competency, EngineError> {
    if caller != admin {
        return Err(EngineError::NotAuthorized);
    }
    check_text("name", &draft.name, MAX_NAME_LEN)?;
    check_text("description", &draft.description, MAX_DESCRIPTION_LEN)?;
    check_text("category", &draft.category, MAX_CATEGORY_LEN)?;
    if draft.required_assessors == 0 || draft.required_assessors as usize > MAX_ASSESSORS {
        return Err(EngineError::InvalidInput(format!(
            "required_assessors must be in 1..={MAX_ASSESSORS}, got {}",
            draft.required_assessors
        )));
    }

    let id = store.competency_count()?;
    let competency = Competency {
        id,
        name: draft.name,
        description: draft.description,
        category: draft.category,
        required_assessors: draft.required_assessors,
    };

    let mut batch = StateBatch::new();
    batch.put_competency(competency.clone());
    store.apply(batch)?;

    info!(id, name = %competency.name, "competency created");
    Ok(competency)
}
