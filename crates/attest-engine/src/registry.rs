//! Participant registration.

use tracing::info;

use attest_core::error::EngineError;
use attest_core::store::{StateBatch, StateStore};
use attest_core::types::{Participant, ParticipantId};

/// Register a new participant at the given ledger height.
///
/// Registration is self-service: the caller registers their own identity.
/// Participants start with zero reputation and are never destroyed.
///
/// # Errors
///
/// - [`EngineError::AlreadyRegistered`] if the identity is already known
pub fn register<S: StateStore>(
    store: &mut S,
    caller: ParticipantId,
    height: u64,
) -> Result<Participant, EngineError> {
    if store.is_registered(&caller)? {
        return Err(EngineError::AlreadyRegistered(caller));
    }

    let participant = Participant::new(caller, height);
    let mut batch = StateBatch::new();
    batch.put_participant(participant.clone());
    store.apply(batch)?;

    info!(id = %caller, height, "participant registered");
    Ok(participant)
}
