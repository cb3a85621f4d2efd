//! Pending-state vault: issuance and single-use validation of round-tripped tokens.

// self
use crate::{
	_prelude::*,
	auth::{FlowIdentity, StateError, StateRecord, StateToken},
	store::EphemeralStore,
};

/// Issues and validates the anti-forgery state binding one identity to one in-flight
/// authorization attempt.
///
/// The vault is a thin view over the shared store; cloning it is cheap and every
/// clone observes the same pending attempts.
#[derive(Clone)]
pub struct StateVault {
	store: Arc<dyn EphemeralStore>,
	ttl: Duration,
}
impl StateVault {
	/// Creates a vault over the shared store with the given pending-state lifetime.
	pub fn new(store: Arc<dyn EphemeralStore>, ttl: Duration) -> Self {
		Self { store, ttl }
	}

	/// Opens a pending attempt for the identity and returns its state token.
	///
	/// Any prior pending attempt for the same identity is overwritten; the earlier
	/// popup can no longer complete (last-writer-wins).
	pub async fn issue(&self, identity: FlowIdentity) -> Result<StateToken> {
		let token = StateToken::generate(identity);

		self.store.put_state(StateRecord::new(&token, self.ttl)).await?;

		Ok(token)
	}

	/// Consumes the pending attempt matching `presented`, exactly once.
	///
	/// The stored record is removed before comparison, so replaying a state value
	/// after a successful validation observes [`StateError::NotFound`], and two racing
	/// callbacks with the same state cannot both pass. A mismatched presentation also
	/// burns the pending attempt; a fraud signal ends the flow either way.
	pub async fn validate(&self, identity: &FlowIdentity, presented: &StateToken) -> Result<()> {
		let record = self.store.take_state(identity).await?.ok_or(StateError::NotFound)?;

		if !record.matches(presented) {
			return Err(StateError::Mismatch.into());
		}

		Ok(())
	}
}
impl Debug for StateVault {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StateVault").field("ttl", &self.ttl).finish()
	}
}
