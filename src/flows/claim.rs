//! One-shot credential claim plus the awaitable completion watch.

// self
use crate::{
	_prelude::*,
	auth::{CredentialPayload, FlowIdentity},
	flows::Connector,
	http::TokenHttpClient,
	notify::CompletionWatch,
	oauth::TransportErrorMapper,
	obs::{self, LinkOutcome, LinkSpan, LinkStage},
};

impl<C, M> Connector<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// One-shot claim of the stored credential for an identity.
	///
	/// `None` is the normal not-finished answer for a polling caller: the flow has
	/// not completed yet, the credential was already claimed, or its window lapsed.
	/// The claim deletes the entry, so a second call after a successful one always
	/// observes `None`.
	pub async fn claim_credentials(
		&self,
		identity: &FlowIdentity,
	) -> Result<Option<CredentialPayload>> {
		const STAGE: LinkStage = LinkStage::Claim;

		let span = LinkSpan::new(STAGE, "claim_credentials");

		obs::record_link_outcome(STAGE, LinkOutcome::Attempt);

		let result = span
			.instrument(async move {
				let Some(record) = self.store.take_credential(identity).await? else {
					return Ok(None);
				};

				self.completions().clear(identity);

				Ok(Some(record.payload))
			})
			.await;

		// An empty claim is a normal polling answer, not a failure.
		obs::record_link_outcome(
			STAGE,
			if result.is_ok() { LinkOutcome::Success } else { LinkOutcome::Failure },
		);

		result
	}

	/// Watch handle resolving once a callback lands for the identity.
	///
	/// Lets callers await completion instead of polling on a fixed interval; the
	/// credential itself is still claimed through [`Connector::claim_credentials`].
	pub fn completion_watch(&self, identity: &FlowIdentity) -> CompletionWatch {
		self.completions().watch(identity)
	}
}
