//! Redirect handling: state validation, code exchange, and credential persistence.

// self
use crate::{
	_prelude::*,
	auth::{CredentialRecord, FlowIdentity, ProviderId, StateToken},
	error::ConfigError,
	flows::Connector,
	http::TokenHttpClient,
	oauth::{ExchangeFacade, TransportErrorMapper},
	obs::{self, LinkOutcome, LinkSpan, LinkStage},
};

/// Minimal confirmation returned to the popup after a successful exchange.
///
/// Carries no secret material; the credential itself is claimed out of band through
/// [`Connector::claim_credentials`](crate::flows::Connector::claim_credentials).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LinkReceipt {
	/// Provider the account was linked against.
	pub provider: ProviderId,
	/// Identity whose link attempt completed.
	pub identity: FlowIdentity,
	/// Instant the exchange completed.
	pub linked_at: OffsetDateTime,
}

impl<C, M> Connector<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Completes the provider redirect: validates state, exchanges the code, and
	/// stores the resulting credential for its one-shot claim.
	///
	/// The identity is recovered from the decoded state token itself, never from
	/// ambient request context, and any decode or validation failure aborts before
	/// the provider is contacted. Exchange failures are surfaced, not retried:
	/// authorization codes are single-use upstream, so the user must restart the
	/// flow either way.
	pub async fn complete_link(&self, code: &str, state: &str) -> Result<LinkReceipt> {
		const STAGE: LinkStage = LinkStage::Callback;

		let span = LinkSpan::new(STAGE, "complete_link");

		obs::record_link_outcome(STAGE, LinkOutcome::Attempt);

		let result = span
			.instrument(async move {
				let presented = StateToken::decode(state)?;
				let identity = presented.identity().clone();

				self.state_vault().validate(&identity, &presented).await?;

				let facade: ExchangeFacade<C, M> = ExchangeFacade::from_descriptor(
					&self.descriptor,
					&self.client_id,
					self.client_secret.as_deref(),
					&self.redirect_uri,
					self.http_client.clone(),
					self.transport_mapper.clone(),
				)?;
				let payload = facade.exchange_authorization_code(code).await?;
				let record = CredentialRecord::builder(identity.clone(), payload)
					.issued_now()
					.expires_in(self.ttl.credential)
					.build()
					.map_err(ConfigError::from)?;
				let linked_at = record.issued_at;

				self.store.put_credential(record).await?;
				self.completions().signal(&identity);

				Ok(LinkReceipt { provider: self.descriptor.id.clone(), identity, linked_at })
			})
			.await;

		obs::record_link_outcome(
			STAGE,
			if result.is_ok() { LinkOutcome::Success } else { LinkOutcome::Failure },
		);

		result
	}
}
