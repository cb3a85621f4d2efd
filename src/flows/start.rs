//! Link initiation: single-use state issuance plus authorize-URL construction.

// self
use crate::{
	_prelude::*,
	auth::{FlowIdentity, ScopeSet},
	error::ConfigError,
	flows::Connector,
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, LinkOutcome, LinkSpan, LinkStage},
	provider::ProviderDescriptor,
};

/// Pending link handshake returned by [`Connector::start_link`].
#[derive(Clone, Debug)]
pub struct LinkSession {
	/// Identity the attempt was opened for.
	pub identity: FlowIdentity,
	/// Encoded state value embedded in the authorize URL's `state` parameter.
	pub state: String,
	/// Fully-formed authorize URL the end user should be sent to.
	pub authorize_url: Url,
	/// Instant the pending attempt stops being honored.
	pub expires_at: OffsetDateTime,
}

impl<C, M> Connector<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Opens a link attempt: issues single-use state and builds the authorize URL.
	///
	/// No provider call happens here. The only side effect is the pending-state
	/// write, which replaces any earlier attempt for the same identity; store-write
	/// failures surface as [`Error::Storage`].
	pub async fn start_link(&self, identity: FlowIdentity) -> Result<LinkSession> {
		const STAGE: LinkStage = LinkStage::Start;

		let span = LinkSpan::new(STAGE, "start_link");

		obs::record_link_outcome(STAGE, LinkOutcome::Attempt);

		let result = span
			.instrument(async move {
				let token = self.state_vault().issue(identity.clone()).await?;
				let state =
					token.encode().map_err(|source| ConfigError::StateEncode { source })?;
				let authorize_url = build_authorize_url(
					&self.descriptor,
					&self.client_id,
					&self.redirect_uri,
					&self.scope,
					&state,
				);
				let expires_at = OffsetDateTime::now_utc() + self.ttl.state;

				Ok(LinkSession { identity, state, authorize_url, expires_at })
			})
			.await;

		obs::record_link_outcome(
			STAGE,
			if result.is_ok() { LinkOutcome::Success } else { LinkOutcome::Failure },
		);

		result
	}
}

fn build_authorize_url(
	descriptor: &ProviderDescriptor,
	client_id: &str,
	redirect_uri: &Url,
	scope: &ScopeSet,
	state: &str,
) -> Url {
	let mut url = descriptor.endpoints.authorization.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("response_type", "code");
	pairs.append_pair("client_id", client_id);
	pairs.append_pair("redirect_uri", redirect_uri.as_str());

	if let Some(scope_value) = format_scope(scope, descriptor.scope_delimiter) {
		pairs.append_pair("scope", &scope_value);
	}

	pairs.append_pair("state", state);

	drop(pairs);

	url
}

/// Joins normalized scopes with the provider's delimiter when building requests.
pub(crate) fn format_scope(scope: &ScopeSet, delimiter: char) -> Option<String> {
	if scope.is_empty() {
		return None;
	}
	if delimiter == ' ' {
		return Some(scope.normalized());
	}

	let mut buf = String::new();

	for (idx, value) in scope.iter().enumerate() {
		if idx > 0 {
			buf.push(delimiter);
		}

		buf.push_str(value);
	}

	Some(buf)
}
