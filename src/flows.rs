//! High-level link-flow orchestration built around the [`Connector`].

pub mod callback;
pub mod claim;
pub mod start;
pub mod state;

pub use callback::*;
pub use claim::*;
pub use start::*;
pub use state::*;

// self
use crate::{
	_prelude::*,
	auth::ScopeSet,
	http::TokenHttpClient,
	notify::CompletionHub,
	oauth::TransportErrorMapper,
	provider::ProviderDescriptor,
	store::EphemeralStore,
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Connector specialized for the crate's default reqwest transport stack.
pub type ReqwestConnector = Connector<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Lifetimes applied to ephemeral entries.
///
/// Expiry is the only cleanup mechanism for abandoned flows: a user who closes the
/// popup mid-consent simply leaves entries behind for the TTL to reap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtlPolicy {
	/// Pending-state lifetime; bounds how long the user can linger on the provider's
	/// consent page.
	pub state: Duration,
	/// Credential lifetime; long enough for the browser-side claim, short enough to
	/// bound the exposure of an unclaimed token.
	pub credential: Duration,
}
impl Default for TtlPolicy {
	fn default() -> Self {
		Self { state: Duration::seconds(600), credential: Duration::seconds(600) }
	}
}

/// Coordinates the account-link handshake against a single provider descriptor.
///
/// The connector owns the HTTP client, ephemeral store handle, descriptor, and client
/// credentials so the three flow operations (start, callback, claim) can focus on
/// handshake semantics. All cross-request coordination runs through the store's
/// atomic per-key operations; the connector itself holds no per-flow locks.
#[derive(Clone)]
pub struct Connector<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for the token-endpoint exchange.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Ephemeral store holding pending state and unclaimed credentials.
	pub store: Arc<dyn EphemeralStore>,
	/// Provider descriptor that defines the OAuth endpoints.
	pub descriptor: ProviderDescriptor,
	/// OAuth 2.0 client identifier used in every attempt.
	pub client_id: String,
	/// Optional client secret for confidential authentication methods.
	pub client_secret: Option<String>,
	/// Redirect URI registered with the provider.
	pub redirect_uri: Url,
	/// Fixed scope set requested on every link attempt.
	pub scope: ScopeSet,
	/// Entry lifetimes applied by the flows.
	pub ttl: TtlPolicy,
	completions: Arc<CompletionHub>,
}
impl<C, M> Connector<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a connector that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		store: Arc<dyn EphemeralStore>,
		descriptor: ProviderDescriptor,
		client_id: impl Into<String>,
		redirect_uri: Url,
		scope: ScopeSet,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			store,
			descriptor,
			client_id: client_id.into(),
			client_secret: None,
			redirect_uri,
			scope,
			ttl: TtlPolicy::default(),
			completions: Default::default(),
		}
	}

	/// Sets or replaces the client secret used for confidential client auth modes.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Overrides the default entry lifetimes.
	pub fn with_ttl_policy(mut self, ttl: TtlPolicy) -> Self {
		self.ttl = ttl;

		self
	}

	/// State vault view over the connector's store and pending-state TTL.
	pub fn state_vault(&self) -> StateVault {
		StateVault::new(self.store.clone(), self.ttl.state)
	}

	pub(crate) fn completions(&self) -> &CompletionHub {
		&self.completions
	}
}
#[cfg(feature = "reqwest")]
impl Connector<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a new connector for the provided descriptor and client identifier.
	///
	/// The connector provisions its own reqwest-backed transport so callers do not
	/// need to pass HTTP handles explicitly. Use [`Connector::with_client_secret`] to
	/// attach a confidential client secret when the descriptor prefers
	/// `client_secret_basic` or `client_secret_post`.
	pub fn new(
		store: Arc<dyn EphemeralStore>,
		descriptor: ProviderDescriptor,
		client_id: impl Into<String>,
		redirect_uri: Url,
		scope: ScopeSet,
	) -> Self {
		Self::with_http_client(
			store,
			descriptor,
			client_id,
			redirect_uri,
			scope,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Debug for Connector<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Connector")
			.field("descriptor", &self.descriptor)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("redirect_uri", &self.redirect_uri)
			.field("scope", &self.scope)
			.field("ttl", &self.ttl)
			.finish()
	}
}
