//! Anti-forgery state tokens round-tripped through the provider redirect.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
// self
use crate::{_prelude::*, auth::FlowIdentity};

const STATE_TOKEN_BYTES: usize = 32;

/// Errors raised while decoding or matching round-tripped authorization state.
///
/// All three causes surface through the same `InvalidState` display so a caller
/// probing the callback endpoint cannot tell which check failed.
#[derive(Debug, ThisError)]
pub enum StateError {
	/// No pending record exists under the flow's correlation key.
	#[error("No pending authorization state was found.")]
	NotFound,
	/// The stored record disagrees with the presented token or its embedded identity.
	#[error("Presented state does not match the pending authorization.")]
	Mismatch,
	/// The raw `state` parameter could not be decoded into a token.
	#[error("State parameter could not be decoded.")]
	Malformed {
		/// Underlying JSON failure.
		#[source]
		source: serde_json::Error,
	},
}

/// Anti-forgery token round-tripped through the provider redirect.
///
/// The wire form is flat JSON carrying the random token alongside the identity that
/// opened the flow, so the callback can recover both from the `state` query parameter
/// alone:
///
/// ```json
/// {"state":"<random>","user_id":"user-1","org_id":"org-1"}
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateToken {
	#[serde(rename = "state")]
	token: String,
	#[serde(flatten)]
	identity: FlowIdentity,
}
impl StateToken {
	/// Rehydrates a token from parts.
	///
	/// Intended for hosts that decode the `state` parameter themselves before handing
	/// it to the vault; normal flows receive tokens from `issue`.
	pub fn new(identity: FlowIdentity, token: impl Into<String>) -> Self {
		Self { token: token.into(), identity }
	}

	/// Generates a fresh token for the identity from the process CSPRNG.
	///
	/// 32 random bytes, URL-safe base64 without padding.
	pub(crate) fn generate(identity: FlowIdentity) -> Self {
		let mut bytes = [0_u8; STATE_TOKEN_BYTES];

		rand::rng().fill(&mut bytes[..]);

		Self { token: URL_SAFE_NO_PAD.encode(bytes), identity }
	}

	/// The random token value.
	pub fn secret(&self) -> &str {
		&self.token
	}

	/// The identity embedded in the token.
	pub fn identity(&self) -> &FlowIdentity {
		&self.identity
	}

	/// Serializes the token into the value placed in the `state` query parameter.
	pub fn encode(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(self)
	}

	/// Parses a round-tripped `state` parameter.
	pub fn decode(raw: &str) -> Result<Self, StateError> {
		serde_json::from_str(raw).map_err(|source| StateError::Malformed { source })
	}
}

/// Pending-flow record persisted while the end user is away at the provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
	/// Identity the pending attempt belongs to.
	pub identity: FlowIdentity,
	/// Expected token value for the attempt.
	pub token: String,
	/// Instant the attempt was opened.
	pub issued_at: OffsetDateTime,
	/// Instant the attempt stops being honored.
	pub expires_at: OffsetDateTime,
}
impl StateRecord {
	/// Creates a record for the token, expiring `ttl` after the current instant.
	pub fn new(token: &StateToken, ttl: Duration) -> Self {
		Self::new_at(token, OffsetDateTime::now_utc(), ttl)
	}

	/// Creates a record with an explicit issue instant.
	pub fn new_at(token: &StateToken, issued_at: OffsetDateTime, ttl: Duration) -> Self {
		Self {
			identity: token.identity().clone(),
			token: token.secret().to_owned(),
			issued_at,
			expires_at: issued_at + ttl,
		}
	}

	/// Returns `true` when the pending window has elapsed at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Whether the presented token matches this record exactly (value and identity).
	pub fn matches(&self, presented: &StateToken) -> bool {
		self.identity == *presented.identity() && self.token == presented.secret()
	}
}
