//! Credential payloads, their redacted secrets, and the stored record wrapper.

// self
use crate::{_prelude::*, auth::FlowIdentity};

/// Redacted secret wrapper keeping credential material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretString(String);
impl SecretString {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for SecretString {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for SecretString {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SecretString").field(&"<redacted>").finish()
	}
}
impl Display for SecretString {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Provider token-endpoint response retained for the browser-side handoff.
///
/// The shape follows RFC 6749 §5.1; optional fields stay exactly as the provider
/// reported them rather than being re-derived.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPayload {
	/// Bearer credential issued by the provider.
	pub access_token: SecretString,
	/// Token type reported by the provider (typically `bearer`).
	pub token_type: String,
	/// Relative expiry reported by the provider, in seconds.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub expires_in: Option<u64>,
	/// Rotation secret, when the provider issued one.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<SecretString>,
	/// Delimiter-joined scopes granted by the provider.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
}

/// Errors produced by [`CredentialRecordBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CredentialRecordBuilderError {
	/// Issued when no expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
}

/// Stored credential awaiting its one-shot claim.
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
	/// Identity the credential was exchanged for.
	pub identity: FlowIdentity,
	/// Verbatim provider payload handed back on claim.
	pub payload: CredentialPayload,
	/// Instant the exchange completed.
	pub issued_at: OffsetDateTime,
	/// Instant the unclaimed credential stops being retrievable.
	pub expires_at: OffsetDateTime,
}
impl CredentialRecord {
	/// Returns a builder for assembling records with explicit instants.
	pub fn builder(identity: FlowIdentity, payload: CredentialPayload) -> CredentialRecordBuilder {
		CredentialRecordBuilder::new(identity, payload)
	}

	/// Returns `true` when the claim window has elapsed at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Convenience helper that checks expiry against the current UTC instant.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}
}
impl Debug for CredentialRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialRecord")
			.field("identity", &self.identity)
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.payload.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Builder for [`CredentialRecord`].
#[derive(Clone, Debug)]
pub struct CredentialRecordBuilder {
	identity: FlowIdentity,
	payload: CredentialPayload,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl CredentialRecordBuilder {
	fn new(identity: FlowIdentity, payload: CredentialPayload) -> Self {
		Self { identity, payload, issued_at: None, expires_at: None, expires_in: None }
	}

	/// Sets the issue instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Convenience helper that stamps `issued_at` with the current clock.
	pub fn issued_now(self) -> Self {
		self.issued_at(OffsetDateTime::now_utc())
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issue instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Consumes the builder and produces a [`CredentialRecord`].
	pub fn build(self) -> Result<CredentialRecord, CredentialRecordBuilderError> {
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(delta)) => issued_at + delta,
			(None, None) => return Err(CredentialRecordBuilderError::MissingExpiry),
		};

		Ok(CredentialRecord { identity: self.identity, payload: self.payload, issued_at, expires_at })
	}
}
