//! Crate-level error types shared across flows, the provider facade, and stores.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical handoff error exposed by public APIs.
///
/// The variants deliberately map onto how an embedding server should answer:
/// [`Error::Storage`] is a 5xx, [`Error::InvalidState`] a 4xx, and
/// [`Error::Exchange`] follows the upstream status when one was observed.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Ephemeral-store failure; the current request cannot proceed.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Round-tripped authorization state failed validation.
	///
	/// The display string is identical for every underlying cause so callers cannot
	/// distinguish an expired attempt from a forged one; the detail survives as the
	/// error source for diagnostics.
	#[error("Authorization state is invalid or has expired.")]
	InvalidState(#[from] crate::auth::StateError),
	/// The provider refused or bungled the authorization-code exchange.
	///
	/// Never retried: authorization codes are single-use upstream, so replaying the
	/// exchange would fail anyway.
	#[error(transparent)]
	Exchange(#[from] ExchangeError),
}

/// Configuration and validation failures raised by the connector.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider descriptor contains an invalid URL.
	#[error("Descriptor contains an invalid URL.")]
	InvalidDescriptor {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// State payload could not be serialized into the authorize URL.
	#[error("State payload could not be encoded.")]
	StateEncode {
		/// Underlying JSON failure.
		#[source]
		source: serde_json::Error,
	},
	/// Credential record builder validation failed.
	#[error("Unable to build credential record.")]
	CredentialBuild(#[from] crate::auth::CredentialRecordBuilderError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures raised while exchanging an authorization code for credentials.
///
/// Every variant keeps the upstream HTTP status when one was observed so hosts can
/// surface 4xx vs 5xx faithfully via [`ExchangeError::upstream_status`].
#[derive(Debug, ThisError)]
pub enum ExchangeError {
	/// Provider rejected the exchange (bad, expired, or already-used code).
	#[error("Token endpoint rejected the authorization code: {reason}.")]
	Rejected {
		/// Provider-supplied reason string.
		reason: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint responded with a body that does not parse as a credential payload.
	#[error("Token endpoint returned a malformed credential payload.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Catch-all for unexpected client-side failures during the exchange.
	#[error("Token endpoint call failed unexpectedly: {message}.")]
	Unexpected {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Transport failure (DNS, TCP, TLS) while calling the token endpoint.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
impl ExchangeError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// HTTP status reported by the provider, when one was observed.
	pub fn upstream_status(&self) -> Option<u16> {
		match self {
			Self::Rejected { status, .. }
			| Self::MalformedResponse { status, .. }
			| Self::Unexpected { status, .. } => *status,
			Self::Network { .. } | Self::Io(_) => None,
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ExchangeError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::StateError;

	#[test]
	fn invalid_state_display_never_reveals_the_cause() {
		let not_found = Error::from(StateError::NotFound);
		let mismatch = Error::from(StateError::Mismatch);

		assert_eq!(not_found.to_string(), mismatch.to_string());
	}

	#[test]
	fn exchange_errors_expose_upstream_status() {
		let rejected = ExchangeError::Rejected { reason: "invalid_grant".into(), status: Some(400) };

		assert_eq!(rejected.upstream_status(), Some(400));

		let network = ExchangeError::Network { source: "connection refused".into() };

		assert_eq!(network.upstream_status(), None);
	}
}
