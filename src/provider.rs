//! Provider metadata consumed by the link flows.
//!
//! Descriptors are validated at build time (HTTPS endpoints, printable scope
//! delimiter) so flow code can assume endpoint sanity.

/// Builder API for assembling provider descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, auth::ProviderId};

/// Preferred client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
}

/// Endpoint pair declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint the end user is sent to.
	pub authorization: Url,
	/// Token endpoint used for the back-channel code exchange.
	pub token: Url,
}

/// Immutable provider descriptor consumed by the connector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Preferred client authentication mechanism.
	pub preferred_client_auth_method: ClientAuthMethod,
	/// Character used to join scopes when constructing the `scope` parameter.
	pub scope_delimiter: char,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}
}
