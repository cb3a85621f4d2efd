// self
use oauth2_handoff::{
	auth::ProviderId,
	provider::{
		ClientAuthMethod, ProviderDescriptor, ProviderDescriptorBuilder, ProviderDescriptorError,
	},
	url::Url,
};

fn url(value: &str) -> Url {
	Url::parse(value).expect("Failed to parse descriptor test URL.")
}

fn builder(id: &str) -> ProviderDescriptorBuilder {
	let provider_id =
		ProviderId::new(id).expect("Failed to build provider identifier for descriptor tests.");

	ProviderDescriptor::builder(provider_id)
}

#[test]
fn descriptor_requires_both_endpoints() {
	let err = builder("missing-auth")
		.token_endpoint(url("https://example.com/token"))
		.build()
		.expect_err("Descriptor builder should reject missing authorization endpoints.");

	assert!(matches!(err, ProviderDescriptorError::MissingAuthorizationEndpoint));

	let err = builder("missing-token")
		.authorization_endpoint(url("https://example.com/auth"))
		.build()
		.expect_err("Descriptor builder should reject missing token endpoints.");

	assert!(matches!(err, ProviderDescriptorError::MissingTokenEndpoint));
}

#[test]
fn descriptor_rejects_insecure_endpoints() {
	let err = builder("insecure-auth")
		.authorization_endpoint(url("http://example.com/auth"))
		.token_endpoint(url("https://example.com/token"))
		.build()
		.expect_err("Descriptor builder should reject insecure authorization endpoints.");

	assert!(matches!(
		err,
		ProviderDescriptorError::InsecureEndpoint { endpoint: "authorization", .. }
	));

	let err = builder("insecure-token")
		.authorization_endpoint(url("https://example.com/auth"))
		.token_endpoint(url("http://example.com/token"))
		.build()
		.expect_err("Descriptor builder should reject insecure token endpoints.");

	assert!(matches!(err, ProviderDescriptorError::InsecureEndpoint { endpoint: "token", .. }));
}

#[test]
fn descriptor_rejects_control_character_delimiters() {
	let err = builder("bad-delimiter")
		.authorization_endpoint(url("https://example.com/auth"))
		.token_endpoint(url("https://example.com/token"))
		.scope_delimiter('\n')
		.build()
		.expect_err("Descriptor builder should reject control-character delimiters.");

	assert!(matches!(
		err,
		ProviderDescriptorError::InvalidScopeDelimiter { delimiter: '\n' }
	));
}

#[test]
fn descriptor_defaults_cover_the_common_provider_shape() {
	let descriptor = builder("crm")
		.authorization_endpoint(url("https://example.com/auth"))
		.token_endpoint(url("https://example.com/token"))
		.preferred_client_auth_method(ClientAuthMethod::ClientSecretPost)
		.build()
		.expect("Descriptor builder should succeed for secure endpoints.");

	assert_eq!(descriptor.endpoints.authorization.as_str(), "https://example.com/auth");
	assert_eq!(descriptor.endpoints.token.as_str(), "https://example.com/token");
	assert_eq!(descriptor.preferred_client_auth_method, ClientAuthMethod::ClientSecretPost);
	assert_eq!(descriptor.scope_delimiter, ' ');
}

#[test]
fn descriptor_serde_round_trips() {
	let descriptor = builder("crm")
		.authorization_endpoint(url("https://example.com/auth"))
		.token_endpoint(url("https://example.com/token"))
		.build()
		.expect("Descriptor builder should succeed for secure endpoints.");
	let payload = serde_json::to_string(&descriptor)
		.expect("Descriptor should serialize successfully.");
	let round_trip: ProviderDescriptor = serde_json::from_str(&payload)
		.expect("Serialized descriptor should deserialize from JSON.");

	assert_eq!(round_trip, descriptor);
}
