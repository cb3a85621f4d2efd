//! Walks through opening an account-link attempt and the popup-side claim loop.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use url::Url;
// self
use oauth2_handoff::{
	auth::{FlowIdentity, OrgId, ProviderId, ScopeSet, StateToken, UserId},
	flows::Connector,
	provider::{ClientAuthMethod, ProviderDescriptor},
	store::{EphemeralStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let store: Arc<dyn EphemeralStore> = Arc::new(MemoryStore::default());
	let descriptor = ProviderDescriptor::builder(ProviderId::new("hubspot")?)
		.authorization_endpoint(Url::parse("https://app.hubspot.com/oauth/authorize")?)
		.token_endpoint(Url::parse("https://api.hubapi.com/oauth/v1/token")?)
		.preferred_client_auth_method(ClientAuthMethod::ClientSecretPost)
		.build()?;
	let connector = Connector::new(
		store,
		descriptor,
		"demo-client",
		Url::parse("https://app.example.com/integrations/hubspot/callback")?,
		ScopeSet::new(["crm.objects.contacts.read"])?,
	)
	.with_client_secret("demo-secret");
	let identity =
		FlowIdentity::new(UserId::new("user-123")?, OrgId::new("org-acme")?);
	let session = connector.start_link(identity.clone()).await?;

	println!("Open this URL in the popup: {}", &session.authorize_url);
	println!("The pending attempt is honored until {}.", session.expires_at);

	// The provider echoes the `state` parameter back on the redirect; it decodes to
	// the same identity that opened the flow.
	let echoed = StateToken::decode(&session.state)?;

	println!("State round-trips for {}.", echoed.identity());

	// Wire the redirect endpoint to `connector.complete_link(code, state)`; once it
	// lands, the claim below would return the credential payload exactly once.
	let watch = connector.completion_watch(&identity);

	println!("Callback landed yet: {}.", watch.is_complete());

	match connector.claim_credentials(&identity).await? {
		Some(payload) => println!("Credential ready ({} token).", payload.token_type),
		None => println!("No credential yet; the popup has not completed authorization."),
	}

	Ok(())
}
