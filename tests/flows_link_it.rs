#![cfg(feature = "reqwest")]

// std
use std::{collections::HashMap, sync::Arc};
// crates.io
use httpmock::prelude::*;
// self
use oauth2_handoff::{
	auth::{FlowIdentity, OrgId, ScopeSet, StateError, StateToken, UserId},
	error::{Error, ExchangeError},
	flows::{Connector, ReqwestConnector},
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	provider::{ClientAuthMethod, ProviderDescriptor},
	reqwest::Client as ReqwestClient,
	store::{EphemeralStore, MemoryStore},
	url::Url,
};

const CLIENT_ID: &str = "client-it";
const CLIENT_SECRET: &str = "secret-it";

fn build_descriptor(server: &MockServer) -> ProviderDescriptor {
	let provider_id = oauth2_handoff::auth::ProviderId::new("mock-crm")
		.expect("Provider identifier should be valid for link tests.");

	ProviderDescriptor::builder(provider_id)
		.authorization_endpoint(
			Url::parse(&server.url("/authorize"))
				.expect("Mock authorization endpoint should parse successfully."),
		)
		.token_endpoint(
			Url::parse(&server.url("/token"))
				.expect("Mock token endpoint should parse successfully."),
		)
		.preferred_client_auth_method(ClientAuthMethod::ClientSecretPost)
		.build()
		.expect("Provider descriptor should build successfully.")
}

fn test_reqwest_http_client() -> ReqwestHttpClient {
	let client = ReqwestClient::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

fn build_connector(server: &MockServer) -> (ReqwestConnector, Arc<MemoryStore>) {
	let store_backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn EphemeralStore> = store_backend.clone();
	let redirect_uri = Url::parse("https://app.example.com/integrations/crm/callback")
		.expect("Redirect URI should parse successfully.");
	let scope = ScopeSet::new(["crm.objects.contacts.read"])
		.expect("Scope set should be valid for link tests.");
	let connector = Connector::with_http_client(
		store,
		build_descriptor(server),
		CLIENT_ID,
		redirect_uri,
		scope,
		test_reqwest_http_client(),
		Arc::new(ReqwestTransportErrorMapper),
	)
	.with_client_secret(CLIENT_SECRET);

	(connector, store_backend)
}

fn identity(user: &str, org: &str) -> FlowIdentity {
	FlowIdentity::new(
		UserId::new(user).expect("User identifier should be valid for link tests."),
		OrgId::new(org).expect("Org identifier should be valid for link tests."),
	)
}

#[tokio::test]
async fn start_link_builds_the_authorize_url_and_embeds_identity_scoped_state() {
	let server = MockServer::start_async().await;
	let (connector, _store) = build_connector(&server);
	let id = identity("u1", "o1");
	let session =
		connector.start_link(id.clone()).await.expect("Starting a link attempt should succeed.");

	assert_eq!(session.identity, id);
	assert!(session.expires_at > time::OffsetDateTime::now_utc());

	let pairs: HashMap<_, _> = session.authorize_url.query_pairs().into_owned().collect();

	assert_eq!(pairs.get("response_type"), Some(&"code".into()));
	assert_eq!(pairs.get("client_id"), Some(&CLIENT_ID.into()));
	assert_eq!(
		pairs.get("redirect_uri"),
		Some(&"https://app.example.com/integrations/crm/callback".into())
	);
	assert_eq!(pairs.get("scope"), Some(&"crm.objects.contacts.read".into()));
	assert_eq!(pairs.get("state"), Some(&session.state));

	let decoded = StateToken::decode(&session.state)
		.expect("The state parameter should decode back into a token.");

	assert_eq!(decoded.identity(), &id);
	assert!(!decoded.secret().is_empty());
}

#[tokio::test]
async fn full_link_handshake_delivers_the_credential_exactly_once() {
	let server = MockServer::start_async().await;
	let (connector, _store) = build_connector(&server);
	let id = identity("u1", "o1");
	let watch = connector.completion_watch(&id);
	let session =
		connector.start_link(id.clone()).await.expect("Starting a link attempt should succeed.");
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"access-success\",\"refresh_token\":\"refresh-success\",\"token_type\":\"bearer\",\"expires_in\":3600,\"scope\":\"crm.objects.contacts.read\"}",
			);
		})
		.await;

	assert!(!watch.is_complete());

	let receipt = connector
		.complete_link("valid-code", &session.state)
		.await
		.expect("Completing the link should succeed.");

	mock.assert_async().await;

	assert_eq!(receipt.identity, id);
	assert_eq!(receipt.provider.as_ref(), "mock-crm");
	assert!(watch.is_complete(), "Completion must be signaled once the credential lands.");
	watch.wait().await;

	let payload = connector
		.claim_credentials(&id)
		.await
		.expect("Claiming the credential should succeed.")
		.expect("The first claim should observe the stored credential.");

	assert_eq!(payload.access_token.expose(), "access-success");
	assert_eq!(
		payload.refresh_token.as_ref().map(|secret| secret.expose()),
		Some("refresh-success")
	);
	assert_eq!(payload.token_type, "bearer");
	assert_eq!(payload.expires_in, Some(3_600));
	assert_eq!(payload.scope.as_deref(), Some("crm.objects.contacts.read"));

	let second = connector
		.claim_credentials(&id)
		.await
		.expect("A second claim should still succeed as an operation.");

	assert!(second.is_none(), "The credential handoff must be single-use.");
}

#[tokio::test]
async fn claim_before_completion_reports_not_ready() {
	let server = MockServer::start_async().await;
	let (connector, _store) = build_connector(&server);
	let id = identity("u1", "o1");

	connector.start_link(id.clone()).await.expect("Starting a link attempt should succeed.");

	let pending = connector
		.claim_credentials(&id)
		.await
		.expect("Claiming before completion should not error.");

	assert!(pending.is_none(), "An unfinished flow must read as an empty claim.");
}

#[tokio::test]
async fn callback_rejects_state_that_was_never_issued() {
	let server = MockServer::start_async().await;
	let (connector, _store) = build_connector(&server);
	let forged = StateToken::new(identity("u1", "o1"), "never-issued")
		.encode()
		.expect("Encoding the forged token should succeed.");
	let err = connector
		.complete_link("some-code", &forged)
		.await
		.expect_err("A state value that was never issued must be rejected.");

	assert!(matches!(err, Error::InvalidState(StateError::NotFound)));
}

#[tokio::test]
async fn callback_rejects_tampered_identity_before_contacting_the_provider() {
	let server = MockServer::start_async().await;
	let (connector, _store) = build_connector(&server);
	let id = identity("u1", "o1");
	let session =
		connector.start_link(id.clone()).await.expect("Starting a link attempt should succeed.");
	let decoded = StateToken::decode(&session.state)
		.expect("The state parameter should decode back into a token.");
	// A valid token value re-bound to someone else's identity.
	let tampered = StateToken::new(identity("mallory", "o1"), decoded.secret())
		.encode()
		.expect("Encoding the tampered token should succeed.");
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"never\",\"token_type\":\"bearer\"}");
		})
		.await;
	let err = connector
		.complete_link("some-code", &tampered)
		.await
		.expect_err("Tampered identity must fail state validation.");

	assert!(matches!(err, Error::InvalidState(_)));
	assert_eq!(mock.hits_async().await, 0, "The token endpoint must never be called.");
}

#[tokio::test]
async fn callback_rejects_undecodable_state() {
	let server = MockServer::start_async().await;
	let (connector, _store) = build_connector(&server);
	let err = connector
		.complete_link("some-code", "not-json-at-all")
		.await
		.expect_err("Garbage state must be rejected before validation.");

	assert!(matches!(err, Error::InvalidState(StateError::Malformed { .. })));
}

#[tokio::test]
async fn failed_exchange_surfaces_upstream_status_and_stores_nothing() {
	let server = MockServer::start_async().await;
	let (connector, _store) = build_connector(&server);
	let id = identity("u1", "o1");
	let session =
		connector.start_link(id.clone()).await.expect("Starting a link attempt should succeed.");
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"already used\"}");
		})
		.await;
	let err = connector
		.complete_link("stale-code", &session.state)
		.await
		.expect_err("A rejected exchange must surface as an error.");

	mock.assert_async().await;

	assert!(matches!(err, Error::Exchange(ExchangeError::Rejected { status: Some(400), .. })));

	let nothing = connector
		.claim_credentials(&id)
		.await
		.expect("Claiming after a failed exchange should not error.");

	assert!(nothing.is_none(), "No credential may be stored when the exchange fails.");

	// The state was consumed before the exchange; the flow must be restarted.
	let replay = connector
		.complete_link("stale-code", &session.state)
		.await
		.expect_err("Replaying the state after a failed exchange must fail.");

	assert!(matches!(replay, Error::InvalidState(StateError::NotFound)));
}
