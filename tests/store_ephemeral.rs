// std
use std::sync::Arc;
// crates.io
use time::{Duration, OffsetDateTime, macros};
// self
use oauth2_handoff::{
	auth::{
		CredentialPayload, CredentialRecord, FlowIdentity, OrgId, SecretString, StateRecord,
		StateToken, UserId,
	},
	store::{EphemeralStore, MemoryStore},
};

fn identity(user: &str, org: &str) -> FlowIdentity {
	FlowIdentity::new(
		UserId::new(user).expect("User identifier should be valid for store tests."),
		OrgId::new(org).expect("Org identifier should be valid for store tests."),
	)
}

fn payload(access: &str) -> CredentialPayload {
	CredentialPayload {
		access_token: SecretString::new(access),
		token_type: "bearer".into(),
		expires_in: Some(1_800),
		refresh_token: None,
		scope: None,
	}
}

fn credential_record(
	id: &FlowIdentity,
	access: &str,
	issued_at: OffsetDateTime,
	ttl: Duration,
) -> CredentialRecord {
	CredentialRecord::builder(id.clone(), payload(access))
		.issued_at(issued_at)
		.expires_in(ttl)
		.build()
		.expect("Credential record fixture should build successfully.")
}

#[tokio::test]
async fn state_round_trips_and_is_taken_exactly_once() {
	let store = MemoryStore::default();
	let id = identity("u1", "o1");
	let token = StateToken::new(id.clone(), "pending-token");

	store
		.put_state(StateRecord::new(&token, Duration::seconds(600)))
		.await
		.expect("Saving pending state should succeed.");

	let fetched = store
		.take_state(&id)
		.await
		.expect("Taking pending state should succeed.")
		.expect("Pending state should be present on the first take.");

	assert_eq!(fetched.token, "pending-token");
	assert_eq!(fetched.identity, id);

	let second = store.take_state(&id).await.expect("Second take should succeed.");

	assert!(second.is_none(), "Delete-on-read must leave nothing for a second take.");
}

#[tokio::test]
async fn overwriting_pending_state_is_last_writer_wins() {
	let store = MemoryStore::default();
	let id = identity("u1", "o1");

	store
		.put_state(StateRecord::new(&StateToken::new(id.clone(), "first"), Duration::seconds(600)))
		.await
		.expect("Saving first pending state should succeed.");
	store
		.put_state(StateRecord::new(&StateToken::new(id.clone(), "second"), Duration::seconds(600)))
		.await
		.expect("Saving second pending state should succeed.");

	let fetched = store
		.take_state(&id)
		.await
		.expect("Taking pending state should succeed.")
		.expect("Pending state should be present.");

	assert_eq!(fetched.token, "second");
}

#[tokio::test]
async fn expired_state_reads_as_absent() {
	let store = MemoryStore::default();
	let id = identity("u1", "o1");
	let token = StateToken::new(id.clone(), "stale");
	let stale = StateRecord::new_at(
		&token,
		OffsetDateTime::now_utc() - Duration::seconds(700),
		Duration::seconds(600),
	);

	store.put_state(stale).await.expect("Saving stale state should succeed.");

	assert!(
		store.take_state(&id).await.expect("Take should succeed.").is_none(),
		"State past its TTL must read as absent."
	);
}

#[tokio::test]
async fn credentials_are_claimed_exactly_once() {
	let store = MemoryStore::default();
	let id = identity("u1", "o1");
	let record =
		credential_record(&id, "abc", OffsetDateTime::now_utc(), Duration::seconds(600));

	store.put_credential(record).await.expect("Saving credential should succeed.");

	let claimed = store
		.take_credential(&id)
		.await
		.expect("Taking credential should succeed.")
		.expect("Credential should be present on the first take.");

	assert_eq!(claimed.payload.access_token.expose(), "abc");

	let second = store.take_credential(&id).await.expect("Second take should succeed.");

	assert!(second.is_none(), "A claimed credential must not be retrievable again.");
}

#[tokio::test]
async fn unclaimed_credentials_expire() {
	let store = MemoryStore::default();
	let id = identity("u1", "o1");
	let expired = credential_record(
		&id,
		"abc",
		macros::datetime!(2025-01-01 00:00 UTC),
		Duration::seconds(600),
	);

	store.put_credential(expired).await.expect("Saving expired credential should succeed.");

	assert!(
		store.take_credential(&id).await.expect("Take should succeed.").is_none(),
		"A credential past its TTL must read as absent."
	);
}

#[tokio::test]
async fn namespaces_and_identities_are_isolated() {
	let store = MemoryStore::default();
	let alice = identity("alice", "o1");
	let bob = identity("bob", "o1");
	let token = StateToken::new(alice.clone(), "alice-token");

	store
		.put_state(StateRecord::new(&token, Duration::seconds(600)))
		.await
		.expect("Saving pending state should succeed.");

	// Same identity, different namespace.
	assert!(store.take_credential(&alice).await.expect("Take should succeed.").is_none());
	// Same namespace, different identity.
	assert!(store.take_state(&bob).await.expect("Take should succeed.").is_none());
	// The original entry is untouched by either probe.
	assert!(store.take_state(&alice).await.expect("Take should succeed.").is_some());
}

#[tokio::test]
async fn concurrent_takes_observe_a_single_entry() {
	let store = Arc::new(MemoryStore::default());
	let id = identity("u1", "o1");
	let record =
		credential_record(&id, "abc", OffsetDateTime::now_utc(), Duration::seconds(600));

	store.put_credential(record).await.expect("Saving credential should succeed.");

	let task_a = {
		let store = store.clone();
		let id = id.clone();

		tokio::spawn(async move { store.take_credential(&id).await })
	};
	let task_b = {
		let store = store.clone();
		let id = id.clone();

		tokio::spawn(async move { store.take_credential(&id).await })
	};
	let (outcome_a, outcome_b) = tokio::join!(task_a, task_b);
	let outcome_a = outcome_a.expect("Take task A should not panic.").expect("Take A should succeed.");
	let outcome_b = outcome_b.expect("Take task B should not panic.").expect("Take B should succeed.");
	let hits = [&outcome_a, &outcome_b].iter().filter(|outcome| outcome.is_some()).count();

	assert_eq!(hits, 1, "exactly one concurrent take may observe the entry");
}
