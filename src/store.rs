//! Storage contracts and built-in ephemeral backends for handoff records.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{CredentialRecord, FlowIdentity, OrgId, StateRecord, UserId},
};

/// Boxed future returned by [`EphemeralStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for TTL-bounded handoff entries.
///
/// Entries carry their own expiry instants; `take_*` treats an expired entry as
/// absent, so no background sweep is required. Each `take_*` must be atomic per key:
/// two concurrent takes of the same entry observe exactly one `Some`. That per-key
/// atomicity is the only cross-request coordination the flows rely on.
pub trait EphemeralStore
where
	Self: Send + Sync,
{
	/// Persists a pending-flow record, replacing any prior attempt for the identity.
	fn put_state(&self, record: StateRecord) -> StoreFuture<'_, ()>;

	/// Removes and returns the live pending record for the identity, if any.
	fn take_state<'a>(&'a self, identity: &'a FlowIdentity) -> StoreFuture<'a, Option<StateRecord>>;

	/// Persists an exchanged credential awaiting its one-shot claim.
	fn put_credential(&self, record: CredentialRecord) -> StoreFuture<'_, ()>;

	/// Removes and returns the live credential for the identity, if any.
	fn take_credential<'a>(
		&'a self,
		identity: &'a FlowIdentity,
	) -> StoreFuture<'a, Option<CredentialRecord>>;
}

/// Error type produced by [`EphemeralStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Namespace a store entry lives under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
	/// Pending-flow state entries.
	State,
	/// Exchanged credential entries.
	Credential,
}
impl KeyKind {
	/// Wire prefix the namespace renders under.
	pub fn prefix(self) -> &'static str {
		match self {
			KeyKind::State => "state",
			KeyKind::Credential => "cred",
		}
	}
}

/// Unique key identifying one ephemeral entry, derived from the flow identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreKey {
	/// Entry namespace.
	pub kind: KeyKind,
	/// User component of the identity.
	pub user: UserId,
	/// Org component of the identity.
	pub org: OrgId,
}
impl StoreKey {
	/// Builds the pending-state key for an identity.
	pub fn state(identity: &FlowIdentity) -> Self {
		Self::for_kind(KeyKind::State, identity)
	}

	/// Builds the credential key for an identity.
	pub fn credential(identity: &FlowIdentity) -> Self {
		Self::for_kind(KeyKind::Credential, identity)
	}

	fn for_kind(kind: KeyKind, identity: &FlowIdentity) -> Self {
		Self { kind, user: identity.user.clone(), org: identity.org.clone() }
	}
}
impl Display for StoreKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}:{}:{}", self.kind.prefix(), self.user, self.org)
	}
}

/// Envelope the built-in backends store under a [`StoreKey`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) enum StoredEntry {
	/// A pending-flow record.
	State(StateRecord),
	/// An exchanged credential record.
	Credential(CredentialRecord),
}
impl StoredEntry {
	pub(crate) fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		match self {
			StoredEntry::State(record) => record.is_expired_at(instant),
			StoredEntry::Credential(record) => record.is_expired_at(instant),
		}
	}
}
