//! Thread-safe in-memory [`EphemeralStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{CredentialRecord, FlowIdentity, StateRecord},
	store::{EphemeralStore, StoreError, StoreFuture, StoreKey, StoredEntry},
};

type StoreMap = Arc<RwLock<HashMap<StoreKey, StoredEntry>>>;

/// Thread-safe storage backend that keeps entries in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	fn put_now(map: StoreMap, key: StoreKey, entry: StoredEntry) -> Result<(), StoreError> {
		map.write().insert(key, entry);

		Ok(())
	}

	// Removal happens under a single write guard, so two racing takes of the same
	// key observe exactly one entry; expiry is checked on whatever was removed.
	fn take_now(map: StoreMap, key: StoreKey, now: OffsetDateTime) -> Option<StoredEntry> {
		let entry = map.write().remove(&key)?;

		if entry.is_expired_at(now) {
			return None;
		}

		Some(entry)
	}
}
impl EphemeralStore for MemoryStore {
	fn put_state(&self, record: StateRecord) -> StoreFuture<'_, ()> {
		let map = self.0.clone();
		let key = StoreKey::state(&record.identity);

		Box::pin(async move { Self::put_now(map, key, StoredEntry::State(record)) })
	}

	fn take_state<'a>(&'a self, identity: &'a FlowIdentity) -> StoreFuture<'a, Option<StateRecord>> {
		let map = self.0.clone();
		let key = StoreKey::state(identity);

		Box::pin(async move {
			Ok(match Self::take_now(map, key, OffsetDateTime::now_utc()) {
				Some(StoredEntry::State(record)) => Some(record),
				_ => None,
			})
		})
	}

	fn put_credential(&self, record: CredentialRecord) -> StoreFuture<'_, ()> {
		let map = self.0.clone();
		let key = StoreKey::credential(&record.identity);

		Box::pin(async move { Self::put_now(map, key, StoredEntry::Credential(record)) })
	}

	fn take_credential<'a>(
		&'a self,
		identity: &'a FlowIdentity,
	) -> StoreFuture<'a, Option<CredentialRecord>> {
		let map = self.0.clone();
		let key = StoreKey::credential(identity);

		Box::pin(async move {
			Ok(match Self::take_now(map, key, OffsetDateTime::now_utc()) {
				Some(StoredEntry::Credential(record)) => Some(record),
				_ => None,
			})
		})
	}
}
