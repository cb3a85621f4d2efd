//! Simple file-backed [`EphemeralStore`] for lightweight single-process deployments.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{CredentialRecord, FlowIdentity, StateRecord},
	store::{EphemeralStore, StoreError, StoreFuture, StoreKey, StoredEntry},
};

/// Persists handoff entries to a JSON snapshot after each mutation.
///
/// Consumed and expired entries never survive a restart: takes persist the removal
/// before returning, and every write prunes entries whose TTL lapsed.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<StoreKey, StoredEntry>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	///
	/// Opening validates the location up front, so a misconfigured path fails at
	/// startup instead of on the first flow.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = if path.exists() { Self::load_snapshot(&path)? } else { HashMap::new() };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<StoreKey, StoredEntry>, StoreError> {
		if !path.exists() {
			return Ok(HashMap::new());
		}

		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		let entries: Vec<(StoreKey, StoredEntry)> =
			serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		Ok(entries.into_iter().collect())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist_locked(&self, contents: &HashMap<StoreKey, StoredEntry>) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let snapshot: Vec<_> = contents.iter().collect();
		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn put_entry(&self, key: StoreKey, entry: StoredEntry) -> Result<(), StoreError> {
		let now = OffsetDateTime::now_utc();
		let mut guard = self.inner.write();

		// Writes double as the snapshot's garbage collection point.
		guard.retain(|_, existing| !existing.is_expired_at(now));
		guard.insert(key, entry);

		self.persist_locked(&guard)
	}

	fn take_entry(&self, key: &StoreKey) -> Result<Option<StoredEntry>, StoreError> {
		let now = OffsetDateTime::now_utc();
		let mut guard = self.inner.write();
		let Some(entry) = guard.remove(key) else {
			return Ok(None);
		};

		self.persist_locked(&guard)?;

		if entry.is_expired_at(now) {
			return Ok(None);
		}

		Ok(Some(entry))
	}
}
impl EphemeralStore for FileStore {
	fn put_state(&self, record: StateRecord) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			self.put_entry(StoreKey::state(&record.identity), StoredEntry::State(record))
		})
	}

	fn take_state<'a>(&'a self, identity: &'a FlowIdentity) -> StoreFuture<'a, Option<StateRecord>> {
		Box::pin(async move {
			Ok(match self.take_entry(&StoreKey::state(identity))? {
				Some(StoredEntry::State(record)) => Some(record),
				_ => None,
			})
		})
	}

	fn put_credential(&self, record: CredentialRecord) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			self.put_entry(StoreKey::credential(&record.identity), StoredEntry::Credential(record))
		})
	}

	fn take_credential<'a>(
		&'a self,
		identity: &'a FlowIdentity,
	) -> StoreFuture<'a, Option<CredentialRecord>> {
		Box::pin(async move {
			Ok(match self.take_entry(&StoreKey::credential(identity))? {
				Some(StoredEntry::Credential(record)) => Some(record),
				_ => None,
			})
		})
	}
}
