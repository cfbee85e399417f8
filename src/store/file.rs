//! Simple file-backed [`GatewayStore`] for lightweight deployments and demos.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{CachedTokenResponse, ClientAccessToken, ClientId, ClientRecord, ScopeGrant},
	store::{CacheKey, GatewayStore, GrantKey, StoreError, StoreFuture},
};

#[derive(Clone, Debug, Default)]
struct Tables {
	clients: HashMap<ClientId, ClientRecord>,
	grants: BTreeMap<GrantKey, ScopeGrant>,
	cached: HashMap<CacheKey, CachedTokenResponse>,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
	clients: Vec<ClientRecord>,
	grants: Vec<ScopeGrant>,
	cached: Vec<CachedTokenResponse>,
}

/// Persists gateway records to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<Tables>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let tables = if path.exists() { Self::load_snapshot(&path)? } else { Tables::default() };

		Ok(Self { path, inner: Arc::new(RwLock::new(tables)) })
	}

	fn load_snapshot(path: &Path) -> Result<Tables, StoreError> {
		if !path.exists() {
			return Ok(Tables::default());
		}

		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(Tables::default());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		let snapshot: Snapshot =
			serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		Ok(Self::tables_of(snapshot))
	}

	fn tables_of(snapshot: Snapshot) -> Tables {
		let mut tables = Tables::default();

		for record in snapshot.clients {
			tables.clients.insert(record.client_id.clone(), record);
		}
		for grant in snapshot.grants {
			tables.grants.insert(GrantKey::of(&grant), grant);
		}
		for response in snapshot.cached {
			tables.cached.insert(CacheKey::of(&response), response);
		}

		tables
	}

	// Entries are sorted so repeated persists of the same state produce identical files.
	fn snapshot_of(tables: &Tables) -> Snapshot {
		let mut clients: Vec<_> = tables.clients.values().cloned().collect();
		let mut cached: Vec<_> = tables.cached.values().cloned().collect();

		clients.sort_by(|a, b| a.client_id.cmp(&b.client_id));
		cached.sort_by(|a, b| (&a.client_id, &a.request_hash).cmp(&(&b.client_id, &b.request_hash)));

		Snapshot { clients, grants: tables.grants.values().cloned().collect(), cached }
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist_locked(&self, tables: &Tables) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let snapshot = Self::snapshot_of(tables);
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
}
impl GatewayStore for FileStore {
	fn save_client(&self, record: ClientRecord) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			guard.clients.insert(record.client_id.clone(), record);
			self.persist_locked(&guard)?;

			Ok(())
		})
	}

	fn fetch_client<'a>(
		&'a self,
		client_id: &'a ClientId,
	) -> StoreFuture<'a, Option<ClientRecord>> {
		Box::pin(async move { Ok(self.inner.read().clients.get(client_id).cloned()) })
	}

	fn fetch_client_by_credentials<'a>(
		&'a self,
		client_id: &'a ClientId,
		client_secret_hash: &'a str,
	) -> StoreFuture<'a, Option<ClientRecord>> {
		Box::pin(async move {
			Ok(self
				.inner
				.read()
				.clients
				.get(client_id)
				.filter(|record| record.client_secret_hash == client_secret_hash)
				.cloned())
		})
	}

	fn save_client_token<'a>(
		&'a self,
		client_id: &'a ClientId,
		token: ClientAccessToken,
	) -> StoreFuture<'a, bool> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			match guard.clients.get_mut(client_id) {
				Some(record) => {
					record.access_token = Some(token);
					self.persist_locked(&guard)?;

					Ok(true)
				},
				None => Ok(false),
			}
		})
	}

	fn save_scope_grant(&self, grant: ScopeGrant) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			guard.grants.insert(GrantKey::of(&grant), grant);
			self.persist_locked(&guard)?;

			Ok(())
		})
	}

	fn list_scope_grants<'a>(
		&'a self,
		client_id: &'a ClientId,
	) -> StoreFuture<'a, Vec<ScopeGrant>> {
		Box::pin(async move {
			Ok(self
				.inner
				.read()
				.grants
				.values()
				.filter(|grant| &grant.client_id == client_id)
				.cloned()
				.collect())
		})
	}

	fn fetch_cached_response<'a>(
		&'a self,
		client_id: &'a ClientId,
		request_hash: &'a str,
		now: OffsetDateTime,
	) -> StoreFuture<'a, Option<CachedTokenResponse>> {
		Box::pin(async move {
			Ok(self
				.inner
				.read()
				.cached
				.get(&CacheKey::new(client_id, request_hash))
				.filter(|hit| hit.is_live_at(now))
				.cloned())
		})
	}

	fn save_cached_response(&self, response: CachedTokenResponse) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			guard.cached.insert(CacheKey::of(&response), response);
			self.persist_locked(&guard)?;

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;
	use crate::_preludet::{sample_cached_response, sample_client_record, sample_scope_grant};

	fn temp_path() -> PathBuf {
		let unique = format!(
			"oauth2_gateway_file_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn save_and_reload_round_trip() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let now = OffsetDateTime::now_utc();
		let client_id = ClientId::new("file-client").expect("Failed to build client id fixture.");
		let record = sample_client_record(&client_id, "a".repeat(64), now);
		let grant = sample_scope_grant(&client_id, "read", now);
		let cached = sample_cached_response(&client_id, "digest", "read", now);
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.save_client(record.clone()))
			.expect("Failed to save fixture record to file store.");
		rt.block_on(store.save_scope_grant(grant))
			.expect("Failed to save fixture grant to file store.");
		rt.block_on(store.save_cached_response(cached.clone()))
			.expect("Failed to save fixture cached response to file store.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let fetched = rt
			.block_on(reopened.fetch_client(&client_id))
			.expect("Failed to fetch fixture record from file store.")
			.expect("File store lost client record after reopen.");

		assert_eq!(fetched.client_secret_hash, record.client_secret_hash);

		let grants = rt
			.block_on(reopened.list_scope_grants(&client_id))
			.expect("Failed to list fixture grants from file store.");

		assert_eq!(grants.len(), 1);
		assert_eq!(grants[0].scope, "read");

		let hit = rt
			.block_on(reopened.fetch_cached_response(&client_id, "digest", now))
			.expect("Failed to fetch fixture cached response from file store.")
			.expect("File store lost cached response after reopen.");

		assert_eq!(hit.access_token.expose(), cached.access_token.expose());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
