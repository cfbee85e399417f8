//! Storage contracts and built-in store implementations for gateway records.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{CachedTokenResponse, ClientAccessToken, ClientId, ClientRecord, ScopeGrant},
};

/// Persistence contract future returned by gateway stores.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by gateway stores.
pub trait GatewayStore
where
	Self: Send + Sync,
{
	/// Persists or replaces a client record keyed by its client id.
	fn save_client(&self, record: ClientRecord) -> StoreFuture<'_, ()>;

	/// Fetches the client record for the provided id, if present.
	fn fetch_client<'a>(&'a self, client_id: &'a ClientId)
	-> StoreFuture<'a, Option<ClientRecord>>;

	/// Fetches the client record whose stored secret digest matches.
	///
	/// A missing client and a digest mismatch are indistinguishable; both
	/// resolve to `None`.
	fn fetch_client_by_credentials<'a>(
		&'a self,
		client_id: &'a ClientId,
		client_secret_hash: &'a str,
	) -> StoreFuture<'a, Option<ClientRecord>>;

	/// Replaces the embedded access token of an existing client record.
	///
	/// Returns `false` without writing when the client is unknown.
	fn save_client_token<'a>(
		&'a self,
		client_id: &'a ClientId,
		token: ClientAccessToken,
	) -> StoreFuture<'a, bool>;

	/// Persists or replaces a scope grant keyed by client id and scope string.
	fn save_scope_grant(&self, grant: ScopeGrant) -> StoreFuture<'_, ()>;

	/// Lists every scope granted to the client, ascending by scope string.
	fn list_scope_grants<'a>(&'a self, client_id: &'a ClientId)
	-> StoreFuture<'a, Vec<ScopeGrant>>;

	/// Fetches the cached response for the client + request digest pair.
	///
	/// Entries whose expiry is at or before `now` are absent.
	fn fetch_cached_response<'a>(
		&'a self,
		client_id: &'a ClientId,
		request_hash: &'a str,
		now: OffsetDateTime,
	) -> StoreFuture<'a, Option<CachedTokenResponse>>;

	/// Persists or replaces a cached response; the last write wins.
	fn save_cached_response(&self, response: CachedTokenResponse) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`GatewayStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures (e.g., serde) surfaced by the backend.
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

/// Unique key identifying a cached token response.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
	/// Client the cached response belongs to.
	pub client_id: ClientId,
	/// Request digest component.
	pub request_hash: String,
}
impl CacheKey {
	/// Builds a key from the client id and request digest.
	pub fn new(client_id: &ClientId, request_hash: &str) -> Self {
		Self { client_id: client_id.clone(), request_hash: request_hash.to_owned() }
	}

	/// Builds the key identifying a stored cached response.
	pub fn of(response: &CachedTokenResponse) -> Self {
		Self::new(&response.client_id, &response.request_hash)
	}
}

/// Unique key identifying a scope grant.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GrantKey {
	/// Client the grant belongs to.
	pub client_id: ClientId,
	/// Granted scope component.
	pub scope: String,
}
impl GrantKey {
	/// Builds a key from the client id and scope string.
	pub fn new(client_id: &ClientId, scope: &str) -> Self {
		Self { client_id: client_id.clone(), scope: scope.to_owned() }
	}

	/// Builds the key identifying a stored grant.
	pub fn of(grant: &ScopeGrant) -> Self {
		Self::new(&grant.client_id, &grant.scope)
	}
}
