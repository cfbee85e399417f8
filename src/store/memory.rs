//! Thread-safe in-memory [`GatewayStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{CachedTokenResponse, ClientAccessToken, ClientId, ClientRecord, ScopeGrant},
	store::{CacheKey, GatewayStore, GrantKey, StoreError, StoreFuture},
};

#[derive(Debug, Default)]
struct State {
	clients: HashMap<ClientId, ClientRecord>,
	grants: BTreeMap<GrantKey, ScopeGrant>,
	cached: HashMap<CacheKey, CachedTokenResponse>,
}

type SharedState = Arc<RwLock<State>>;

/// Thread-safe storage backend that keeps records in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(SharedState);
impl MemoryStore {
	fn save_client_now(state: SharedState, record: ClientRecord) -> Result<(), StoreError> {
		state.write().clients.insert(record.client_id.clone(), record);

		Ok(())
	}

	fn fetch_client_now(state: SharedState, client_id: ClientId) -> Option<ClientRecord> {
		state.read().clients.get(&client_id).cloned()
	}

	fn fetch_by_credentials_now(
		state: SharedState,
		client_id: ClientId,
		client_secret_hash: String,
	) -> Option<ClientRecord> {
		state
			.read()
			.clients
			.get(&client_id)
			.filter(|record| record.client_secret_hash == client_secret_hash)
			.cloned()
	}

	fn save_client_token_now(
		state: SharedState,
		client_id: ClientId,
		token: ClientAccessToken,
	) -> bool {
		match state.write().clients.get_mut(&client_id) {
			Some(record) => {
				record.access_token = Some(token);

				true
			},
			None => false,
		}
	}

	fn save_scope_grant_now(state: SharedState, grant: ScopeGrant) -> Result<(), StoreError> {
		state.write().grants.insert(GrantKey::of(&grant), grant);

		Ok(())
	}

	fn list_scope_grants_now(state: SharedState, client_id: ClientId) -> Vec<ScopeGrant> {
		state
			.read()
			.grants
			.values()
			.filter(|grant| grant.client_id == client_id)
			.cloned()
			.collect()
	}

	fn fetch_cached_now(
		state: SharedState,
		client_id: ClientId,
		request_hash: String,
		now: OffsetDateTime,
	) -> Option<CachedTokenResponse> {
		state
			.read()
			.cached
			.get(&CacheKey::new(&client_id, &request_hash))
			.filter(|hit| hit.is_live_at(now))
			.cloned()
	}

	fn save_cached_now(state: SharedState, response: CachedTokenResponse) -> Result<(), StoreError> {
		state.write().cached.insert(CacheKey::of(&response), response);

		Ok(())
	}
}
impl GatewayStore for MemoryStore {
	fn save_client(&self, record: ClientRecord) -> StoreFuture<'_, ()> {
		let state = self.0.clone();

		Box::pin(async move { Self::save_client_now(state, record) })
	}

	fn fetch_client<'a>(
		&'a self,
		client_id: &'a ClientId,
	) -> StoreFuture<'a, Option<ClientRecord>> {
		let state = self.0.clone();
		let client_id = client_id.to_owned();

		Box::pin(async move { Ok(Self::fetch_client_now(state, client_id)) })
	}

	fn fetch_client_by_credentials<'a>(
		&'a self,
		client_id: &'a ClientId,
		client_secret_hash: &'a str,
	) -> StoreFuture<'a, Option<ClientRecord>> {
		let state = self.0.clone();
		let client_id = client_id.to_owned();
		let client_secret_hash = client_secret_hash.to_owned();

		Box::pin(async move { Ok(Self::fetch_by_credentials_now(state, client_id, client_secret_hash)) })
	}

	fn save_client_token<'a>(
		&'a self,
		client_id: &'a ClientId,
		token: ClientAccessToken,
	) -> StoreFuture<'a, bool> {
		let state = self.0.clone();
		let client_id = client_id.to_owned();

		Box::pin(async move { Ok(Self::save_client_token_now(state, client_id, token)) })
	}

	fn save_scope_grant(&self, grant: ScopeGrant) -> StoreFuture<'_, ()> {
		let state = self.0.clone();

		Box::pin(async move { Self::save_scope_grant_now(state, grant) })
	}

	fn list_scope_grants<'a>(
		&'a self,
		client_id: &'a ClientId,
	) -> StoreFuture<'a, Vec<ScopeGrant>> {
		let state = self.0.clone();
		let client_id = client_id.to_owned();

		Box::pin(async move { Ok(Self::list_scope_grants_now(state, client_id)) })
	}

	fn fetch_cached_response<'a>(
		&'a self,
		client_id: &'a ClientId,
		request_hash: &'a str,
		now: OffsetDateTime,
	) -> StoreFuture<'a, Option<CachedTokenResponse>> {
		let state = self.0.clone();
		let client_id = client_id.to_owned();
		let request_hash = request_hash.to_owned();

		Box::pin(async move { Ok(Self::fetch_cached_now(state, client_id, request_hash, now)) })
	}

	fn save_cached_response(&self, response: CachedTokenResponse) -> StoreFuture<'_, ()> {
		let state = self.0.clone();

		Box::pin(async move { Self::save_cached_now(state, response) })
	}
}
