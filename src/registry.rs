//! Administrative client registration and scope management.

// self
use crate::{
	_prelude::*,
	auth::{ClientAccessToken, ClientId, ClientRecord, ScopeGrant, ScopeList, TokenSecret},
	error::ConfigError,
	hash::{self, SecretSalt},
	store::GatewayStore,
};

/// Generated client id length in characters.
pub const CLIENT_ID_LEN: usize = 26;
/// Generated client secret length in characters.
pub const CLIENT_SECRET_LEN: usize = 51;

/// Registration request for a new gateway client.
#[derive(Clone, Debug)]
pub struct NewClient {
	/// Human-readable client name.
	pub client_name: String,
	/// Owning team.
	pub team: String,
	/// Service the client belongs to.
	pub service: String,
	/// Registration expiry instant.
	pub expire_date: OffsetDateTime,
}

/// Credential material returned exactly once at registration time.
#[derive(Clone, Debug)]
pub struct IssuedCredentials {
	/// Generated client identifier.
	pub client_id: ClientId,
	/// Generated client secret; storage keeps only its digest.
	pub client_secret: TokenSecret,
}

/// Administrative registrar issuing client credentials and scope grants.
#[derive(Clone)]
pub struct ClientRegistrar {
	store: Arc<dyn GatewayStore>,
	salt: SecretSalt,
}
impl ClientRegistrar {
	/// Creates a registrar over the shared store.
	pub fn new(store: Arc<dyn GatewayStore>, salt: SecretSalt) -> Self {
		Self { store, salt }
	}

	/// Registers a new client and returns its credential material.
	///
	/// The plaintext secret exists only in the returned value; the persisted
	/// record carries the keyed digest.
	pub async fn register_client(&self, request: NewClient) -> Result<IssuedCredentials> {
		let id = hash::generate_identifier(&self.salt, CLIENT_ID_LEN);
		let secret = hash::generate_identifier(&self.salt, CLIENT_SECRET_LEN);
		let client_id = ClientId::new(&id.value).map_err(ConfigError::from)?;
		let now = OffsetDateTime::now_utc();
		let record = ClientRecord {
			client_id: client_id.clone(),
			client_secret_hash: secret.hash,
			client_name: request.client_name,
			team: request.team,
			service: request.service,
			expire_date: request.expire_date,
			expire_date_epoch: request.expire_date.unix_timestamp(),
			access_token: None,
			created_at: now,
			updated_at: now,
		};

		self.store.save_client(record).await?;

		Ok(IssuedCredentials { client_id, client_secret: TokenSecret::new(secret.value) })
	}

	/// Grants a single scope to the client, upserting any existing row.
	pub async fn grant_scope(&self, client_id: &ClientId, scope: &str) -> Result<ScopeGrant> {
		ScopeList::new([scope]).map_err(ConfigError::from)?;

		let now = OffsetDateTime::now_utc();
		let grant = ScopeGrant {
			client_id: client_id.clone(),
			scope: scope.to_owned(),
			created_at: now,
			updated_at: now,
		};

		self.store.save_scope_grant(grant.clone()).await?;

		Ok(grant)
	}

	/// Records an upstream token on the client record.
	///
	/// Returns `false` when the client is unknown.
	pub async fn record_client_token(
		&self,
		client_id: &ClientId,
		token: ClientAccessToken,
	) -> Result<bool> {
		Ok(self.store.save_client_token(client_id, token).await?)
	}

	/// Fetches the stored record for inspection.
	pub async fn client(&self, client_id: &ClientId) -> Result<Option<ClientRecord>> {
		Ok(self.store.fetch_client(client_id).await?)
	}
}
impl Debug for ClientRegistrar {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientRegistrar").field("salt", &self.salt).finish_non_exhaustive()
	}
}
