//! Secret wrapper and persisted gateway records for clients, scope grants, and
//! cached tokens.

// self
use crate::{_prelude::*, auth::id::ClientId};

/// Secret material moving through the gateway: caller client secrets on
/// requests and bearer tokens at rest.
///
/// Both formatters render a fixed placeholder; the plaintext only leaves
/// through [`Self::expose`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps the plaintext secret.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the plaintext for hashing, comparison, or a wire body. Never log it.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Upstream-issued access token embedded in a client record.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAccessToken {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Expiry instant derived from the issuing clock plus `expires_in`.
	#[serde(with = "time::serde::rfc3339")]
	pub expire_date: OffsetDateTime,
	/// Expiry instant as unix seconds, mirroring `expire_date`.
	pub expire_date_epoch: i64,
	/// Upstream-reported lifetime in seconds at issue time.
	pub expires_in: i64,
}
impl ClientAccessToken {
	/// Stamps a freshly issued token with its expiry bookkeeping.
	pub fn issued(access_token: TokenSecret, expires_in: i64, now: OffsetDateTime) -> Self {
		let expire_date = now + Duration::seconds(expires_in);

		Self { access_token, expire_date, expire_date_epoch: expire_date.unix_timestamp(), expires_in }
	}

	/// Returns `true` while the expiry instant is strictly in the future.
	///
	/// A token whose expiry equals `instant` is already dead.
	pub fn is_live_at(&self, instant: OffsetDateTime) -> bool {
		self.expire_date > instant
	}

	/// Remaining lifetime in whole seconds at the provided instant.
	pub fn remaining_seconds_at(&self, instant: OffsetDateTime) -> i64 {
		(self.expire_date - instant).whole_seconds()
	}
}
impl Debug for ClientAccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientAccessToken")
			.field("access_token", &"<redacted>")
			.field("expire_date", &self.expire_date)
			.field("expire_date_epoch", &self.expire_date_epoch)
			.field("expires_in", &self.expires_in)
			.finish()
	}
}

/// Registered client identity as persisted by the gateway.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
	/// Public client identifier.
	pub client_id: ClientId,
	/// Keyed digest of the client secret; the plaintext is never stored.
	pub client_secret_hash: String,
	/// Human-readable client name supplied at registration.
	pub client_name: String,
	/// Owning team recorded at registration.
	pub team: String,
	/// Service the client belongs to.
	pub service: String,
	/// Registration expiry instant. Informational; token issuance does not check it.
	#[serde(with = "time::serde::rfc3339")]
	pub expire_date: OffsetDateTime,
	/// Registration expiry as unix seconds, mirroring `expire_date`.
	pub expire_date_epoch: i64,
	/// Most recently recorded upstream token, if any.
	pub access_token: Option<ClientAccessToken>,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	/// Last-modification instant.
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}
impl Debug for ClientRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientRecord")
			.field("client_id", &self.client_id)
			.field("client_secret_hash", &"<redacted>")
			.field("client_name", &self.client_name)
			.field("team", &self.team)
			.field("service", &self.service)
			.field("expire_date", &self.expire_date)
			.field("access_token", &self.access_token)
			.field("created_at", &self.created_at)
			.field("updated_at", &self.updated_at)
			.finish()
	}
}

/// Single scope granted to a client.
///
/// A client's full grant set is the collection of these rows; each row carries
/// exactly one scope string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeGrant {
	/// Client the grant belongs to.
	pub client_id: ClientId,
	/// Granted scope string.
	pub scope: String,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	/// Last-modification instant.
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}

/// Cached upstream token response keyed by client and request digest.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedTokenResponse {
	/// Client the cached response belongs to.
	pub client_id: ClientId,
	/// Keyed digest over the credentials and requested scope string.
	pub request_hash: String,
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Scope string the token was issued for.
	pub scope: String,
	/// Expiry instant derived from the issuing clock plus `expires_in`.
	#[serde(with = "time::serde::rfc3339")]
	pub expire_date: OffsetDateTime,
	/// Expiry instant as unix seconds, mirroring `expire_date`.
	pub expire_date_epoch: i64,
	/// Upstream-reported lifetime in seconds at issue time.
	pub expires_in: i64,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	/// Last-modification instant.
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}
impl CachedTokenResponse {
	/// Stamps a freshly cached response with its expiry bookkeeping.
	pub fn issued(
		client_id: ClientId,
		request_hash: impl Into<String>,
		scope: impl Into<String>,
		access_token: TokenSecret,
		expires_in: i64,
		now: OffsetDateTime,
	) -> Self {
		let expire_date = now + Duration::seconds(expires_in);

		Self {
			client_id,
			request_hash: request_hash.into(),
			access_token,
			scope: scope.into(),
			expire_date,
			expire_date_epoch: expire_date.unix_timestamp(),
			expires_in,
			created_at: now,
			updated_at: now,
		}
	}

	/// Returns `true` while the expiry instant is strictly in the future.
	pub fn is_live_at(&self, instant: OffsetDateTime) -> bool {
		self.expire_date > instant
	}

	/// Remaining lifetime in whole seconds at the provided instant.
	pub fn remaining_seconds_at(&self, instant: OffsetDateTime) -> i64 {
		(self.expire_date - instant).whole_seconds()
	}
}
impl Debug for CachedTokenResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedTokenResponse")
			.field("client_id", &self.client_id)
			.field("request_hash", &self.request_hash)
			.field("access_token", &"<redacted>")
			.field("scope", &self.scope)
			.field("expire_date", &self.expire_date)
			.field("expire_date_epoch", &self.expire_date_epoch)
			.field("expires_in", &self.expires_in)
			.field("created_at", &self.created_at)
			.field("updated_at", &self.updated_at)
			.finish()
	}
}
