//! Token issuance pipeline for the client_credentials gateway.
//!
//! The gateway validates callers against its own client registry, enforces
//! granted scopes, and serves tokens from two caches before falling back to a
//! fresh upstream exchange performed with the fixed broker identity. Requests
//! that fail map onto a small set of generic wire messages; operator detail
//! stays in logs.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	auth::{CachedTokenResponse, ClientId, ScopeList, TokenSecret},
	config::GatewayConfig,
	error::{AuthenticationError, ConfigError, ValidationError},
	hash,
	obs::{self, RequestOutcome, RequestSpan, TokenSource},
	route::{RouteFuture, RouteHandler},
	store::GatewayStore,
	upstream::{ClientMetadata, UpstreamExchange},
};
#[cfg(feature = "reqwest")] use crate::upstream::HttpUpstreamExchange;

/// The only grant type the gateway issues.
pub const SUPPORTED_GRANT: &str = "client_credentials";
/// Token type reported on every success response.
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

const MSG_CREDENTIALS: &str = "Credentials not provided";
const MSG_GRANT_TYPE: &str = "grant_type not supported";
const MSG_INVALID_CLIENT: &str = "Invalid client credentials";
const MSG_INVALID_SCOPE: &str = "Invalid scope";
const MSG_TOKEN_FAILED: &str = "Failed to get access token";

/// Inbound token request fields, decoupled from any HTTP framework.
#[derive(Clone, Default)]
pub struct TokenRequest {
	/// Requested grant type exactly as supplied.
	pub grant_type: Option<String>,
	/// Explicit client id form field.
	pub client_id: Option<String>,
	/// Explicit client secret form field.
	pub client_secret: Option<TokenSecret>,
	/// Requested scope string, space-delimited.
	pub scope: Option<String>,
	/// Raw Authorization header value, if the caller sent one.
	pub authorization: Option<String>,
}
impl TokenRequest {
	/// Creates an empty request.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a request preset with the supported grant type.
	pub fn client_credentials() -> Self {
		Self { grant_type: Some(SUPPORTED_GRANT.into()), ..Self::default() }
	}

	/// Sets the grant type field.
	pub fn grant_type(mut self, value: impl Into<String>) -> Self {
		self.grant_type = Some(value.into());

		self
	}

	/// Sets the explicit credential fields.
	pub fn credentials(
		mut self,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		self.client_id = Some(client_id.into());
		self.client_secret = Some(TokenSecret::new(client_secret));

		self
	}

	/// Sets the raw Authorization header value.
	pub fn authorization(mut self, value: impl Into<String>) -> Self {
		self.authorization = Some(value.into());

		self
	}

	/// Sets the requested scope string.
	pub fn scope(mut self, value: impl Into<String>) -> Self {
		self.scope = Some(value.into());

		self
	}
}
impl Debug for TokenRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRequest")
			.field("grant_type", &self.grant_type)
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.field("scope", &self.scope)
			.field("authorization", &self.authorization.as_ref().map(|_| "<redacted>"))
			.finish()
	}
}

/// Success payload returned on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSuccess {
	/// Issued access token.
	pub access_token: TokenSecret,
	/// Remaining token lifetime in whole seconds.
	pub expires_in: i64,
	/// Token type; always `Bearer`.
	pub token_type: String,
}

/// Wire body for token responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenBody {
	/// Issued token payload.
	Issued(TokenSuccess),
	/// Failure payload carrying a generic status message.
	Failed {
		/// Caller-facing message; never includes upstream details.
		status: String,
	},
}

/// Complete wire response with the HTTP status code it should be served with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body.
	pub body: TokenBody,
}
impl TokenResponse {
	/// Builds a failure response with the provided status code and message.
	pub fn failed(status: u16, message: impl Into<String>) -> Self {
		Self { status, body: TokenBody::Failed { status: message.into() } }
	}

	/// Returns `true` for 2xx responses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

struct IssuedToken {
	access_token: TokenSecret,
	expires_in: i64,
	source: TokenSource,
}

/// Orchestrates the token pipeline over a store and an upstream exchange.
///
/// The pipeline validates the grant type, resolves caller credentials from
/// explicit fields or the Basic authorization header, authenticates against the
/// client registry, enforces granted scopes, and only then consults the token
/// lanes.
#[derive(Clone)]
pub struct TokenGateway {
	/// Static configuration the gateway was built with.
	pub config: GatewayConfig,
	/// Store holding clients, grants, and cached responses.
	pub store: Arc<dyn GatewayStore>,
	/// Upstream exchange transport.
	pub upstream: Arc<dyn UpstreamExchange>,
}
impl TokenGateway {
	/// Creates a gateway that reuses the caller-provided upstream exchange.
	pub fn with_upstream(
		config: GatewayConfig,
		store: Arc<dyn GatewayStore>,
		upstream: Arc<dyn UpstreamExchange>,
	) -> Self {
		Self { config, store, upstream }
	}

	/// Handles a token request end to end, mapping any failure onto the wire.
	///
	/// Issued tokens are served in a fixed precedence: a live response-cache
	/// entry, then a live token embedded in the client record, then a fresh
	/// upstream exchange. The client-record lane ignores the requested scope;
	/// the scope check has already passed by the time the lanes are consulted.
	///
	/// Internal failures are logged inside the request span, which carries the
	/// resolved client id; the wire body stays generic.
	pub async fn handle_token_request(&self, request: TokenRequest) -> TokenResponse {
		let span = RequestSpan::new("token");

		obs::record_request_outcome(RequestOutcome::Attempt);

		let result = span.instrument(self.issue(request, &span)).await;

		match result {
			Ok(issued) => {
				obs::record_request_outcome(RequestOutcome::Success);
				obs::record_token_source(issued.source);

				TokenResponse {
					status: 200,
					body: TokenBody::Issued(TokenSuccess {
						access_token: issued.access_token,
						expires_in: issued.expires_in,
						token_type: TOKEN_TYPE_BEARER.into(),
					}),
				}
			},
			Err(error) => {
				let response = Self::response_for_error(&error);

				if response.status >= 500 {
					obs::record_request_outcome(RequestOutcome::Failure);

					let _guard = span.entered();

					obs::record_request_error(&error);
				} else {
					obs::record_request_outcome(RequestOutcome::Rejected);
				}

				response
			},
		}
	}

	async fn issue(&self, request: TokenRequest, span: &RequestSpan) -> Result<IssuedToken> {
		if request.grant_type.as_deref() != Some(SUPPORTED_GRANT) {
			return Err(ValidationError::UnsupportedGrantType.into());
		}

		let (client_id_raw, client_secret) = Self::resolve_credentials(&request)?;
		// Malformed identifiers behave exactly like unknown ones.
		let client_id =
			ClientId::new(&client_id_raw).map_err(|_| AuthenticationError::InvalidCredentials)?;

		span.record_client(&client_id);

		let requested = ScopeList::from_request(request.scope.as_deref().unwrap_or_default());
		let scope_string = requested.joined();
		let salt = &self.config.secret_salt;
		let secret_hash = hash::secret_hash(salt, client_secret.expose());
		let request_hash =
			hash::request_cache_key(salt, &client_id, client_secret.expose(), &scope_string);
		let now = OffsetDateTime::now_utc();
		let (client, grants, cached) = tokio::join!(
			self.store.fetch_client_by_credentials(&client_id, &secret_hash),
			self.store.list_scope_grants(&client_id),
			self.store.fetch_cached_response(&client_id, &request_hash, now),
		);
		let client = client?.ok_or(AuthenticationError::InvalidCredentials)?;
		let grants = grants?;
		// Cache reads are best-effort; a failure is just a miss.
		let cached = cached.unwrap_or_else(|error| {
			obs::record_store_degraded("cache_read", &error);

			None
		});
		let granted = ScopeList::new(grants.iter().map(|grant| grant.scope.clone()))
			.map_err(ConfigError::from)?;

		if !requested.is_subset_of(&granted) {
			return Err(ValidationError::ScopeNotGranted.into());
		}
		if let Some(hit) = cached {
			return Ok(IssuedToken {
				expires_in: hit.remaining_seconds_at(now),
				access_token: hit.access_token,
				source: TokenSource::ResponseCache,
			});
		}
		if let Some(token) = client.access_token.filter(|token| token.is_live_at(now)) {
			return Ok(IssuedToken {
				expires_in: token.remaining_seconds_at(now),
				access_token: token.access_token,
				source: TokenSource::ClientRecord,
			});
		}

		let effective_scope =
			if requested.is_empty() { granted.joined() } else { scope_string.clone() };
		let metadata =
			ClientMetadata { client_id: client_id.to_string(), scope: effective_scope.clone() };
		let token = self.upstream.exchange(&metadata).await?;
		let response = CachedTokenResponse::issued(
			client_id,
			request_hash,
			effective_scope,
			token.access_token.clone(),
			token.expires_in,
			now,
		);

		if let Err(error) = self.store.save_cached_response(response).await {
			obs::record_store_degraded("cache_write", &error);
		}

		Ok(IssuedToken {
			access_token: token.access_token,
			expires_in: token.expires_in,
			source: TokenSource::Upstream,
		})
	}

	fn resolve_credentials(
		request: &TokenRequest,
	) -> Result<(String, TokenSecret), ValidationError> {
		Self::explicit_credentials(request)
			.or_else(|| Self::basic_credentials(request))
			.ok_or(ValidationError::CredentialsNotProvided)
	}

	fn explicit_credentials(request: &TokenRequest) -> Option<(String, TokenSecret)> {
		let client_id = request.client_id.as_deref().filter(|id| !id.is_empty())?;
		let client_secret =
			request.client_secret.as_ref().filter(|secret| !secret.expose().is_empty())?;

		Some((client_id.to_owned(), client_secret.clone()))
	}

	fn basic_credentials(request: &TokenRequest) -> Option<(String, TokenSecret)> {
		let header = request.authorization.as_deref()?;
		let encoded = header.strip_prefix("Basic ")?;
		let decoded = STANDARD.decode(encoded.trim()).ok()?;
		let text = String::from_utf8(decoded).ok()?;
		let (client_id, client_secret) = text.split_once(':')?;

		if client_id.is_empty() || client_secret.is_empty() {
			return None;
		}

		Some((client_id.to_owned(), TokenSecret::new(client_secret)))
	}

	fn response_for_error(error: &Error) -> TokenResponse {
		match error {
			Error::Validation(ValidationError::UnsupportedGrantType) =>
				TokenResponse::failed(400, MSG_GRANT_TYPE),
			Error::Validation(ValidationError::CredentialsNotProvided) =>
				TokenResponse::failed(400, MSG_CREDENTIALS),
			Error::Validation(ValidationError::ScopeNotGranted) =>
				TokenResponse::failed(400, MSG_INVALID_SCOPE),
			Error::Authentication(AuthenticationError::InvalidCredentials) =>
				TokenResponse::failed(401, MSG_INVALID_CLIENT),
			Error::Storage(_) | Error::Config(_) | Error::Upstream(_) =>
				TokenResponse::failed(500, MSG_TOKEN_FAILED),
		}
	}
}
#[cfg(feature = "reqwest")]
impl TokenGateway {
	/// Creates a gateway that provisions its own reqwest-backed upstream exchange.
	pub fn new(config: GatewayConfig, store: Arc<dyn GatewayStore>) -> Result<Self, ConfigError> {
		let upstream = HttpUpstreamExchange::new(&config)?;

		Ok(Self::with_upstream(config, store, Arc::new(upstream)))
	}
}
impl Debug for TokenGateway {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenGateway").field("config", &self.config).finish_non_exhaustive()
	}
}
impl RouteHandler for TokenGateway {
	fn handle<'a>(&'a self, request: TokenRequest) -> RouteFuture<'a> {
		Box::pin(self.handle_token_request(request))
	}
}
