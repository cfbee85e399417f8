//! Static gateway configuration and its validating builder.

// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError, hash::SecretSalt};

/// Default timeout applied to upstream token-endpoint calls.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::seconds(30);

/// Static configuration consumed by the gateway at construction time.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
	/// Logical table/namespace name recorded for the storage backend.
	pub storage_table: String,
	/// Upstream token endpoint URL.
	pub token_endpoint: Url,
	/// Fixed broker identity presented to the upstream endpoint.
	pub broker_client_id: String,
	/// Fixed broker secret presented to the upstream endpoint.
	pub broker_client_secret: TokenSecret,
	/// Keyed-digest salt applied to client secrets and cache keys.
	pub secret_salt: SecretSalt,
	/// Timeout applied to upstream token-endpoint calls.
	pub upstream_timeout: Duration,
}
impl GatewayConfig {
	/// Returns a builder for assembling a validated configuration.
	pub fn builder() -> GatewayConfigBuilder {
		GatewayConfigBuilder::default()
	}
}

/// Builder for [`GatewayConfig`] values.
#[derive(Clone, Debug, Default)]
pub struct GatewayConfigBuilder {
	/// Logical table/namespace name recorded for the storage backend.
	pub storage_table: Option<String>,
	/// Upstream token endpoint URL.
	pub token_endpoint: Option<Url>,
	/// Fixed broker identity presented to the upstream endpoint.
	pub broker_client_id: Option<String>,
	/// Fixed broker secret presented to the upstream endpoint.
	pub broker_client_secret: Option<TokenSecret>,
	/// Keyed-digest salt applied to client secrets and cache keys.
	pub secret_salt: Option<SecretSalt>,
	/// Timeout applied to upstream calls; defaults to [`DEFAULT_UPSTREAM_TIMEOUT`].
	pub upstream_timeout: Option<Duration>,
}
impl GatewayConfigBuilder {
	/// Sets the storage table name.
	pub fn storage_table(mut self, table: impl Into<String>) -> Self {
		self.storage_table = Some(table.into());

		self
	}

	/// Sets the upstream token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the broker client id presented upstream.
	pub fn broker_client_id(mut self, id: impl Into<String>) -> Self {
		self.broker_client_id = Some(id.into());

		self
	}

	/// Sets the broker client secret presented upstream.
	pub fn broker_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.broker_client_secret = Some(TokenSecret::new(secret));

		self
	}

	/// Sets the keyed-digest salt.
	pub fn secret_salt(mut self, salt: impl Into<String>) -> Self {
		self.secret_salt = Some(SecretSalt::new(salt));

		self
	}

	/// Overrides the upstream call timeout.
	pub fn upstream_timeout(mut self, timeout: Duration) -> Self {
		self.upstream_timeout = Some(timeout);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<GatewayConfig, ConfigError> {
		let storage_table = self
			.storage_table
			.filter(|table| !table.is_empty())
			.ok_or(ConfigError::EmptyStorageTable)?;
		let token_endpoint = self.token_endpoint.ok_or(ConfigError::MissingTokenEndpoint)?;
		let broker_client_id = self
			.broker_client_id
			.filter(|id| !id.is_empty())
			.ok_or(ConfigError::EmptyBrokerClientId)?;
		let broker_client_secret = self
			.broker_client_secret
			.filter(|secret| !secret.expose().is_empty())
			.ok_or(ConfigError::EmptyBrokerClientSecret)?;
		let secret_salt = self
			.secret_salt
			.filter(|salt| !salt.expose().is_empty())
			.ok_or(ConfigError::EmptySecretSalt)?;
		let upstream_timeout = self.upstream_timeout.unwrap_or(DEFAULT_UPSTREAM_TIMEOUT);

		if !upstream_timeout.is_positive() {
			return Err(ConfigError::NonPositiveTimeout);
		}

		Ok(GatewayConfig {
			storage_table,
			token_endpoint,
			broker_client_id,
			broker_client_secret,
			secret_salt,
			upstream_timeout,
		})
	}
}
