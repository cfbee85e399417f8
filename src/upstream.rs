//! Upstream token-endpoint exchange.
//!
//! Every exchange is performed with the gateway's fixed broker identity; the
//! originating caller travels in a metadata form parameter instead of its own
//! credentials.

// crates.io
#[cfg(feature = "reqwest")] use reqwest::redirect::Policy;
// self
use crate::{_prelude::*, auth::TokenSecret, error::UpstreamError};
#[cfg(feature = "reqwest")]
use crate::{config::GatewayConfig, error::ConfigError};

#[cfg(feature = "reqwest")] const FORM_CLIENT_ID: &str = "client_id";
#[cfg(feature = "reqwest")] const FORM_CLIENT_METADATA: &str = "aws_client_metadata";
#[cfg(feature = "reqwest")] const FORM_CLIENT_SECRET: &str = "client_secret";
#[cfg(feature = "reqwest")] const FORM_GRANT_TYPE: &str = "grant_type";
#[cfg(feature = "reqwest")] const GRANT_CLIENT_CREDENTIALS: &str = "client_credentials";

/// Future type returned by upstream exchanges.
pub type UpstreamFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, UpstreamError>> + 'a + Send>>;

/// Upstream token-endpoint contract implemented by exchange transports.
pub trait UpstreamExchange
where
	Self: Send + Sync,
{
	/// Exchanges the caller metadata for a fresh upstream token.
	fn exchange<'a>(&'a self, metadata: &'a ClientMetadata) -> UpstreamFuture<'a, UpstreamToken>;
}

/// Caller identity forwarded alongside the broker credentials.
#[derive(Clone, Debug, Serialize)]
pub struct ClientMetadata {
	/// Originating caller's client id.
	#[serde(rename = "clientId")]
	pub client_id: String,
	/// Effective scope string the token is issued for.
	pub scope: String,
}

/// Token payload decoded from a successful upstream response.
#[derive(Clone, Debug, Deserialize)]
pub struct UpstreamToken {
	/// Issued access token secret.
	pub access_token: TokenSecret,
	/// Token type advertised by the endpoint, when present.
	#[serde(default)]
	pub token_type: Option<String>,
	/// Token lifetime in seconds.
	pub expires_in: i64,
}

/// Reqwest-backed [`UpstreamExchange`] talking to a single token endpoint.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct HttpUpstreamExchange {
	client: ReqwestClient,
	token_endpoint: Url,
	broker_client_id: String,
	broker_client_secret: TokenSecret,
}
#[cfg(feature = "reqwest")]
impl HttpUpstreamExchange {
	/// Builds an exchange with a fresh HTTP client derived from the configuration.
	///
	/// Token requests never follow redirects; endpoints answer directly instead of
	/// delegating to another URI.
	pub fn new(config: &GatewayConfig) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(config.upstream_timeout.unsigned_abs())
			.redirect(Policy::none())
			.build()?;

		Ok(Self::with_client(client, config))
	}

	/// Wraps an existing reqwest client, keeping the endpoint and identity from the
	/// configuration.
	pub fn with_client(client: ReqwestClient, config: &GatewayConfig) -> Self {
		Self {
			client,
			token_endpoint: config.token_endpoint.clone(),
			broker_client_id: config.broker_client_id.clone(),
			broker_client_secret: config.broker_client_secret.clone(),
		}
	}
}
#[cfg(feature = "reqwest")]
impl UpstreamExchange for HttpUpstreamExchange {
	fn exchange<'a>(&'a self, metadata: &'a ClientMetadata) -> UpstreamFuture<'a, UpstreamToken> {
		Box::pin(async move {
			let encoded = serde_json::to_string(metadata)?;
			let form = [
				(FORM_GRANT_TYPE, GRANT_CLIENT_CREDENTIALS),
				(FORM_CLIENT_ID, self.broker_client_id.as_str()),
				(FORM_CLIENT_SECRET, self.broker_client_secret.expose()),
				(FORM_CLIENT_METADATA, encoded.as_str()),
			];
			let response =
				self.client.post(self.token_endpoint.clone()).form(&form).send().await?;
			let status = response.status();
			let body = response.text().await?;

			if !status.is_success() {
				return Err(UpstreamError::Status { status: status.as_u16(), body });
			}

			let mut deserializer = serde_json::Deserializer::from_str(&body);
			let token: UpstreamToken = serde_path_to_error::deserialize(&mut deserializer)
				.map_err(|source| UpstreamError::MalformedBody {
					source,
					status: status.as_u16(),
				})?;

			if token.expires_in <= 0 {
				return Err(UpstreamError::NonPositiveExpiresIn);
			}

			Ok(token)
		})
	}
}
