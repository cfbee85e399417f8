//! Gateway-level error types shared across validation, storage, and the upstream exchange.

// self
use crate::_prelude::*;

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Request rejected before any credential was checked.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Caller credentials failed verification.
	#[error(transparent)]
	Authentication(#[from] AuthenticationError),
	/// Token endpoint exchange failure.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
}

/// Request-shape failures detected before touching storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ValidationError {
	/// The grant_type field is absent or names an unsupported grant.
	#[error("Grant type is missing or unsupported.")]
	UnsupportedGrantType,
	/// Neither explicit fields nor the Basic authorization header carried credentials.
	#[error("Client credentials are missing from the request.")]
	CredentialsNotProvided,
	/// Requested scopes exceed the client's grants.
	#[error("Requested scopes exceed the client's grants.")]
	ScopeNotGranted,
}

/// Credential verification failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum AuthenticationError {
	/// The client is unknown or the secret digest does not match.
	///
	/// Both cases collapse into this one variant so responses cannot reveal
	/// whether a client id exists.
	#[error("Client credentials failed verification.")]
	InvalidCredentials,
}

/// Configuration and validation failures raised by the gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Configuration omitted the upstream token endpoint URL.
	#[error("Token endpoint URL is required.")]
	MissingTokenEndpoint,
	/// Configuration supplied an empty storage table name.
	#[error("Storage table name cannot be empty.")]
	EmptyStorageTable,
	/// Configuration supplied an empty broker client id.
	#[error("Broker client id cannot be empty.")]
	EmptyBrokerClientId,
	/// Configuration supplied an empty broker client secret.
	#[error("Broker client secret cannot be empty.")]
	EmptyBrokerClientSecret,
	/// Configuration supplied an empty secret salt.
	#[error("Secret salt cannot be empty.")]
	EmptySecretSalt,
	/// Configuration supplied a zero or negative upstream timeout.
	#[error("Upstream timeout must be positive.")]
	NonPositiveTimeout,

	/// Client identifier failed validation.
	#[error("Client identifier is invalid.")]
	InvalidIdentifier(#[from] crate::auth::ClientIdError),
	/// Requested scopes cannot be validated.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures raised while exchanging tokens with the upstream endpoint.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// Token endpoint answered with a non-success status.
	#[error("Token endpoint returned HTTP {status}.")]
	Status {
		/// HTTP status code returned by the endpoint.
		status: u16,
		/// Raw response body, kept for operator logs only.
		body: String,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Caller metadata could not be encoded as JSON.
	#[error("Caller metadata could not be encoded.")]
	Metadata(#[from] serde_json::Error),
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	MalformedBody {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code the malformed body arrived with.
		status: u16,
	},
	/// Token endpoint returned a non-positive duration.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
}
impl UpstreamError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for UpstreamError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
