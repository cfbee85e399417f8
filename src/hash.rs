//! Keyed hashing and identifier generation primitives.
//!
//! Every digest the gateway derives is an HMAC-SHA256 keyed by the deployment's
//! [`SecretSalt`], hex encoded. Secret digests, response-cache keys, and the
//! digests attached to freshly generated identifiers all share the same
//! primitive so a stored digest can always be recomputed from the raw inputs.

// crates.io
use hmac::{Hmac, Mac};
use rand::{Rng, distr::Alphanumeric};
use sha2::Sha256;
// self
use crate::_prelude::*;

type HmacSha256 = Hmac<Sha256>;

/// Redacted salt keying every digest the gateway produces.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretSalt(String);
impl SecretSalt {
	/// Wraps a new salt string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner salt value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for SecretSalt {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SecretSalt").field(&"<redacted>").finish()
	}
}
impl Display for SecretSalt {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Freshly generated identifier together with its digest under the generating salt.
#[derive(Clone)]
pub struct GeneratedIdentifier {
	/// Raw identifier material. Treat it as a secret until it is delivered.
	pub value: String,
	/// Hex digest of `value`.
	pub hash: String,
}
impl Debug for GeneratedIdentifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GeneratedIdentifier")
			.field("value", &"<redacted>")
			.field("hash", &self.hash)
			.finish()
	}
}

/// Computes the keyed digest of `input` under `salt` as lowercase hex.
pub fn secret_hash(salt: &SecretSalt, input: &str) -> String {
	let mut mac = HmacSha256::new_from_slice(salt.expose().as_bytes())
		.expect("HMAC accepts a key of any size.");

	mac.update(input.as_bytes());

	hex::encode(mac.finalize().into_bytes())
}

/// Derives the response-cache key for a credential pair and scope string.
///
/// `scope` must already be the space-joined requested scopes in request order;
/// changing any component yields a different key.
pub fn request_cache_key(
	salt: &SecretSalt,
	client_id: &str,
	client_secret: &str,
	scope: &str,
) -> String {
	secret_hash(salt, &format!("{client_id}{client_secret}{scope}"))
}

/// Generates a `length`-character alphanumeric identifier from a cryptographically
/// secure generator, along with its digest under `salt`.
pub fn generate_identifier(salt: &SecretSalt, length: usize) -> GeneratedIdentifier {
	let value: String =
		rand::rng().sample_iter(Alphanumeric).take(length).map(char::from).collect();
	let hash = secret_hash(salt, &value);

	GeneratedIdentifier { value, hash }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn salt() -> SecretSalt {
		SecretSalt::new("unit-test-salt")
	}

	#[test]
	fn secret_hash_is_deterministic_lowercase_hex() {
		let digest = secret_hash(&salt(), "material");

		assert_eq!(digest, secret_hash(&salt(), "material"));
		assert_eq!(digest.len(), 64);
		assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
	}

	#[test]
	fn secret_hash_tracks_salt_and_input() {
		assert_ne!(secret_hash(&salt(), "material"), secret_hash(&salt(), "other-material"));
		assert_ne!(
			secret_hash(&salt(), "material"),
			secret_hash(&SecretSalt::new("other-salt"), "material"),
		);
	}

	#[test]
	fn request_cache_key_tracks_every_component() {
		let key = request_cache_key(&salt(), "client", "secret", "read write");

		assert_eq!(key, request_cache_key(&salt(), "client", "secret", "read write"));
		assert_ne!(key, request_cache_key(&salt(), "client-2", "secret", "read write"));
		assert_ne!(key, request_cache_key(&salt(), "client", "secret-2", "read write"));
		assert_ne!(key, request_cache_key(&salt(), "client", "secret", "write read"));
	}

	#[test]
	fn generated_identifiers_are_alphanumeric_with_matching_digest() {
		let generated = generate_identifier(&salt(), 26);

		assert_eq!(generated.value.len(), 26);
		assert!(generated.value.chars().all(|c| c.is_ascii_alphanumeric()));
		assert_eq!(generated.hash, secret_hash(&salt(), &generated.value));
	}

	#[test]
	fn formatters_redact_sensitive_material() {
		let salt = SecretSalt::new("super-secret");

		assert_eq!(format!("{salt:?}"), "SecretSalt(\"<redacted>\")");
		assert_eq!(format!("{salt}"), "<redacted>");

		let generated = generate_identifier(&salt, 8);
		let rendered = format!("{generated:?}");

		assert!(!rendered.contains(&generated.value));
		assert!(rendered.contains(&generated.hash));
	}
}
