//! OAuth 2.0 client_credentials token gateway—validate clients against your own registry,
//! enforce per-client scopes, and cache issued tokens in front of an upstream identity provider.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod hash;
pub mod obs;
pub mod registry;
pub mod route;
pub mod store;
pub mod upstream;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience fixtures for tests; enabled via `cfg(test)` or the `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::auth::{CachedTokenResponse, ClientId, ClientRecord, ScopeGrant, TokenSecret};

	/// Builds a client record fixture with the provided secret digest and no embedded token.
	pub fn sample_client_record(
		client_id: &ClientId,
		client_secret_hash: impl Into<String>,
		now: OffsetDateTime,
	) -> ClientRecord {
		ClientRecord {
			client_id: client_id.clone(),
			client_secret_hash: client_secret_hash.into(),
			client_name: "Sample Client".into(),
			team: "platform".into(),
			service: "sample".into(),
			expire_date: now + Duration::days(90),
			expire_date_epoch: (now + Duration::days(90)).unix_timestamp(),
			access_token: None,
			created_at: now,
			updated_at: now,
		}
	}

	/// Builds a scope grant fixture for the client.
	pub fn sample_scope_grant(client_id: &ClientId, scope: &str, now: OffsetDateTime) -> ScopeGrant {
		ScopeGrant {
			client_id: client_id.clone(),
			scope: scope.to_owned(),
			created_at: now,
			updated_at: now,
		}
	}

	/// Builds a cached response fixture that stays live for an hour.
	pub fn sample_cached_response(
		client_id: &ClientId,
		request_hash: &str,
		scope: &str,
		now: OffsetDateTime,
	) -> CachedTokenResponse {
		CachedTokenResponse::issued(
			client_id.clone(),
			request_hash,
			scope,
			TokenSecret::new("sample-cached-token"),
			3_600,
			now,
		)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
