//! Optional observability helpers for gateway requests.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_gateway.request` with the `stage`
//!   (call site) field, plus warn/error events for degraded store calls and failed requests.
//! - Enable `metrics` to increment the `oauth2_gateway_request_total` counter for every
//!   attempt/success/rejection/failure, and `oauth2_gateway_token_issued_total` labeled by the
//!   lane that served the token.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each token request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// Entry to the token pipeline.
	Attempt,
	/// Token served from any lane.
	Success,
	/// Request refused with a caller-addressable error.
	Rejected,
	/// Internal or upstream failure surfaced as a server error.
	Failure,
}
impl RequestOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Attempt => "attempt",
			RequestOutcome::Success => "success",
			RequestOutcome::Rejected => "rejected",
			RequestOutcome::Failure => "failure",
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Lane that produced an issued token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenSource {
	/// Served from the response cache.
	ResponseCache,
	/// Served from the token embedded in the client record.
	ClientRecord,
	/// Freshly exchanged with the upstream endpoint.
	Upstream,
}
impl TokenSource {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenSource::ResponseCache => "response_cache",
			TokenSource::ClientRecord => "client_record",
			TokenSource::Upstream => "upstream",
		}
	}
}
impl Display for TokenSource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
