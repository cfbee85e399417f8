// self
use crate::{_prelude::*, store::StoreError};

/// Future type produced by [`RequestSpan::instrument`] when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedRequest<F> = tracing::instrument::Instrumented<F>;
/// The bare future when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedRequest<F> = F;

/// Per-request span carrying the pipeline stage and, once resolved, the
/// caller's client id.
#[derive(Clone, Debug)]
pub struct RequestSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl RequestSpan {
	/// Creates a new span tagged with the provided stage.
	///
	/// The `client_id` field starts empty; [`Self::record_client`] fills it
	/// once credentials resolve.
	pub fn new(stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"oauth2_gateway.request",
				stage,
				client_id = tracing::field::Empty,
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self {}
		}
	}

	/// Attaches the resolved client id to the span.
	///
	/// Requests rejected before credential resolution leave the field empty.
	pub fn record_client(&self, client_id: &str) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("client_id", client_id);
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = client_id;
		}
	}

	/// Enters the span for a synchronous stretch of work.
	pub fn entered(self) -> RequestSpanGuard {
		#[cfg(feature = "tracing")]
		{
			RequestSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			RequestSpanGuard {}
		}
	}

	/// Attaches the span to a future so events emitted inside it inherit the
	/// request context, without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedRequest<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// RAII guard returned by [`RequestSpan::entered`].
pub struct RequestSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for RequestSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("RequestSpanGuard(..)")
	}
}

/// Logs a degraded store interaction the request survived (when enabled).
pub fn record_store_degraded(stage: &'static str, error: &StoreError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(stage, error = %error, "Store interaction degraded.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, error);
	}
}

/// Logs a failed request with its full error chain for operators (when enabled).
///
/// The wire response stays generic; this event is where upstream status codes
/// and bodies become visible.
pub fn record_request_error(error: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::error!(error = ?error, "Token request failed.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = error;
	}
}
