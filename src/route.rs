//! Request routing over path + method pairs.
//!
//! The table is assembled once through [`RouterBuilder`] and immutable
//! afterwards, so clones can be handed to any number of workers without
//! locking.

// self
use crate::{
	_prelude::*,
	gateway::{TokenGateway, TokenRequest, TokenResponse},
};

/// Canonical token endpoint path.
pub const TOKEN_PATH: &str = "/oauth2/token";

/// HTTP-style methods the router distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteMethod {
	/// GET requests.
	Get,
	/// POST requests.
	Post,
	/// PUT requests.
	Put,
	/// DELETE requests.
	Delete,
}
impl RouteMethod {
	/// Returns the canonical upper-case method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			RouteMethod::Get => "GET",
			RouteMethod::Post => "POST",
			RouteMethod::Put => "PUT",
			RouteMethod::Delete => "DELETE",
		}
	}
}
impl Display for RouteMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Key identifying a registered route.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RouteKey {
	/// Route path, matched verbatim.
	pub path: String,
	/// Route method.
	pub method: RouteMethod,
}
impl RouteKey {
	/// Builds a key from the path and method.
	pub fn new(path: impl Into<String>, method: RouteMethod) -> Self {
		Self { path: path.into(), method }
	}
}

/// Future type returned by route handlers.
pub type RouteFuture<'a> = Pin<Box<dyn Future<Output = TokenResponse> + 'a + Send>>;

/// Handler contract invoked for a dispatched request.
pub trait RouteHandler
where
	Self: Send + Sync,
{
	/// Handles one request, always producing a wire response.
	fn handle<'a>(&'a self, request: TokenRequest) -> RouteFuture<'a>;
}

/// Dispatch failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum RouteError {
	/// No handler is registered for the requested pair.
	#[error("No route is registered for {method} {path}.")]
	NotFound {
		/// Requested method.
		method: RouteMethod,
		/// Requested path.
		path: String,
	},
}

/// Immutable routing table shared across workers.
#[derive(Clone, Default)]
pub struct Router {
	routes: HashMap<RouteKey, Arc<dyn RouteHandler>>,
}
impl Router {
	/// Returns a builder for assembling the routing table.
	pub fn builder() -> RouterBuilder {
		RouterBuilder::default()
	}

	/// Builds the canonical table with the token gateway mounted at [`TOKEN_PATH`].
	pub fn with_token_gateway(gateway: Arc<TokenGateway>) -> Self {
		Self::builder().route(TOKEN_PATH, RouteMethod::Post, gateway).build()
	}

	/// Returns `true` when a handler is registered for the pair.
	pub fn has_route(&self, path: &str, method: RouteMethod) -> bool {
		self.routes.contains_key(&RouteKey::new(path, method))
	}

	/// Dispatches one request to the registered handler.
	pub async fn dispatch(
		&self,
		path: &str,
		method: RouteMethod,
		request: TokenRequest,
	) -> Result<TokenResponse, RouteError> {
		let handler = self
			.routes
			.get(&RouteKey::new(path, method))
			.ok_or_else(|| RouteError::NotFound { method, path: path.to_owned() })?;

		Ok(handler.handle(request).await)
	}
}
impl Debug for Router {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Router").field("routes", &self.routes.keys()).finish()
	}
}

/// Builder for [`Router`].
#[derive(Clone, Default)]
pub struct RouterBuilder {
	routes: HashMap<RouteKey, Arc<dyn RouteHandler>>,
}
impl RouterBuilder {
	/// Registers a handler; re-registering a pair replaces the earlier handler.
	pub fn route(
		mut self,
		path: impl Into<String>,
		method: RouteMethod,
		handler: Arc<dyn RouteHandler>,
	) -> Self {
		self.routes.insert(RouteKey::new(path, method), handler);

		self
	}

	/// Consumes the builder and produces the immutable router.
	pub fn build(self) -> Router {
		Router { routes: self.routes }
	}
}
impl Debug for RouterBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RouterBuilder").field("routes", &self.routes.keys()).finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	struct StaticHandler(u16);
	impl RouteHandler for StaticHandler {
		fn handle<'a>(&'a self, _: TokenRequest) -> RouteFuture<'a> {
			let status = self.0;

			Box::pin(async move { TokenResponse::failed(status, "stub") })
		}
	}

	#[tokio::test]
	async fn dispatch_routes_to_the_registered_handler() {
		let router = Router::builder()
			.route(TOKEN_PATH, RouteMethod::Post, Arc::new(StaticHandler(418)))
			.build();

		assert!(router.has_route(TOKEN_PATH, RouteMethod::Post));
		assert!(!router.has_route(TOKEN_PATH, RouteMethod::Get));

		let response = router
			.dispatch(TOKEN_PATH, RouteMethod::Post, TokenRequest::new())
			.await
			.expect("Registered route should dispatch.");

		assert_eq!(response.status, 418);
	}

	#[tokio::test]
	async fn unknown_routes_report_not_found() {
		let router = Router::builder().build();
		let error = router
			.dispatch("/missing", RouteMethod::Get, TokenRequest::new())
			.await
			.expect_err("Unregistered route should fail.");

		assert_eq!(error.to_string(), "No route is registered for GET /missing.");
	}

	#[tokio::test]
	async fn later_registrations_replace_earlier_ones() {
		let router = Router::builder()
			.route(TOKEN_PATH, RouteMethod::Post, Arc::new(StaticHandler(400)))
			.route(TOKEN_PATH, RouteMethod::Post, Arc::new(StaticHandler(503)))
			.build();
		let response = router
			.dispatch(TOKEN_PATH, RouteMethod::Post, TokenRequest::new())
			.await
			.expect("Registered route should dispatch.");

		assert_eq!(response.status, 503);
	}
}
