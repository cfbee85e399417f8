#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
use url::Url;
// self
use oauth2_gateway::{
	config::GatewayConfig,
	error::UpstreamError,
	gateway::{TokenBody, TokenGateway, TokenRequest},
	hash::SecretSalt,
	registry::{ClientRegistrar, NewClient},
	store::{GatewayStore, MemoryStore},
	upstream::{ClientMetadata, HttpUpstreamExchange, UpstreamExchange},
};

const SALT: &str = "http-salt";

fn build_config(server: &MockServer) -> GatewayConfig {
	GatewayConfig::builder()
		.storage_table("gateway-clients")
		.token_endpoint(
			Url::parse(&server.url("/token")).expect("Mock token endpoint should parse."),
		)
		.broker_client_id("broker-id")
		.broker_client_secret("broker-secret")
		.secret_salt(SALT)
		.build()
		.expect("Gateway configuration fixture should validate.")
}

fn build_exchange(server: &MockServer) -> HttpUpstreamExchange {
	HttpUpstreamExchange::new(&build_config(server))
		.expect("Building the HTTP exchange should succeed.")
}

#[tokio::test]
async fn exchange_decodes_successful_payloads() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"upstream-token\",\"token_type\":\"Bearer\",\"expires_in\":1800}",
			);
		})
		.await;
	let exchange = build_exchange(&server);
	let metadata = ClientMetadata { client_id: "caller-1".into(), scope: "read write".into() };
	let token = exchange.exchange(&metadata).await.expect("The exchange should succeed.");

	assert_eq!(token.access_token.expose(), "upstream-token");
	assert_eq!(token.token_type.as_deref(), Some("Bearer"));
	assert_eq!(token.expires_in, 1_800);

	mock.assert_async().await;
}

#[tokio::test]
async fn error_statuses_surface_with_their_bodies() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(503).body("upstream down");
		})
		.await;
	let exchange = build_exchange(&server);
	let metadata = ClientMetadata { client_id: "caller-2".into(), scope: "read".into() };
	let err = exchange
		.exchange(&metadata)
		.await
		.expect_err("A 503 response should surface as an error.");

	match err {
		UpstreamError::Status { status, body } => {
			assert_eq!(status, 503);
			assert_eq!(body, "upstream down");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn malformed_bodies_surface_as_decode_errors() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body("not json");
		})
		.await;
	let exchange = build_exchange(&server);
	let metadata = ClientMetadata { client_id: "caller-3".into(), scope: "read".into() };
	let err = exchange
		.exchange(&metadata)
		.await
		.expect_err("A malformed body should surface as an error.");

	assert!(matches!(err, UpstreamError::MalformedBody { status: 200, .. }));
}

#[tokio::test]
async fn non_positive_lifetimes_are_rejected() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"x\",\"expires_in\":0}");
		})
		.await;
	let exchange = build_exchange(&server);
	let metadata = ClientMetadata { client_id: "caller-4".into(), scope: "read".into() };
	let err = exchange
		.exchange(&metadata)
		.await
		.expect_err("A zero lifetime should surface as an error.");

	assert!(matches!(err, UpstreamError::NonPositiveExpiresIn));
}

#[tokio::test]
async fn gateway_issues_and_caches_over_http() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"cached-token\",\"token_type\":\"Bearer\",\"expires_in\":1800}",
			);
		})
		.await;
	let store: Arc<dyn GatewayStore> = Arc::new(MemoryStore::default());
	let registrar = ClientRegistrar::new(store.clone(), SecretSalt::new(SALT));
	let credentials = registrar
		.register_client(NewClient {
			client_name: "HTTP Client".into(),
			team: "platform".into(),
			service: "http".into(),
			expire_date: OffsetDateTime::now_utc() + Duration::days(30),
		})
		.await
		.expect("Client registration should succeed.");

	registrar
		.grant_scope(&credentials.client_id, "read")
		.await
		.expect("Scope grant should succeed.");

	let gateway = TokenGateway::new(build_config(&server), store)
		.expect("Building the gateway should succeed.");
	let request = TokenRequest::client_credentials()
		.credentials(credentials.client_id.to_string(), credentials.client_secret.expose())
		.scope("read");
	let first = gateway.handle_token_request(request.clone()).await;
	let second = gateway.handle_token_request(request).await;

	assert_eq!(first.status, 200);
	assert_eq!(second.status, 200);

	for response in [&first, &second] {
		match &response.body {
			TokenBody::Issued(success) => {
				assert_eq!(success.access_token.expose(), "cached-token");
				assert_eq!(success.token_type, "Bearer");
			},
			TokenBody::Failed { status } => panic!("Expected an issued token, got: {status}."),
		}
	}

	mock.assert_calls_async(1).await;
}
