#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use oauth2_pkce_session::{
	_preludet::*,
	auth::TokenSet,
	config::{ClientAuthMethod, ClientConfig},
	store::{MemoryStore, SessionStore},
};

const CLIENT_ID: &str = "client-resource";
const CLIENT_SECRET: &str = "secret-resource";

fn build_config(server: &MockServer) -> ClientConfig {
	ClientConfig::builder(
		Url::parse(&server.base_url()).expect("Mock server base URL should parse successfully."),
		CLIENT_ID,
		CLIENT_SECRET,
		Url::parse("http://localhost:12345/callback")
			.expect("Redirect URI fixture should parse successfully."),
	)
	.resource_endpoint(
		Url::parse(&server.url("/office")).expect("Resource URL should parse successfully."),
	)
	.auth_method(ClientAuthMethod::ClientSecretPost)
	.build()
	.expect("Client configuration should build successfully.")
}

async fn seed_tokens(store: &MemoryStore, access: &str, refresh: Option<&str>) {
	let mut builder = TokenSet::builder().access_token(access);

	if let Some(value) = refresh {
		builder = builder.refresh_token(value);
	}

	let tokens = builder.build().expect("Token set fixture should build successfully.");

	store.save_tokens(tokens).await.expect("Failed to seed tokens into the store.");
}

#[tokio::test]
async fn resource_fetch_returns_the_raw_json_body() {
	let server = MockServer::start_async().await;
	let (session, store) = build_reqwest_test_session(build_config(&server));

	seed_tokens(&store, "access-valid", Some("refresh-valid")).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/office").header("authorization", "Bearer access-valid");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"office\":\"HQ\"}");
		})
		.await;
	let value = session
		.fetch_protected_resource()
		.await
		.expect("Resource fetch with a valid token should succeed.");

	mock.assert_async().await;

	assert_eq!(value, serde_json::json!({ "office": "HQ" }));
	assert_eq!(session.metrics.resource.attempts(), 1);
	assert_eq!(session.metrics.refresh.attempts(), 0);
}

#[tokio::test]
async fn expired_token_triggers_one_refresh_and_one_retry() {
	let server = MockServer::start_async().await;
	let (session, store) = build_reqwest_test_session(build_config(&server));

	seed_tokens(&store, "access-expired", Some("refresh-valid")).await;

	// The first attempt carries the stale bearer and is rejected; the retry carries the
	// refreshed one and succeeds. Matching on the Authorization header keeps the sequence
	// deterministic.
	let rejected_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/office").header("authorization", "Bearer access-expired");
			then.status(401).header("content-type", "application/json").body("{}");
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"access_token\":\"access-fresh\",\"refresh_token\":\"refresh-next\",\"token_type\":\"bearer\",\"expires_in\":1800}",
				);
		})
		.await;
	let accepted_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/office").header("authorization", "Bearer access-fresh");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"office\":\"HQ\"}");
		})
		.await;
	let value = session
		.fetch_protected_resource()
		.await
		.expect("Resource fetch should succeed after a transparent refresh.");

	rejected_mock.assert_async().await;
	refresh_mock.assert_async().await;
	accepted_mock.assert_async().await;

	assert_eq!(value, serde_json::json!({ "office": "HQ" }));
	assert_eq!(session.metrics.resource.attempts(), 2);
	assert_eq!(session.metrics.refresh.attempts(), 1);

	let stored = store
		.fetch_tokens()
		.await
		.expect("Token store fetch should succeed.")
		.expect("The refreshed token set should be stored.");

	assert_eq!(stored.access_token.expose(), "access-fresh");
}

#[tokio::test]
async fn second_unauthorized_response_is_final() {
	let server = MockServer::start_async().await;
	let (session, store) = build_reqwest_test_session(build_config(&server));

	seed_tokens(&store, "access-rejected", Some("refresh-valid")).await;

	let office_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/office");
			then.status(401).header("content-type", "application/json").body("{}");
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"access_token\":\"access-still-rejected\",\"token_type\":\"bearer\",\"expires_in\":1800}",
				);
		})
		.await;
	let err = session
		.fetch_protected_resource()
		.await
		.expect_err("A second 401 should be terminal.");

	match err {
		Error::ResourceFetchFailed { status, .. } => assert_eq!(status, Some(401)),
		other => panic!("Unexpected error variant: {other:?}."),
	}

	// Exactly one refresh and exactly two resource attempts, never more.
	office_mock.assert_calls_async(2).await;
	refresh_mock.assert_calls_async(1).await;

	assert_eq!(session.metrics.resource.attempts(), 2);
	assert_eq!(session.metrics.refresh.attempts(), 1);
}

#[tokio::test]
async fn failed_refresh_stops_the_resource_flow() {
	let server = MockServer::start_async().await;
	let (session, store) = build_reqwest_test_session(build_config(&server));

	seed_tokens(&store, "access-expired", Some("refresh-dead")).await;

	let office_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/office");
			then.status(401).header("content-type", "application/json").body("{}");
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\"}");
		})
		.await;
	let err = session
		.fetch_protected_resource()
		.await
		.expect_err("A failed refresh should abort the resource flow.");

	assert!(matches!(err, Error::RefreshFailed { .. }));

	office_mock.assert_calls_async(1).await;
	refresh_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn missing_refresh_token_surfaces_as_refresh_failure() {
	let server = MockServer::start_async().await;
	let (session, store) = build_reqwest_test_session(build_config(&server));

	seed_tokens(&store, "access-expired", None).await;

	let office_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/office");
			then.status(401).header("content-type", "application/json").body("{}");
		})
		.await;
	let err = session
		.fetch_protected_resource()
		.await
		.expect_err("A 401 without a refresh token should abort the flow.");

	assert!(matches!(err, Error::RefreshFailed { .. }));

	office_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn fetch_without_tokens_reports_unauthenticated() {
	let server = MockServer::start_async().await;
	let (session, _store) = build_reqwest_test_session(build_config(&server));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/office");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	let err = session
		.fetch_protected_resource()
		.await
		.expect_err("Resource access without tokens should be rejected locally.");

	assert!(matches!(err, Error::Unauthenticated));

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn non_401_failures_are_fatal_without_a_refresh() {
	let server = MockServer::start_async().await;
	let (session, store) = build_reqwest_test_session(build_config(&server));

	seed_tokens(&store, "access-valid", Some("refresh-valid")).await;

	let office_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/office");
			then.status(500).header("content-type", "application/json").body("{}");
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	let err = session
		.fetch_protected_resource()
		.await
		.expect_err("A server error should be terminal without a refresh.");

	match err {
		Error::ResourceFetchFailed { status, .. } => assert_eq!(status, Some(500)),
		other => panic!("Unexpected error variant: {other:?}."),
	}

	office_mock.assert_calls_async(1).await;
	refresh_mock.assert_calls_async(0).await;
}
