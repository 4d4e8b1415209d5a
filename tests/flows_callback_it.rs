#![cfg(feature = "reqwest")]

// std
use std::collections::HashMap;
// crates.io
use httpmock::prelude::*;
// self
use oauth2_pkce_session::{
	_preludet::*,
	config::{ClientAuthMethod, ClientConfig},
	store::SessionStore,
};

const CLIENT_ID: &str = "client-callback";
const CLIENT_SECRET: &str = "secret-callback";

fn build_config(server: &MockServer) -> ClientConfig {
	ClientConfig::builder(
		Url::parse(&server.base_url()).expect("Mock server base URL should parse successfully."),
		CLIENT_ID,
		CLIENT_SECRET,
		Url::parse("http://localhost:12345/callback")
			.expect("Redirect URI fixture should parse successfully."),
	)
	.scope(["office.read"])
	.auth_method(ClientAuthMethod::ClientSecretPost)
	.build()
	.expect("Client configuration should build successfully.")
}

#[tokio::test]
async fn callback_exchanges_code_and_saves_tokens() {
	let server = MockServer::start_async().await;
	let (session, store) = build_reqwest_test_session(build_config(&server));
	let redirect = session
		.start_authorization()
		.await
		.expect("Starting an authorization attempt should succeed.");
	let pairs: HashMap<_, _> = redirect.authorize_url.query_pairs().into_owned().collect();

	assert_eq!(pairs.get("response_type").map(String::as_str), Some("code"));
	assert_eq!(pairs.get("client_id").map(String::as_str), Some(CLIENT_ID));
	assert_eq!(pairs.get("state").map(String::as_str), Some(redirect.state.as_str()));
	assert_eq!(pairs.get("code_challenge").map(String::as_str), Some(redirect.code_challenge()));
	assert_eq!(pairs.get("code_challenge_method").map(String::as_str), Some("S256"));
	assert_eq!(pairs.get("scope").map(String::as_str), Some("office.read"));

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"access_token\":\"access-success\",\"refresh_token\":\"refresh-success\",\"token_type\":\"bearer\",\"expires_in\":3600}",
				);
		})
		.await;

	session
		.handle_callback("CODE1", &redirect.state)
		.await
		.expect("Callback with the issued state should succeed.");

	mock.assert_async().await;

	let stored = store
		.fetch_tokens()
		.await
		.expect("Token store fetch should succeed.")
		.expect("A token set should be stored after the exchange.");

	assert_eq!(stored.access_token.expose(), "access-success");
	assert_eq!(stored.refresh_token.as_ref().map(|secret| secret.expose()), Some("refresh-success"));
	assert_eq!(stored.token_type, "bearer");
	assert!(stored.expires_at.is_some());
	assert_eq!(
		stored.raw.get("access_token").and_then(|value| value.as_str()),
		Some("access-success")
	);
	assert!(
		store
			.fetch_pending()
			.await
			.expect("Pending fetch should succeed.")
			.is_none(),
		"the pending attempt must be consumed by a successful callback"
	);
}

#[tokio::test]
async fn callback_without_pending_attempt_reports_missing_verifier() {
	let server = MockServer::start_async().await;
	let (session, _store) = build_reqwest_test_session(build_config(&server));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	let err = session
		.handle_callback("CODE1", "abc123")
		.await
		.expect_err("A callback without a prior login should fail.");

	assert!(matches!(err, Error::MissingVerifier));

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn state_mismatch_keeps_pending_attempt_and_skips_exchange() {
	let server = MockServer::start_async().await;
	let (session, store) = build_reqwest_test_session(build_config(&server));
	let redirect = session
		.start_authorization()
		.await
		.expect("Starting an authorization attempt should succeed.");
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"access_token\":\"access-late\",\"token_type\":\"bearer\",\"expires_in\":3600}",
				);
		})
		.await;
	let err = session
		.handle_callback("CODE1", "xyz789")
		.await
		.expect_err("A forged state should be rejected.");

	assert!(matches!(err, Error::StateMismatch));

	mock.assert_calls_async(0).await;

	assert!(
		store
			.fetch_pending()
			.await
			.expect("Pending fetch should succeed.")
			.is_some(),
		"a mismatched state must not consume the pending attempt"
	);

	// The genuine callback can still land afterwards.
	session
		.handle_callback("CODE1", &redirect.state)
		.await
		.expect("The genuine callback should still succeed after a forged one.");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn replayed_callback_reports_missing_verifier() {
	let server = MockServer::start_async().await;
	let (session, _store) = build_reqwest_test_session(build_config(&server));
	let redirect = session
		.start_authorization()
		.await
		.expect("Starting an authorization attempt should succeed.");
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"access_token\":\"access-once\",\"token_type\":\"bearer\",\"expires_in\":3600}",
				);
		})
		.await;

	session
		.handle_callback("CODE1", &redirect.state)
		.await
		.expect("The first callback should succeed.");

	let err = session
		.handle_callback("CODE1", &redirect.state)
		.await
		.expect_err("A replayed callback should be rejected.");

	assert!(matches!(err, Error::MissingVerifier));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn rejected_exchange_reports_failure_and_stores_nothing() {
	let server = MockServer::start_async().await;
	let (session, store) = build_reqwest_test_session(build_config(&server));
	let redirect = session
		.start_authorization()
		.await
		.expect("Starting an authorization attempt should succeed.");
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"code expired\"}");
		})
		.await;
	let err = session
		.handle_callback("CODE1", &redirect.state)
		.await
		.expect_err("A rejected exchange should surface to the caller.");

	match err {
		Error::TokenExchangeFailed { reason } => {
			assert!(reason.contains("invalid_grant"));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	mock.assert_async().await;

	assert!(
		store.fetch_tokens().await.expect("Token store fetch should succeed.").is_none(),
		"a failed exchange must not store a token set"
	);
	assert!(
		store
			.fetch_pending()
			.await
			.expect("Pending fetch should succeed.")
			.is_none(),
		"the pending attempt is consumed even when the exchange fails"
	);
}
