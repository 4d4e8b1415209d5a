//! Shows how an HTTP shell maps session operations and error kinds onto routes, using
//! `client_message` and `http_status` at the boundary. Runs entirely offline; every call after
//! the redirect fails in a controlled way on the empty session.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use url::Url;
// self
use oauth2_pkce_session::{
	config::ClientConfig,
	error::Error,
	flows::Session,
	store::{MemoryStore, SessionStore},
};

fn report(route: &str, err: &Error) {
	println!("{route} -> {} {}", err.http_status(), err.client_message());
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = ClientConfig::builder(
		Url::parse("https://provider.example.com")?,
		"demo-client",
		"demo-secret",
		Url::parse("http://localhost:12345/callback")?,
	)
	.revocation_path("/revoke")
	.resource_endpoint(Url::parse("https://provider.example.com/office")?)
	.scope(["demo/office.read"])
	.build()?;
	let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::default());
	let session = Session::new(store, config);
	let redirect = session.start_authorization().await?;

	println!("GET /login -> 302 {}", redirect.authorize_url);

	// A forged callback state is rejected before any network traffic happens.
	if let Err(err) = session.handle_callback("bogus-code", "forged-state").await {
		report("GET /callback?state=forged-state", &err);
	}
	if let Err(err) = session.refresh_tokens().await {
		report("GET /refresh", &err);
	}
	if let Err(err) = session.revoke_tokens().await {
		report("GET /revoke", &err);
	}
	if let Err(err) = session.fetch_protected_resource().await {
		report("GET /office", &err);
	}

	println!(
		"GET / -> token set present: {}",
		session.token_snapshot().await?.is_some()
	);

	Ok(())
}
