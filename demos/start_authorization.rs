//! Launches an authorization attempt and prints the redirect an HTTP shell would issue.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use url::Url;
// self
use oauth2_pkce_session::{
	config::{ClientAuthMethod, ClientConfig},
	flows::Session,
	store::{MemoryStore, SessionStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = ClientConfig::builder(
		Url::parse("https://provider.example.com")?,
		"demo-client",
		"demo-secret",
		Url::parse("http://localhost:12345/callback")?,
	)
	.authorization_path("/oauth2/authorize")
	.token_path("/oauth2/token")
	.revocation_path("/oauth2/revoke")
	.scope(["demo/office.read"])
	.auth_method(ClientAuthMethod::ClientSecretPost)
	.build()?;
	let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::default());
	let session = Session::new(store, config);
	let redirect = session.start_authorization().await?;

	println!("Send your user to {}.", &redirect.authorize_url);
	println!(
		"PKCE challenge ({:?}): {}.",
		redirect.code_challenge_method(),
		redirect.code_challenge()
	);
	println!("Expecting callback state `{}`.", &redirect.state);
	println!("Pass the callback's `code` and `state` to Session::handle_callback.");

	Ok(())
}
