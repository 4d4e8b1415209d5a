//! Authorization initiation: state + PKCE generation and authorize-URL construction.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::PendingAuthorization,
	config::{ClientConfig, PkceChallengeMethod},
	flows::Session,
	http::SessionHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// CSRF state length in characters; roughly 190 bits of alphanumeric entropy.
const STATE_LEN: usize = 32;
/// PKCE verifier length in characters, within the 43..=128 range RFC 7636 allows.
const PKCE_VERIFIER_LEN: usize = 64;

/// Redirect instruction returned by [`Session::start_authorization`].
///
/// The verifier never appears here; it stays in the store until the callback consumes it.
#[derive(Clone, Debug)]
pub struct AuthorizeRedirect {
	/// Fully assembled authorization URL to send the user to.
	pub authorize_url: Url,
	/// CSRF state the callback must echo.
	pub state: String,
	challenge: String,
	method: PkceChallengeMethod,
}
impl AuthorizeRedirect {
	/// The PKCE challenge embedded in the authorize URL.
	pub fn code_challenge(&self) -> &str {
		&self.challenge
	}

	/// The challenge transform advertised to the server.
	pub fn code_challenge_method(&self) -> PkceChallengeMethod {
		self.method
	}
}

pub(crate) struct PkcePair {
	pub(crate) verifier: String,
	pub(crate) challenge: String,
	pub(crate) method: PkceChallengeMethod,
}
impl PkcePair {
	pub(crate) fn generate(method: PkceChallengeMethod) -> Self {
		let verifier = random_string(PKCE_VERIFIER_LEN);
		let challenge = compute_challenge(&verifier, method);

		Self { verifier, challenge, method }
	}
}

/// Samples an alphanumeric string from the thread-local CSPRNG.
///
/// `ThreadRng` is cryptographically secure, and the alphanumeric alphabet stays within the
/// PKCE unreserved character set.
fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn compute_challenge(verifier: &str, method: PkceChallengeMethod) -> String {
	match method {
		PkceChallengeMethod::S256 => URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes())),
		PkceChallengeMethod::Plain => verifier.to_owned(),
	}
}

fn build_authorize_url(config: &ClientConfig, state: &str, pkce: &PkcePair) -> Url {
	let mut url = config.endpoints.authorization.clone();

	{
		let mut pairs = url.query_pairs_mut();

		pairs
			.append_pair("response_type", "code")
			.append_pair("client_id", &config.client_id)
			.append_pair("redirect_uri", config.redirect_uri.as_str());

		if !config.scope.is_empty() {
			pairs.append_pair("scope", &config.scope.join(" "));
		}

		pairs
			.append_pair("state", state)
			.append_pair("code_challenge", &pkce.challenge)
			.append_pair("code_challenge_method", pkce.method.as_str());
	}

	url
}

impl<C> Session<C>
where
	C: ?Sized + SessionHttpClient,
{
	/// Starts a new authorization attempt and returns the redirect instruction.
	///
	/// Any previous pending attempt is overwritten; at most one authorization is in flight.
	pub async fn start_authorization(&self) -> Result<AuthorizeRedirect> {
		const KIND: FlowKind = FlowKind::Authorize;

		let span = FlowSpan::new(KIND, "start_authorization");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let pkce = PkcePair::generate(self.config.pkce_method);
				let state = random_string(STATE_LEN);

				// Overwrites any previous attempt; the displaced value is of no further use.
				let _ = self
					.store
					.put_pending(PendingAuthorization::new(state.clone(), pkce.verifier.clone()))
					.await?;

				let authorize_url = build_authorize_url(&self.config, &state, &pkce);

				Ok(AuthorizeRedirect {
					authorize_url,
					state,
					challenge: pkce.challenge,
					method: pkce.method,
				})
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
