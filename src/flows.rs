//! Flow orchestrators for the single OAuth session.

pub mod authorize;
pub mod callback;
pub mod metrics;
pub mod refresh;
pub mod resource;
pub mod revoke;

pub use authorize::*;
pub use metrics::*;

// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;
use crate::{
	_prelude::*, auth::TokenSet, config::ClientConfig, http::SessionHttpClient,
	oauth::CodeGrantFacade, store::SessionStore,
};

/// Session specialized for the crate's default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestSession = Session<ReqwestHttpClient>;

/// Coordinates the OAuth 2.0 Authorization Code + PKCE lifecycle for one user session.
///
/// The session owns the HTTP transport, state store, and client configuration so the individual
/// flows can focus on grant-specific logic: state + PKCE generation, the code exchange, refresh
/// rotation, revocation, and the guarded resource fetch. Exactly one token set and at most one
/// pending authorization exist at a time; flows replace them wholesale.
#[derive(Clone)]
pub struct Session<C>
where
	C: ?Sized + SessionHttpClient,
{
	/// HTTP transport used for every outbound request.
	pub http_client: Arc<C>,
	/// Store holding the pending authorization attempt and the current token set.
	pub store: Arc<dyn SessionStore>,
	/// Static client configuration.
	pub config: ClientConfig,
	/// In-process counters for flow attempts and outcomes.
	pub metrics: Arc<SessionMetrics>,
}
impl<C> Session<C>
where
	C: ?Sized + SessionHttpClient,
{
	/// Creates a session that reuses the caller-provided transport.
	pub fn with_http_client(
		store: Arc<dyn SessionStore>,
		config: ClientConfig,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			store,
			config,
			metrics: Arc::new(SessionMetrics::default()),
		}
	}

	/// Returns a copy of the currently stored token set, for status views.
	pub async fn token_snapshot(&self) -> Result<Option<TokenSet>> {
		Ok(self.store.fetch_tokens().await?)
	}

	pub(crate) fn facade(&self) -> Result<CodeGrantFacade<C>> {
		CodeGrantFacade::from_config(&self.config, self.http_client.clone())
	}
}
#[cfg(feature = "reqwest")]
impl Session<ReqwestHttpClient> {
	/// Creates a session with a default reqwest transport.
	pub fn new(store: Arc<dyn SessionStore>, config: ClientConfig) -> Self {
		Self::with_http_client(store, config, ReqwestHttpClient::default())
	}
}
impl<C> Debug for Session<C>
where
	C: ?Sized + SessionHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session")
			.field("client_id", &self.config.client_id)
			.field("auth_method", &self.config.auth_method)
			.field("endpoints", &self.config.endpoints)
			.finish_non_exhaustive()
	}
}
