//! Error types shared across flows, configuration, and storage.

// self
use crate::_prelude::*;

/// Crate-wide result alias defaulting to [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical session error returned by every public flow operation.
///
/// None of these kinds is process-fatal. The `reason` fields carry operator-grade diagnostics
/// (HTTP status codes, OAuth error codes, JSON error paths) and never raw token material;
/// boundaries that render errors to end users should echo [`Error::client_message`] instead.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage backend failure.
	#[error(transparent)]
	Storage(#[from] crate::store::StoreError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// The callback returned a CSRF state that does not match the pending attempt.
	#[error("Authorization callback state does not match the pending attempt.")]
	StateMismatch,
	/// No pending authorization attempt holds a PKCE verifier for this callback; raised both
	/// when no authorization was started and when a callback is replayed.
	#[error("No pending authorization attempt holds a PKCE verifier for this callback.")]
	MissingVerifier,
	/// The authorization-code exchange was rejected or could not be transported.
	#[error("Authorization code exchange failed: {reason}.")]
	TokenExchangeFailed {
		/// Operator-grade diagnostic, free of secrets.
		reason: String,
	},
	/// No refresh token is stored for this session.
	#[error("No refresh token is stored for this session.")]
	NoRefreshToken,
	/// The refresh-token exchange was rejected or could not be transported.
	#[error("Token refresh failed: {reason}.")]
	RefreshFailed {
		/// Operator-grade diagnostic, free of secrets.
		reason: String,
	},
	/// No token set is stored, so there is nothing to revoke.
	#[error("No active token is stored for this session.")]
	NoActiveToken,
	/// The revocation endpoint rejected the request or could not be reached.
	#[error("Token revocation failed: {reason}.")]
	RevocationFailed {
		/// Operator-grade diagnostic, free of secrets.
		reason: String,
	},
	/// No token set is stored, so the protected resource cannot be called.
	#[error("No token set is stored; authorize first.")]
	Unauthenticated,
	/// The protected resource call failed terminally.
	#[error("Protected resource fetch failed: {reason}.")]
	ResourceFetchFailed {
		/// Final HTTP status, absent when the request never completed.
		status: Option<u16>,
		/// Operator-grade diagnostic, free of secrets.
		reason: String,
	},
}
impl Error {
	/// Short, generic, secret-free message suitable for echoing to an end user.
	pub fn client_message(&self) -> &'static str {
		match self {
			Self::Storage(_) | Self::Config(_) => "Internal error.",
			Self::StateMismatch | Self::MissingVerifier | Self::TokenExchangeFailed { .. } =>
				"Failed to obtain access token.",
			Self::NoRefreshToken | Self::RefreshFailed { .. } =>
				"Failed to refresh token. Please log in again.",
			Self::NoActiveToken => "Access token is missing.",
			Self::RevocationFailed { .. } => "Failed to revoke token.",
			Self::Unauthenticated => "Access token is missing. Please log in.",
			Self::ResourceFetchFailed { .. } => "Failed to fetch protected resource.",
		}
	}

	/// Suggested HTTP status code for boundaries that map error kinds onto responses.
	pub fn http_status(&self) -> u16 {
		match self {
			Self::NoRefreshToken | Self::RefreshFailed { .. } | Self::Unauthenticated => 401,
			Self::NoActiveToken => 400,
			Self::Storage(_)
			| Self::Config(_)
			| Self::StateMismatch
			| Self::MissingVerifier
			| Self::TokenExchangeFailed { .. }
			| Self::RevocationFailed { .. }
			| Self::ResourceFetchFailed { .. } => 500,
		}
	}
}

/// Configuration and validation failures raised while assembling the session.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Raised when request construction fails at the HTTP layer.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Raised when an endpoint path cannot be joined onto the server base URL.
	#[error("Endpoint path `{path}` cannot be joined onto the server base URL.")]
	InvalidEndpointPath {
		/// Offending path value.
		path: String,
		/// Underlying parse failure.
		#[source]
		source: url::ParseError,
	},
	/// Raised when a resolved endpoint URL is rejected by the OAuth client.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parse failure.
		#[source]
		source: url::ParseError,
	},
	/// Raised for non-HTTPS endpoints on non-loopback hosts.
	#[error("The {endpoint} endpoint must use HTTPS: `{url}`.")]
	InsecureEndpoint {
		/// Endpoint name for diagnostics.
		endpoint: &'static str,
		/// Offending URL.
		url: String,
	},
	/// Raised when the client identifier is empty.
	#[error("Client identifier must not be empty.")]
	EmptyClientId,
	/// Raised when revocation is requested but no revocation endpoint is configured.
	#[error("No revocation endpoint is configured.")]
	MissingRevocationEndpoint,
	/// Raised when a resource fetch is requested but no resource endpoint is configured.
	#[error("No protected-resource endpoint is configured.")]
	MissingResourceEndpoint,
	/// Raised when a token-endpoint response cannot be assembled into a token set.
	#[error("Unable to assemble a token set from the token endpoint response.")]
	TokenBuild(#[from] crate::auth::TokenSetBuilderError),
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn client_messages_never_leak_reasons() {
		let err = Error::TokenExchangeFailed { reason: "secret-diagnostic".into() };

		assert!(!err.client_message().contains("secret-diagnostic"));
		assert_eq!(err.client_message(), "Failed to obtain access token.");
	}

	#[test]
	fn http_status_mapping_matches_route_semantics() {
		assert_eq!(Error::Unauthenticated.http_status(), 401);
		assert_eq!(Error::NoRefreshToken.http_status(), 401);
		assert_eq!(Error::RefreshFailed { reason: "r".into() }.http_status(), 401);
		assert_eq!(Error::NoActiveToken.http_status(), 400);
		assert_eq!(Error::StateMismatch.http_status(), 500);
		assert_eq!(
			Error::ResourceFetchFailed { status: Some(503), reason: "r".into() }.http_status(),
			500
		);
	}
}
