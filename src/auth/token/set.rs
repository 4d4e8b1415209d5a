//! The session's credential bundle and its builder.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Errors produced while assembling a [`TokenSet`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum TokenSetBuilderError {
	/// Raised when the access token is missing or empty.
	#[error("Access token must be present and non-empty.")]
	EmptyAccessToken,
}

/// Credential bundle obtained from the token endpoint.
///
/// The store owns exactly one of these at a time; flows replace or clear it as a whole. Created
/// by the callback exchange, replaced by a refresh, destroyed by revocation.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenSet {
	/// Access token presented to the protected resource.
	pub access_token: TokenSecret,
	/// Refresh token, when the server issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Token type reported by the server, normally `bearer`.
	pub token_type: String,
	/// Instant the set was obtained.
	pub issued_at: OffsetDateTime,
	/// Expiry instant derived from `expires_in`, when the server reported one.
	pub expires_at: Option<OffsetDateTime>,
	/// Raw token-endpoint response body.
	///
	/// Contains the token material in clear text; render it only where the access token itself
	/// would be acceptable to show.
	pub raw: serde_json::Value,
}
impl TokenSet {
	/// Starts building a token set.
	pub fn builder() -> TokenSetBuilder {
		TokenSetBuilder::default()
	}

	/// Whether the set is expired at the given instant; `false` when no expiry is known.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expiry| instant >= expiry)
	}

	/// Whether the set is expired now.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Whether a refresh token is available.
	pub fn has_refresh_token(&self) -> bool {
		self.refresh_token.is_some()
	}
}
impl Debug for TokenSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenSet")
			.field("access_token", &self.access_token)
			.field("refresh_token", &self.refresh_token)
			.field("token_type", &self.token_type)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.field("raw", &"<redacted>")
			.finish()
	}
}

/// Builder validating [`TokenSet`] invariants.
#[derive(Clone, Debug, Default)]
pub struct TokenSetBuilder {
	access_token: Option<TokenSecret>,
	refresh_token: Option<TokenSecret>,
	token_type: Option<String>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	raw: Option<serde_json::Value>,
}
impl TokenSetBuilder {
	/// Sets the access token.
	pub fn access_token(mut self, value: impl Into<TokenSecret>) -> Self {
		self.access_token = Some(value.into());

		self
	}

	/// Sets the refresh token.
	pub fn refresh_token(mut self, value: impl Into<TokenSecret>) -> Self {
		self.refresh_token = Some(value.into());

		self
	}

	/// Sets the token type.
	pub fn token_type(mut self, value: impl Into<String>) -> Self {
		self.token_type = Some(value.into());

		self
	}

	/// Sets the issuance instant; defaults to now.
	pub fn issued_at(mut self, value: OffsetDateTime) -> Self {
		self.issued_at = Some(value);

		self
	}

	/// Sets the expiry instant; absent means the server reported no lifetime.
	pub fn expires_at(mut self, value: OffsetDateTime) -> Self {
		self.expires_at = Some(value);

		self
	}

	/// Attaches the raw token-endpoint response.
	pub fn raw(mut self, value: serde_json::Value) -> Self {
		self.raw = Some(value);

		self
	}

	/// Validates and assembles the token set.
	pub fn build(self) -> Result<TokenSet, TokenSetBuilderError> {
		let access_token =
			self.access_token.filter(|token| !token.is_empty()).ok_or(TokenSetBuilderError::EmptyAccessToken)?;

		Ok(TokenSet {
			access_token,
			refresh_token: self.refresh_token,
			token_type: self.token_type.unwrap_or_else(|| "bearer".into()),
			issued_at: self.issued_at.unwrap_or_else(OffsetDateTime::now_utc),
			expires_at: self.expires_at,
			raw: self.raw.unwrap_or(serde_json::Value::Null),
		})
	}
}
