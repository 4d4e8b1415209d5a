//! Static client configuration, validated once and read-only afterwards.

// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Client authentication modes for token and revocation endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	/// Credentials in an HTTP Basic `Authorization` header.
	#[default]
	ClientSecretBasic,
	/// Credentials as `client_id`/`client_secret` form-body parameters.
	ClientSecretPost,
}

/// PKCE challenge transforms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PkceChallengeMethod {
	/// SHA-256 transform from RFC 7636.
	#[default]
	S256,
	/// Plain-text challenge for servers that cannot hash; avoid unless required.
	Plain,
}
impl PkceChallengeMethod {
	/// Returns the RFC 7636 identifier sent in the authorize URL.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::S256 => "S256",
			Self::Plain => "plain",
		}
	}
}

/// Resolved endpoint set the flows call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionEndpoints {
	/// Authorization endpoint the end user is redirected to.
	pub authorization: Url,
	/// Token endpoint used for code exchanges and refreshes.
	pub token: Url,
	/// Revocation endpoint, when the provider offers one.
	pub revocation: Option<Url>,
	/// Protected-resource endpoint consumed with a bearer credential.
	pub resource: Option<Url>,
}

/// Immutable client configuration for the session.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Resolved endpoints.
	pub endpoints: SessionEndpoints,
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: TokenSecret,
	/// Redirect URI registered for the client.
	pub redirect_uri: Url,
	/// Requested scope values, space-joined on the wire.
	pub scope: Vec<String>,
	/// Client authentication mode.
	pub auth_method: ClientAuthMethod,
	/// PKCE challenge transform.
	pub pkce_method: PkceChallengeMethod,
}
impl ClientConfig {
	/// Starts building a configuration from the provider base URL and client registration.
	pub fn builder(
		server: Url,
		client_id: impl Into<String>,
		client_secret: impl Into<TokenSecret>,
		redirect_uri: Url,
	) -> ClientConfigBuilder {
		ClientConfigBuilder {
			server,
			authorization_path: "/authorize".into(),
			token_path: "/token".into(),
			revocation_path: None,
			resource_endpoint: None,
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			redirect_uri,
			scope: Vec::new(),
			auth_method: ClientAuthMethod::default(),
			pkce_method: PkceChallengeMethod::default(),
		}
	}
}

/// Builder joining endpoint paths onto the server base URL and validating the result.
#[derive(Clone, Debug)]
pub struct ClientConfigBuilder {
	server: Url,
	authorization_path: String,
	token_path: String,
	revocation_path: Option<String>,
	resource_endpoint: Option<Url>,
	client_id: String,
	client_secret: TokenSecret,
	redirect_uri: Url,
	scope: Vec<String>,
	auth_method: ClientAuthMethod,
	pkce_method: PkceChallengeMethod,
}
impl ClientConfigBuilder {
	/// Overrides the authorization endpoint path; defaults to `/authorize`.
	pub fn authorization_path(mut self, path: impl Into<String>) -> Self {
		self.authorization_path = path.into();

		self
	}

	/// Overrides the token endpoint path; defaults to `/token`.
	pub fn token_path(mut self, path: impl Into<String>) -> Self {
		self.token_path = path.into();

		self
	}

	/// Sets the revocation endpoint path; unset means revocation is unavailable.
	pub fn revocation_path(mut self, path: impl Into<String>) -> Self {
		self.revocation_path = Some(path.into());

		self
	}

	/// Sets the protected-resource endpoint; it may live on a different host than the provider.
	pub fn resource_endpoint(mut self, endpoint: Url) -> Self {
		self.resource_endpoint = Some(endpoint);

		self
	}

	/// Sets the requested scope values.
	pub fn scope<I, S>(mut self, scope: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scope = scope.into_iter().map(Into::into).collect();

		self
	}

	/// Sets the client authentication mode.
	pub fn auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.auth_method = method;

		self
	}

	/// Sets the PKCE challenge transform.
	pub fn pkce_method(mut self, method: PkceChallengeMethod) -> Self {
		self.pkce_method = method;

		self
	}

	/// Validates the configuration and freezes it.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		if self.client_id.trim().is_empty() {
			return Err(ConfigError::EmptyClientId);
		}

		let authorization = join_endpoint(&self.server, &self.authorization_path)?;
		let token = join_endpoint(&self.server, &self.token_path)?;
		let revocation =
			self.revocation_path.as_deref().map(|path| join_endpoint(&self.server, path)).transpose()?;

		validate_endpoint("authorization", &authorization)?;
		validate_endpoint("token", &token)?;

		if let Some(url) = &revocation {
			validate_endpoint("revocation", url)?;
		}
		if let Some(url) = &self.resource_endpoint {
			validate_endpoint("resource", url)?;
		}

		Ok(ClientConfig {
			endpoints: SessionEndpoints {
				authorization,
				token,
				revocation,
				resource: self.resource_endpoint,
			},
			client_id: self.client_id,
			client_secret: self.client_secret,
			redirect_uri: self.redirect_uri,
			scope: self.scope,
			auth_method: self.auth_method,
			pkce_method: self.pkce_method,
		})
	}
}

fn join_endpoint(server: &Url, path: &str) -> Result<Url, ConfigError> {
	server
		.join(path)
		.map_err(|source| ConfigError::InvalidEndpointPath { path: path.to_owned(), source })
}

/// Endpoints must be HTTPS; loopback hosts are exempt so local demos and mock servers work.
fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	if url.scheme() == "https" || is_loopback(url) {
		Ok(())
	} else {
		Err(ConfigError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain == "localhost",
		Some(url::Host::Ipv4(address)) => address.is_loopback(),
		Some(url::Host::Ipv6(address)) => address.is_loopback(),
		None => false,
	}
}
