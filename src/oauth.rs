//! Internal facade over the `oauth2` crate, plus raw request builders for the revocation
//! endpoint which is called outside the crate's typed client.

pub use oauth2;

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, Client, ClientId, ClientSecret, EndpointNotSet,
	EndpointSet, ExtraTokenFields, HttpClientError, HttpRequest, PkceCodeVerifier, RedirectUrl,
	RefreshToken, RequestTokenError, StandardRevocableToken, StandardTokenResponse,
	TokenResponse, TokenUrl,
	basic::{
		BasicErrorResponse, BasicRequestTokenError, BasicRevocationErrorResponse,
		BasicTokenIntrospectionResponse, BasicTokenType,
	},
};
// self
use crate::{
	_prelude::*,
	auth::TokenSet,
	config::{ClientAuthMethod, ClientConfig},
	error::ConfigError,
	http::{ResponseMetadata, ResponseMetadataSlot, SessionHttpClient, describe_client_error},
};

/// Token-endpoint response fields beyond the standard set, preserved verbatim.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTokenFields {
	/// Every non-standard field returned by the token endpoint.
	#[serde(flatten)]
	pub extra: serde_json::Map<String, serde_json::Value>,
}
impl ExtraTokenFields for RawTokenFields {}

/// Token response that keeps unrecognized fields so the raw payload survives into [`TokenSet`].
pub type RawTokenResponse = StandardTokenResponse<RawTokenFields, BasicTokenType>;

type UnsetOAuthClient = Client<
	BasicErrorResponse,
	RawTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
>;
type ConfiguredOAuthClient = Client<
	BasicErrorResponse,
	RawTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointSet,
>;

/// Facade wrapping the two token grants the session performs.
pub(crate) struct CodeGrantFacade<C>
where
	C: ?Sized + SessionHttpClient,
{
	oauth_client: ConfiguredOAuthClient,
	http_client: Arc<C>,
}
impl<C> CodeGrantFacade<C>
where
	C: ?Sized + SessionHttpClient,
{
	pub(crate) fn from_config(config: &ClientConfig, http_client: Arc<C>) -> Result<Self> {
		let auth_url = AuthUrl::new(config.endpoints.authorization.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let token_url = TokenUrl::new(config.endpoints.token.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let redirect_url = RedirectUrl::new(config.redirect_uri.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let mut oauth_client = UnsetOAuthClient::new(ClientId::new(config.client_id.clone()))
			.set_client_secret(ClientSecret::new(config.client_secret.expose().to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_redirect_uri(redirect_url);

		if matches!(config.auth_method, ClientAuthMethod::ClientSecretPost) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Ok(Self { oauth_client, http_client })
	}

	/// Exchanges an authorization code plus PKCE verifier for a token set.
	pub(crate) async fn exchange_authorization_code(
		&self,
		code: &str,
		pkce_verifier: &str,
	) -> Result<TokenSet> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let request = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_owned()));
		let response = request.request_async(&instrumented).await.map_err(|err| {
			Error::TokenExchangeFailed { reason: describe_token_error(meta.take(), err) }
		})?;

		token_set_from_response(response)
	}

	/// Exchanges a refresh token for a new token set.
	pub(crate) async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let refresh_secret = RefreshToken::new(refresh_token.to_owned());
		let request = self.oauth_client.exchange_refresh_token(&refresh_secret);
		let response = request.request_async(&instrumented).await.map_err(|err| {
			Error::RefreshFailed { reason: describe_token_error(meta.take(), err) }
		})?;

		token_set_from_response(response)
	}
}

fn token_set_from_response(response: RawTokenResponse) -> Result<TokenSet> {
	let raw = serde_json::to_value(&response).unwrap_or(serde_json::Value::Null);
	let token_type = raw
		.get("token_type")
		.and_then(serde_json::Value::as_str)
		.unwrap_or("bearer")
		.to_owned();
	let issued_at = OffsetDateTime::now_utc();
	let expires_at = response
		.expires_in()
		.and_then(|lifetime| i64::try_from(lifetime.as_secs()).ok())
		.map(|secs| issued_at + Duration::seconds(secs));
	let mut builder = TokenSet::builder()
		.access_token(response.access_token().secret().to_owned())
		.token_type(token_type)
		.issued_at(issued_at)
		.raw(raw);

	if let Some(expiry) = expires_at {
		builder = builder.expires_at(expiry);
	}
	if let Some(refresh) = response.refresh_token() {
		builder = builder.refresh_token(refresh.secret().to_owned());
	}

	builder.build().map_err(|err| ConfigError::from(err).into())
}

/// Summarizes a failed token request for the flow's `reason` field.
fn describe_token_error<E>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
) -> String
where
	E: 'static + Send + Sync + StdError,
{
	let status = meta.and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) => {
			let code = response.error().as_ref().to_owned();

			match (response.error_description(), status) {
				(Some(description), Some(status)) => format!(
					"token endpoint returned HTTP {status} with OAuth error `{code}`: {description}"
				),
				(Some(description), None) =>
					format!("token endpoint returned OAuth error `{code}`: {description}"),
				(None, Some(status)) =>
					format!("token endpoint returned HTTP {status} with OAuth error `{code}`"),
				(None, None) => format!("token endpoint returned OAuth error `{code}`"),
			}
		},
		RequestTokenError::Request(error) => describe_client_error(&error),
		RequestTokenError::Parse(error, _body) => format!(
			"token endpoint returned malformed JSON at `{}`: {}",
			error.path(),
			error.inner()
		),
		RequestTokenError::Other(message) =>
			format!("token endpoint returned an unexpected response: {message}"),
	}
}

/// Builds an RFC 7009 revocation request carrying the access token and client credentials.
pub(crate) fn revocation_request(
	config: &ClientConfig,
	access_token: &str,
) -> Result<HttpRequest> {
	let endpoint =
		config.endpoints.revocation.as_ref().ok_or(ConfigError::MissingRevocationEndpoint)?;
	let mut form = url::form_urlencoded::Serializer::new(String::new());

	form.append_pair("token", access_token);
	form.append_pair("token_type_hint", "access_token");

	let mut request = oauth2::http::Request::builder()
		.method(oauth2::http::Method::POST)
		.uri(endpoint.as_str())
		.header(oauth2::http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
		.header(oauth2::http::header::ACCEPT, "application/json");

	match config.auth_method {
		ClientAuthMethod::ClientSecretBasic => {
			request = request.header(
				oauth2::http::header::AUTHORIZATION,
				basic_credentials(&config.client_id, config.client_secret.expose()),
			);
		},
		ClientAuthMethod::ClientSecretPost => {
			form.append_pair("client_id", &config.client_id);
			form.append_pair("client_secret", config.client_secret.expose());
		},
	}

	request.body(form.finish().into_bytes()).map_err(|source| ConfigError::from(source).into())
}

/// Encodes client credentials for an HTTP Basic `Authorization` header per RFC 6749 2.3.1,
/// form-urlencoding each component before joining.
fn basic_credentials(client_id: &str, client_secret: &str) -> String {
	let encode =
		|value: &str| url::form_urlencoded::byte_serialize(value.as_bytes()).collect::<String>();
	let credentials = format!("{}:{}", encode(client_id), encode(client_secret));

	format!("Basic {}", STANDARD.encode(credentials))
}
