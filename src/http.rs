//! Transport primitives shared by token exchanges, revocation, and resource calls.
//!
//! [`SessionHttpClient`] is the session's only dependency on an HTTP stack. Token grants go
//! through the `oauth2` crate; revocation and protected-resource calls reuse the same transport
//! via raw [`HttpRequest`] values, so one client configuration covers every outbound call.

// std
use std::ops::Deref;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
// self
use crate::{_prelude::*, error::ConfigError};

/// Abstraction over HTTP transports used for every outbound session request.
///
/// Callers provide an implementation (typically behind `Arc<T>`) and the session requests
/// short-lived [`AsyncHttpClient`] handles that each carry a clone of a
/// [`ResponseMetadataSlot`]. Handles must own whatever state their request futures need so the
/// futures remain `Send` for the lifetime of the in-flight operation.
pub trait SessionHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle tied to a [`ResponseMetadataSlot`].
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds an [`AsyncHttpClient`] handle that records outcomes in `slot`.
	///
	/// Implementations call [`ResponseMetadataSlot::take`] before submitting the request so
	/// stale information never leaks across attempts, then [`ResponseMetadataSlot::store`] once
	/// an HTTP status is known.
	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle;
}

/// Captures metadata from the most recent HTTP response for downstream error reporting.
///
/// Additional fields may be added in future releases, so downstream code should construct
/// values using field names instead of struct update syntax.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the endpoint, if the response arrived.
	pub status: Option<u16>,
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
///
/// The session creates a fresh slot per request and reads the captured metadata immediately
/// after the call resolves.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// Minimal response view for calls made outside the `oauth2` crate.
#[derive(Clone, Debug)]
pub struct RawResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl RawResponse {
	/// Whether the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Executes a raw request through the session transport.
///
/// Errors are returned as transport descriptions; callers fold them into the error kind of the
/// flow they serve.
pub(crate) async fn execute_raw<C>(
	http_client: &C,
	request: HttpRequest,
) -> Result<RawResponse, String>
where
	C: ?Sized + SessionHttpClient,
{
	let slot = ResponseMetadataSlot::default();
	let handle = http_client.with_metadata(slot);
	let response = handle.call(request).await.map_err(|err| describe_client_error(&err))?;
	let status = response.status().as_u16();

	Ok(RawResponse { status, body: response.into_body() })
}

/// Builds a bearer-authenticated GET for the protected resource.
pub(crate) fn bearer_get_request(url: &Url, access_token: &str) -> Result<HttpRequest> {
	oauth2::http::Request::builder()
		.method(oauth2::http::Method::GET)
		.uri(url.as_str())
		.header(oauth2::http::header::AUTHORIZATION, format!("Bearer {access_token}"))
		.header(oauth2::http::header::ACCEPT, "application/json")
		.body(Vec::new())
		.map_err(|source| ConfigError::from(source).into())
}

/// Describes an [`HttpClientError`] without echoing request contents.
pub(crate) fn describe_client_error<E>(err: &HttpClientError<E>) -> String
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => format!("network error: {inner}"),
		HttpClientError::Http(inner) => format!("invalid HTTP request: {inner}"),
		HttpClientError::Io(inner) => format!("I/O error: {inner}"),
		HttpClientError::Other(message) => format!("HTTP client error: {message}"),
		other => format!("unhandled HTTP client error: {other:?}"),
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The session imposes no outbound timeout of its own; configure one on the wrapped client.
/// Custom clients should also disable redirect following, because token endpoints return
/// results directly instead of delegating to another URI.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	fn instrumented(&self, slot: ResponseMetadataSlot) -> InstrumentedHandle {
		InstrumentedHandle::new(self.0.clone(), slot)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl SessionHttpClient for ReqwestHttpClient {
	type Handle = InstrumentedHandle;
	type TransportError = ReqwestError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		self.instrumented(slot)
	}
}

#[cfg(feature = "reqwest")]
struct InstrumentedHttpClient {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}

#[cfg(feature = "reqwest")]
/// Handle returned by [`ReqwestHttpClient`] that satisfies [`SessionHttpClient`].
#[derive(Clone)]
pub struct InstrumentedHandle(Arc<InstrumentedHttpClient>);
#[cfg(feature = "reqwest")]
impl InstrumentedHandle {
	fn new(client: ReqwestClient, slot: ResponseMetadataSlot) -> Self {
		Self(Arc::new(InstrumentedHttpClient { client, slot }))
	}
}
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for InstrumentedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = Arc::clone(&self.0);

		Box::pin(async move {
			client.slot.take();

			let response = client
				.client
				.execute(request.try_into().map_err(Box::new)?)
				.await
				.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();

			client.slot.store(ResponseMetadata { status: Some(status.as_u16()) });

			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
