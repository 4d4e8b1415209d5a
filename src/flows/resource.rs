//! Protected-resource access with the bounded refresh-and-retry state machine.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	flows::Session,
	http::{self, SessionHttpClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// States of the refresh-and-retry machine. The shape guarantees at most one refresh and one
/// retried request per call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FetchState {
	/// First request, using the stored access token.
	Initial,
	/// First request got a 401; the token set is being refreshed.
	AwaitingRefresh,
	/// Second request, using the refreshed access token; its outcome is final.
	Retried,
}

/// What the machine does with a response in the current state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FetchStep {
	/// Deliver the body to the caller.
	Deliver,
	/// Refresh the token set and retry the request once.
	RefreshAndRetry,
	/// Surface a terminal fetch failure.
	Fail,
}

fn next_step(state: FetchState, status: u16) -> FetchStep {
	if (200..300).contains(&status) {
		return FetchStep::Deliver;
	}

	match (state, status) {
		(FetchState::Initial, 401) => FetchStep::RefreshAndRetry,
		// A 401 after the retry is final; any other non-2xx is fatal for this call.
		_ => FetchStep::Fail,
	}
}

impl<C> Session<C>
where
	C: ?Sized + SessionHttpClient,
{
	/// Calls the protected resource with the stored bearer credential and returns the raw JSON
	/// body.
	///
	/// A 401 on the first attempt triggers exactly one refresh and one retry; the retry's
	/// outcome is final, whatever it is.
	pub async fn fetch_protected_resource(&self) -> Result<serde_json::Value> {
		const KIND: FlowKind = FlowKind::Resource;

		let span = FlowSpan::new(KIND, "fetch_protected_resource");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let resource = self
					.config
					.endpoints
					.resource
					.clone()
					.ok_or(ConfigError::MissingResourceEndpoint)?;
				let tokens = self.store.fetch_tokens().await?.ok_or(Error::Unauthenticated)?;
				let mut access = tokens.access_token.expose().to_owned();
				let mut state = FetchState::Initial;

				loop {
					if state == FetchState::AwaitingRefresh {
						// Failures other than a rejected exchange (e.g. a missing refresh
						// token) still count as a failed refresh from the caller's viewpoint.
						let refreshed = self.refresh_tokens().await.map_err(|err| match err {
							Error::RefreshFailed { .. } => err,
							other => Error::RefreshFailed { reason: other.to_string() },
						})?;

						access = refreshed.access_token.expose().to_owned();
						state = FetchState::Retried;

						continue;
					}

					self.metrics.resource.record_attempt();

					let request = http::bearer_get_request(&resource, &access)?;
					let response = http::execute_raw(self.http_client.as_ref(), request)
						.await
						.map_err(|reason| Error::ResourceFetchFailed { status: None, reason })?;

					match next_step(state, response.status) {
						FetchStep::Deliver => return parse_body(response.status, &response.body),
						FetchStep::RefreshAndRetry => state = FetchState::AwaitingRefresh,
						FetchStep::Fail =>
							return Err(Error::ResourceFetchFailed {
								status: Some(response.status),
								reason: format!(
									"resource endpoint returned HTTP {}",
									response.status
								),
							}),
					}
				}
			})
			.await;

		match &result {
			Ok(_) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Success);
				self.metrics.resource.record_success();
			},
			Err(_) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				self.metrics.resource.record_failure();
			},
		}

		result
	}
}

fn parse_body(status: u16, body: &[u8]) -> Result<serde_json::Value> {
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|err| Error::ResourceFetchFailed {
		status: Some(status),
		reason: format!(
			"resource endpoint returned malformed JSON at `{}`: {}",
			err.path(),
			err.inner()
		),
	})
}
