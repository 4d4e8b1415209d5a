//! RFC 7009 token revocation.

// self
use crate::{
	_prelude::*,
	flows::Session,
	http::{self, SessionHttpClient},
	oauth,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C> Session<C>
where
	C: ?Sized + SessionHttpClient,
{
	/// Revokes the current access token at the provider and clears the stored token set.
	///
	/// The token set is cleared only after the endpoint acknowledges with a 2xx; on any failure
	/// it stays in place and no retry is attempted.
	pub async fn revoke_tokens(&self) -> Result<()> {
		const KIND: FlowKind = FlowKind::Revoke;

		let span = FlowSpan::new(KIND, "revoke_tokens");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let current = self.store.fetch_tokens().await?.ok_or(Error::NoActiveToken)?;
				let request =
					oauth::revocation_request(&self.config, current.access_token.expose())?;
				let response = http::execute_raw(self.http_client.as_ref(), request)
					.await
					.map_err(|reason| Error::RevocationFailed { reason })?;

				if !response.is_success() {
					return Err(Error::RevocationFailed {
						reason: format!("revocation endpoint returned HTTP {}", response.status),
					});
				}

				let _ = self.store.clear_tokens().await?;

				Ok(())
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
