//! Refresh token exchange and token set rotation.

// self
use crate::{
	_prelude::*,
	auth::TokenSet,
	flows::Session,
	http::SessionHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C> Session<C>
where
	C: ?Sized + SessionHttpClient,
{
	/// Exchanges the stored refresh token for a new token set and persists it.
	///
	/// When the server omits a refresh token from its response, the previous one is carried
	/// forward rather than silently dropped. On failure the prior token set is left in place.
	pub async fn refresh_tokens(&self) -> Result<TokenSet> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh_tokens");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.metrics.refresh.record_attempt();

		let result = span
			.instrument(async move {
				let current = self.store.fetch_tokens().await?.ok_or(Error::NoRefreshToken)?;
				let refresh = current.refresh_token.clone().ok_or(Error::NoRefreshToken)?;
				let mut updated = self.facade()?.refresh_token(refresh.expose()).await?;

				if updated.refresh_token.is_none() {
					updated.refresh_token = Some(refresh);
				}

				self.store.save_tokens(updated.clone()).await?;

				Ok(updated)
			})
			.await;

		match &result {
			Ok(_) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Success);
				self.metrics.refresh.record_success();
			},
			Err(_) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				self.metrics.refresh.record_failure();
			},
		}

		result
	}
}
