//! Callback verification and the authorization-code exchange.

// self
use crate::{
	_prelude::*,
	flows::Session,
	http::SessionHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C> Session<C>
where
	C: ?Sized + SessionHttpClient,
{
	/// Validates the authorization callback and exchanges the code for a token set.
	///
	/// The exchange runs at most once per callback; a failed exchange is surfaced as
	/// [`Error::TokenExchangeFailed`] and never retried.
	pub async fn handle_callback(&self, code: &str, returned_state: &str) -> Result<()> {
		const KIND: FlowKind = FlowKind::Callback;

		let span = FlowSpan::new(KIND, "handle_callback");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let pending = self.store.fetch_pending().await?.ok_or(Error::MissingVerifier)?;

				// A mismatched state leaves the pending attempt in place so the genuine
				// callback can still land.
				if !pending.matches_state(returned_state) {
					return Err(Error::StateMismatch);
				}

				// Authorization codes are single-use; consume the attempt before the exchange
				// so a replayed callback yields MissingVerifier instead of a second exchange.
				let _ = self.store.clear_pending().await?;

				let tokens =
					self.facade()?.exchange_authorization_code(code, pending.verifier()).await?;

				self.store.save_tokens(tokens).await?;

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
