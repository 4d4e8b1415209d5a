//! Thread-safe in-memory [`SessionStore`]; nothing survives a restart.

// self
use crate::{
	_prelude::*,
	auth::{PendingAuthorization, TokenSet},
	store::{SessionStore, StoreFuture},
};

#[derive(Clone, Debug, Default)]
struct SessionState {
	tokens: Option<TokenSet>,
	pending: Option<PendingAuthorization>,
}

/// In-process storage backend used by demos and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<SessionState>>);
impl SessionStore for MemoryStore {
	fn save_tokens(&self, tokens: TokenSet) -> StoreFuture<'_, ()> {
		let state = self.0.clone();

		Box::pin(async move {
			state.write().tokens = Some(tokens);

			Ok(())
		})
	}

	fn fetch_tokens(&self) -> StoreFuture<'_, Option<TokenSet>> {
		let state = self.0.clone();

		Box::pin(async move { Ok(state.read().tokens.clone()) })
	}

	fn clear_tokens(&self) -> StoreFuture<'_, Option<TokenSet>> {
		let state = self.0.clone();

		Box::pin(async move { Ok(state.write().tokens.take()) })
	}

	fn put_pending(
		&self,
		pending: PendingAuthorization,
	) -> StoreFuture<'_, Option<PendingAuthorization>> {
		let state = self.0.clone();

		Box::pin(async move { Ok(state.write().pending.replace(pending)) })
	}

	fn fetch_pending(&self) -> StoreFuture<'_, Option<PendingAuthorization>> {
		let state = self.0.clone();

		Box::pin(async move { Ok(state.read().pending.clone()) })
	}

	fn clear_pending(&self) -> StoreFuture<'_, Option<PendingAuthorization>> {
		let state = self.0.clone();

		Box::pin(async move { Ok(state.write().pending.take()) })
	}
}
