//! Storage contract for the single session's state.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{PendingAuthorization, TokenSet},
};

/// Future type returned by [`SessionStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend holding the session's token set and pending authorization attempt.
///
/// Each operation is individually atomic, but the session performs no cross-operation locking:
/// two racing refreshes resolve last-writer-wins. This matches the single-user scope of the
/// crate; anything multi-session needs per-session isolation and a mutual-exclusion discipline
/// around the read-modify-write cycles.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the current token set.
	fn save_tokens(&self, tokens: TokenSet) -> StoreFuture<'_, ()>;

	/// Fetches the current token set, if any.
	fn fetch_tokens(&self) -> StoreFuture<'_, Option<TokenSet>>;

	/// Clears the token set, returning the previous value.
	fn clear_tokens(&self) -> StoreFuture<'_, Option<TokenSet>>;

	/// Stores a new pending authorization attempt, returning any displaced one.
	fn put_pending(
		&self,
		pending: PendingAuthorization,
	) -> StoreFuture<'_, Option<PendingAuthorization>>;

	/// Fetches the pending authorization attempt without consuming it.
	fn fetch_pending(&self) -> StoreFuture<'_, Option<PendingAuthorization>>;

	/// Clears the pending authorization attempt, returning the previous value.
	fn clear_pending(&self) -> StoreFuture<'_, Option<PendingAuthorization>>;
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Backend-level failure of the storage engine.
	#[error("Storage backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
