//! Single-session OAuth 2.0 Authorization Code + PKCE client. Covers token acquisition,
//! transparent refresh-and-retry against a protected resource, and revocation for one user at a
//! time.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod store;
#[cfg(feature = "reqwest")]
pub mod _preludet {
	//! Test-oriented prelude with helpers for reqwest-backed integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::ClientConfig,
		flows::Session,
		http::ReqwestHttpClient,
		store::{MemoryStore, SessionStore},
	};

	/// Session type used by reqwest-backed integration tests.
	pub type ReqwestTestSession = Session<ReqwestHttpClient>;

	/// Constructs a [`Session`] backed by an in-memory store and the default reqwest transport,
	/// returning the concrete store so tests can seed and inspect session state directly.
	pub fn build_reqwest_test_session(
		config: ClientConfig,
	) -> (ReqwestTestSession, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn SessionStore> = store_backend.clone();
		let session = Session::with_http_client(store, config, ReqwestHttpClient::default());

		(session, store_backend)
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")] pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _, tokio as _};
