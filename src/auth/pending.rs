//! The single in-flight authorization attempt.

// crates.io
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// CSRF state and PKCE verifier for the one in-flight authorization attempt.
///
/// Both fields are created together when an attempt starts. A new attempt overwrites any
/// previous one, so at most one authorization is ever in flight per session.
#[derive(Clone)]
pub struct PendingAuthorization {
	state: String,
	verifier: TokenSecret,
}
impl PendingAuthorization {
	/// Wraps a state and verifier pair; normally done by the authorization initiator.
	pub fn new(state: impl Into<String>, verifier: impl Into<TokenSecret>) -> Self {
		Self { state: state.into(), verifier: verifier.into() }
	}

	/// Compares a returned state against the stored one in constant time.
	///
	/// Both sides are hashed before the comparison, so the running time depends on neither the
	/// position of the first differing byte nor the lengths of the inputs.
	pub fn matches_state(&self, returned_state: &str) -> bool {
		let expected = Sha256::digest(self.state.as_bytes());
		let returned = Sha256::digest(returned_state.as_bytes());

		bool::from(expected.as_slice().ct_eq(returned.as_slice()))
	}

	/// The state issued for this attempt.
	pub fn state(&self) -> &str {
		&self.state
	}

	pub(crate) fn verifier(&self) -> &str {
		self.verifier.expose()
	}
}
impl Debug for PendingAuthorization {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PendingAuthorization")
			.field("state", &self.state)
			.field("verifier", &self.verifier)
			.finish()
	}
}
