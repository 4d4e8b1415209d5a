//! Opaque wrapper keeping token material out of logs.

// self
use crate::_prelude::*;

/// Secret string whose `Debug` and `Display` output is always redacted.
///
/// Reading the inner value requires an explicit [`expose`](Self::expose) call at the use site,
/// which keeps accidental leaks visible in review.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a secret value.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the protected value.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Whether the wrapped value is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl From<&str> for TokenSecret {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
impl From<String> for TokenSecret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "TokenSecret(\"<redacted>\")")
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn debug_and_display_redact_the_value() {
		let secret = TokenSecret::new("super-secret-access-token");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn expose_returns_the_wrapped_value() {
		let secret = TokenSecret::from("value-1");

		assert_eq!(secret.expose(), "value-1");
		assert!(!secret.is_empty());
		assert!(TokenSecret::new("").is_empty());
	}
}
