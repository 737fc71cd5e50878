//! Redacting wrapper for client secrets and bearer tokens.

// self
use crate::_prelude::*;

const REDACTED: &str = "<redacted>";

/// Sensitive string whose formatters never print the value.
///
/// Deserializes from a bare string so it can sit directly in configuration structs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps `value`.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Plain value, for building requests only.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Whether the value is empty once surrounding whitespace is ignored.
	pub fn is_blank(&self) -> bool {
		self.0.trim().is_empty()
	}
}
impl From<String> for TokenSecret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl From<&str> for TokenSecret {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "TokenSecret({REDACTED})")
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(REDACTED)
	}
}
