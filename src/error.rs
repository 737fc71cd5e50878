//! Crate-level error types shared by the token issuer, translator, and device client.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Maximum number of bytes kept from an upstream error body.
pub const BODY_PREVIEW_LIMIT: usize = 512;

/// Canonical error exposed by the fallible `try_*` APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token endpoint refused or garbled the client-credentials exchange.
	#[error(transparent)]
	AuthExchange(#[from] AuthExchangeError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// A single device resource could not be translated.
	#[error(transparent)]
	Translation(#[from] TranslationError),

	/// Device API answered with a non-success status.
	#[error("Device API returned HTTP {status}: {body}.")]
	Remote {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body: String,
	},
	/// Caller passed an empty or whitespace-only device id.
	#[error("Device id must not be blank.")]
	BlankDeviceId,
	/// Caller asked for an action duration outside the accepted range.
	#[error("Action duration must be within 1..={max} minutes, got {minutes}.")]
	InvalidDuration {
		/// Rejected value.
		minutes: u32,
		/// Inclusive upper bound.
		max: u32,
	},
	/// Device API answered 2xx but the envelope did not match the expected document shape.
	#[error("Device API returned an unexpected document.")]
	Envelope {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Client id (or API key) is not configured.
	#[error("Device API client id is not configured.")]
	MissingClientId,
	/// Client secret is not configured.
	#[error("Device API client secret is not configured.")]
	MissingClientSecret,
	/// A configured base URL cannot be parsed.
	#[error("The {field} URL is invalid.")]
	InvalidUrl {
		/// Which configuration field failed.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A configured base URL cannot carry path segments (e.g. `mailto:`).
	#[error("The {field} URL cannot be used as a base: {url}.")]
	CannotBeABase {
		/// Which configuration field failed.
		field: &'static str,
		/// Offending URL.
		url: String,
	},
	/// Request timeout must be positive.
	#[error("Request timeout must be positive.")]
	NonPositiveTimeout,
	/// Configured default action duration is outside the accepted range.
	#[error("Default action duration must be within 1..={max} minutes, got {minutes}.")]
	DurationOutOfRange {
		/// Rejected value.
		minutes: u32,
		/// Inclusive upper bound.
		max: u32,
	},
	/// Configuration providers could not be merged or extracted.
	#[error("Configuration could not be loaded.")]
	Load(#[from] Box<figment::Error>),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<figment::Error> for ConfigError {
	fn from(e: figment::Error) -> Self {
		Self::Load(Box::new(e))
	}
}

/// Failures of the client-credentials exchange.
#[derive(Debug, ThisError)]
pub enum AuthExchangeError {
	/// Token endpoint returned a non-success status.
	#[error("Token endpoint returned HTTP {status}: {body}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body: String,
	},
	/// Token endpoint responded 2xx with a body that is not a token response.
	#[error("Token endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint returned something the OAuth client could not classify.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	Unexpected {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned a non-positive duration.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
}
impl AuthExchangeError {
	/// Returns the HTTP status attached to the failure, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Rejected { status, .. } => Some(*status),
			Self::MalformedResponse { status, .. } | Self::Unexpected { status, .. } => *status,
			_ => None,
		}
	}
}

/// Transport-level failures (network, IO, timeout).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {target}.")]
	Network {
		/// Which upstream was being called.
		target: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request did not complete within the configured timeout.
	#[error("Request to {target} timed out.")]
	Timeout {
		/// Which upstream was being called.
		target: &'static str,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during transport.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Classifies a reqwest failure as a timeout or generic network error.
	pub fn from_reqwest(target: &'static str, err: ReqwestError) -> Self {
		if err.is_timeout() {
			Self::Timeout { target }
		} else {
			Self::Network { target, source: Box::new(err) }
		}
	}
}

/// Per-record failure raised while translating one remote device resource.
#[derive(Debug, ThisError)]
#[error("Device {} could not be translated at `{path}`: {reason}.", .device_id.as_deref().unwrap_or("<unknown>"))]
pub struct TranslationError {
	/// Remote device id, when the entry carried one.
	pub device_id: Option<String>,
	/// JSON path of the offending field.
	pub path: String,
	/// Human-readable reason.
	pub reason: String,
}
impl TranslationError {
	pub(crate) fn new(
		device_id: Option<&str>,
		path: impl Into<String>,
		reason: impl Into<String>,
	) -> Self {
		Self { device_id: device_id.map(str::to_owned), path: path.into(), reason: reason.into() }
	}
}

/// Shortens an upstream body to at most [`BODY_PREVIEW_LIMIT`] bytes on a char boundary.
pub(crate) fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);

	if text.len() <= BODY_PREVIEW_LIMIT {
		return text.into_owned();
	}

	let mut end = BODY_PREVIEW_LIMIT;

	while !text.is_char_boundary(end) {
		end -= 1;
	}

	format!("{}…", &text[..end])
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn body_preview_truncates_on_char_boundary() {
		let short = body_preview(b"{\"error\":\"invalid_client\"}");

		assert_eq!(short, "{\"error\":\"invalid_client\"}");

		let long = "é".repeat(BODY_PREVIEW_LIMIT);
		let preview = body_preview(long.as_bytes());

		assert!(preview.ends_with('…'));
		assert!(preview.len() <= BODY_PREVIEW_LIMIT + '…'.len_utf8());
	}

	#[test]
	fn translation_error_mentions_device_and_path() {
		let err = TranslationError::new(Some("mower-1"), "attributes.battery", "missing field");

		assert_eq!(
			err.to_string(),
			"Device mower-1 could not be translated at `attributes.battery`: missing field."
		);

		let anonymous = TranslationError::new(None, "id", "missing field");

		assert!(anonymous.to_string().starts_with("Device <unknown>"));
	}
}
