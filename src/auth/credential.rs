//! Bearer credential issued by the client-credentials exchange, with lifecycle helpers.

// self
use crate::{_prelude::*, auth::secret::TokenSecret};

/// Fraction of the upstream `expires_in` that a credential is trusted for, as
/// `numerator / denominator`.
pub const EXPIRY_SAFETY_RATIO: (i64, i64) = (4, 5);

/// Lifecycle status of a credential at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialStatus {
	/// Usable for request building.
	Valid,
	/// Past its effective expiry; must be refreshed before use.
	Expired,
}

/// Errors produced by [`CredentialBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CredentialBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when no expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
	/// Issued when the relative lifetime is zero or negative.
	#[error("Token lifetime must be positive.")]
	NonPositiveLifetime,
	/// Issued when the effective expiry falls outside the representable date range.
	#[error("Token lifetime pushes the expiry out of range.")]
	LifetimeOutOfRange,
}

/// Immutable bearer credential plus its effective expiry instant.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
	/// Bearer token; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Instant the exchange completed.
	pub issued_at: OffsetDateTime,
	/// Effective expiry: `issued_at + 0.8 × expires_in` when built from a lifetime.
	pub expires_at: OffsetDateTime,
}
impl Credential {
	/// Returns a builder for constructing credentials.
	pub fn builder() -> CredentialBuilder {
		CredentialBuilder::default()
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> CredentialStatus {
		if instant < self.expires_at { CredentialStatus::Valid } else { CredentialStatus::Expired }
	}

	/// Returns `true` if the credential may still be used at `instant`.
	pub fn is_valid_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), CredentialStatus::Valid)
	}

	/// Renders the `Authorization` header value.
	pub fn bearer_header(&self) -> String {
		format!("Bearer {}", self.access_token.expose())
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("access_token", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Builder for [`Credential`].
#[derive(Clone, Debug, Default)]
pub struct CredentialBuilder {
	access_token: Option<TokenSecret>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl CredentialBuilder {
	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets the issued-at instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute effective expiry instant, bypassing the safety ratio.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets the upstream lifetime; the effective expiry applies [`EXPIRY_SAFETY_RATIO`].
	pub fn expires_in(mut self, lifetime: Duration) -> Self {
		self.expires_in = Some(lifetime);

		self
	}

	/// Consumes the builder and produces a [`Credential`].
	pub fn build(self) -> Result<Credential, CredentialBuilderError> {
		let access_token = self.access_token.ok_or(CredentialBuilderError::MissingAccessToken)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(lifetime)) => issued_at
				.checked_add(trusted_lifetime(lifetime)?)
				.ok_or(CredentialBuilderError::LifetimeOutOfRange)?,
			(None, None) => return Err(CredentialBuilderError::MissingExpiry),
		};

		Ok(Credential { access_token, issued_at, expires_at })
	}
}

/// Scales an upstream lifetime by [`EXPIRY_SAFETY_RATIO`] with millisecond precision.
pub fn trusted_lifetime(lifetime: Duration) -> Result<Duration, CredentialBuilderError> {
	if !lifetime.is_positive() {
		return Err(CredentialBuilderError::NonPositiveLifetime);
	}

	let (num, den) = EXPIRY_SAFETY_RATIO;
	let millis = i64::try_from(lifetime.whole_milliseconds()).unwrap_or(i64::MAX);

	Ok(Duration::milliseconds(millis / den * num + millis % den * num / den))
}
