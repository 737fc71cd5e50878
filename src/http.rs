//! Outbound HTTP plumbing shared by the token exchange and the device API.
//!
//! One pooled [`ReqwestClient`] serves every call. It is built with the configured request
//! timeout and never follows redirects. Token exchanges run through [`InstrumentedHandle`], which
//! implements the `oauth2` [`AsyncHttpClient`] contract and remembers the status and a body
//! preview of the last response so a rejected exchange can be reported with both.

// std
use std::ops::Deref;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
use reqwest::redirect::Policy;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, body_preview},
};

/// What the token endpoint answered, kept for error reporting.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code.
	pub status: Option<u16>,
	/// Truncated body, captured for non-success statuses only.
	pub body_preview: Option<String>,
}

/// Shared cell the instrumented handle writes [`ResponseMetadata`] into.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Overwrites the slot.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Empties the slot and returns what it held.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// The crate's pooled HTTP client.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(ReqwestClient);
impl ReqwestHttpClient {
	/// Builds a client that gives up after `timeout` and never follows redirects.
	pub fn with_timeout(timeout: Duration) -> Result<Self, ConfigError> {
		let timeout =
			std::time::Duration::try_from(timeout).map_err(|_| ConfigError::NonPositiveTimeout)?;

		if timeout.is_zero() {
			return Err(ConfigError::NonPositiveTimeout);
		}

		ReqwestClient::builder()
			.timeout(timeout)
			.redirect(Policy::none())
			.build()
			.map(Self)
			.map_err(ConfigError::http_client_build)
	}

	/// `oauth2` adapter reporting into `slot`.
	pub fn instrumented(&self, slot: ResponseMetadataSlot) -> InstrumentedHandle {
		InstrumentedHandle { client: self.0.clone(), slot }
	}
}
impl From<ReqwestClient> for ReqwestHttpClient {
	fn from(client: ReqwestClient) -> Self {
		Self(client)
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// [`AsyncHttpClient`] over reqwest that records [`ResponseMetadata`].
#[derive(Clone, Debug)]
pub struct InstrumentedHandle {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}
impl<'c> AsyncHttpClient<'c> for InstrumentedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			self.slot.take();

			let request = reqwest::Request::try_from(request).map_err(Box::new)?;
			let response = self.client.execute(request).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().clone();
			let body = response.bytes().await.map_err(Box::new)?.to_vec();

			self.slot.store(ResponseMetadata {
				status: Some(status.as_u16()),
				body_preview: (!status.is_success()).then(|| body_preview(&body)),
			});

			let mut translated = HttpResponse::new(body);

			*translated.status_mut() = status;
			*translated.headers_mut() = headers;

			Ok(translated)
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn slot_hands_out_metadata_once() {
		let slot = ResponseMetadataSlot::default();

		slot.store(ResponseMetadata { status: Some(503), body_preview: Some("busy".into()) });

		assert_eq!(
			slot.take(),
			Some(ResponseMetadata { status: Some(503), body_preview: Some("busy".into()) })
		);
		assert_eq!(slot.take(), None);
	}

	#[test]
	fn timeout_must_be_positive() {
		assert!(matches!(
			ReqwestHttpClient::with_timeout(Duration::seconds(-1)),
			Err(ConfigError::NonPositiveTimeout)
		));
		assert!(matches!(
			ReqwestHttpClient::with_timeout(Duration::ZERO),
			Err(ConfigError::NonPositiveTimeout)
		));
		assert!(ReqwestHttpClient::with_timeout(Duration::seconds(5)).is_ok());
	}
}
