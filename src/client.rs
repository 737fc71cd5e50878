//! Device Control Client: the best-effort facade over the remote device API.
//!
//! One [`DeviceControlClient`] owns the process-wide [`CredentialCache`] for a single API
//! credential pair. Every operation first ensures a valid bearer token: a cached credential is
//! reused while `now < expires_at`, otherwise exactly one caller performs the client-credentials
//! exchange while concurrent callers wait on the refresh guard and then reuse its result. A failed
//! exchange clears the cache, so the next call retries from scratch.
//!
//! The three public operations never fail. [`DeviceControlClient::list_devices`] degrades to an
//! empty list, [`DeviceControlClient::get_device`] to `None`, and
//! [`DeviceControlClient::send_command`] to `false`; each logs the cause at `warn`. Their `try_*`
//! twins return the underlying [`Error`] instead.

// crates.io
use reqwest::{
	Method, RequestBuilder,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialCache},
	clock::{Clock, SystemClock},
	config::DeviceApiConfig,
	device::{
		action::{ActionDocument, DeviceAction},
		remote::{DeviceDocument, DeviceListDocument},
		status::DeviceStatus,
		translate::{translate_device, translate_list},
	},
	error::{TransportError, body_preview},
	http::ReqwestHttpClient,
	oauth::TokenIssuer,
	obs::{self, OpKind, OpOutcome, OpSpan, TokenMetrics},
};

/// Media type of JSON:API documents.
pub const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";
/// Header naming the identity provider behind the bearer token.
pub const PROVIDER_HEADER: &str = "Authorization-Provider";
/// Header carrying the application key.
pub const API_KEY_HEADER: &str = "X-Api-Key";

const TARGET: &str = "device API";

/// Facade exposing device listing, single-device status, and control commands.
pub struct DeviceControlClient {
	config: DeviceApiConfig,
	http: ReqwestHttpClient,
	cache: CredentialCache,
	refresh_guard: AsyncMutex<()>,
	clock: Arc<dyn Clock>,
	token_metrics: TokenMetrics,
}
impl DeviceControlClient {
	/// Creates a client driven by the system clock.
	///
	/// Missing credentials do not fail construction; they are logged here and every later token
	/// exchange fails fast until the configuration is fixed.
	pub fn new(config: DeviceApiConfig) -> Result<Self> {
		Self::with_clock(config, Arc::new(SystemClock))
	}

	/// Creates a client driven by `clock`.
	pub fn with_clock(config: DeviceApiConfig, clock: Arc<dyn Clock>) -> Result<Self> {
		let http = ReqwestHttpClient::with_timeout(config.request_timeout)?;

		Ok(Self::with_http_client(config, http, clock))
	}

	/// Creates a client on top of a caller-supplied HTTP client.
	pub fn with_http_client(
		config: DeviceApiConfig,
		http: ReqwestHttpClient,
		clock: Arc<dyn Clock>,
	) -> Self {
		if let Err(err) = config.ensure_credentials() {
			tracing::warn!(
				error = %err,
				"Device API credentials are incomplete; token exchanges will fail until configured."
			);
		}

		Self {
			config,
			http,
			cache: CredentialCache::default(),
			refresh_guard: AsyncMutex::new(()),
			clock,
			token_metrics: TokenMetrics::default(),
		}
	}

	/// Active configuration.
	pub fn config(&self) -> &DeviceApiConfig {
		&self.config
	}

	/// Token cache counters.
	pub fn token_metrics(&self) -> &TokenMetrics {
		&self.token_metrics
	}

	/// Returns a credential valid at the current instant, exchanging a new one if needed.
	pub async fn ensure_token(&self) -> Result<Credential> {
		if let Some(credential) = self.cache.valid_at(self.clock.now()) {
			self.token_metrics.record_reuse();

			return Ok(credential);
		}

		let _singleflight = self.refresh_guard.lock().await;

		// Another caller may have refreshed while this one waited.
		if let Some(credential) = self.cache.valid_at(self.clock.now()) {
			self.token_metrics.record_reuse();

			return Ok(credential);
		}

		let result = observe(OpKind::TokenRefresh, None, async {
			let issuer = TokenIssuer::from_config(&self.config, self.http.clone())?;

			issuer.exchange(self.clock.as_ref()).await
		})
		.await;

		match result {
			Ok(credential) => {
				self.cache.set(credential.clone());
				self.token_metrics.record_exchange();

				Ok(credential)
			},
			Err(err) => {
				self.cache.clear();
				self.token_metrics.record_failure();

				tracing::warn!(error = %err, "Device API token exchange failed.");

				Err(err)
			},
		}
	}

	/// Eagerly obtains a token so the first dashboard request does not pay for the exchange.
	///
	/// Returns whether a valid token is now cached.
	pub async fn warm_up(&self) -> bool {
		self.ensure_token().await.is_ok()
	}

	/// Lists every device visible to the configured credential pair.
	///
	/// Entries that fail translation are dropped; the rest keep their remote order.
	pub async fn try_list_devices(&self) -> Result<Vec<DeviceStatus>> {
		observe(OpKind::ListDevices, None, async {
			let url = self.config.devices_endpoint()?;
			let request = self.authorized(Method::GET, url).await?;
			let body = self.execute(request).await?;
			let document: DeviceListDocument = parse_document(&body)?;
			let total = document.data.len();
			let list = translate_list(document.data, &self.config.manufacturer_fallback);

			tracing::debug!(total, kept = list.devices.len(), "Listed devices.");

			Ok(list.devices)
		})
		.await
	}

	/// Best-effort [`Self::try_list_devices`]; any failure yields an empty list.
	pub async fn list_devices(&self) -> Vec<DeviceStatus> {
		match self.try_list_devices().await {
			Ok(devices) => devices,
			Err(err) => {
				tracing::warn!(error = %err, "Listing devices failed; returning an empty list.");

				Vec::new()
			},
		}
	}

	/// Fetches and translates a single device.
	pub async fn try_get_device(&self, device_id: &str) -> Result<DeviceStatus> {
		let device_id = non_blank_id(device_id)?;

		observe(OpKind::GetDevice, Some(device_id), async {
			let url = self.config.device_endpoint(device_id)?;
			let request = self.authorized(Method::GET, url).await?;
			let body = self.execute(request).await?;
			let document: DeviceDocument = parse_document(&body)?;

			Ok(translate_device(document.data, &self.config.manufacturer_fallback)?)
		})
		.await
	}

	/// Best-effort [`Self::try_get_device`]; any failure yields `None`.
	pub async fn get_device(&self, device_id: &str) -> Option<DeviceStatus> {
		match self.try_get_device(device_id).await {
			Ok(status) => Some(status),
			Err(err) => {
				tracing::warn!(device_id, error = %err, "Fetching device failed.");

				None
			},
		}
	}

	/// Sends `action` to a device.
	///
	/// Duration-bound actions use `duration_minutes` or the configured default; other actions
	/// ignore it. Invalid input is rejected before any request is made.
	pub async fn try_send_command(
		&self,
		device_id: &str,
		action: DeviceAction,
		duration_minutes: Option<u32>,
	) -> Result<()> {
		let device_id = non_blank_id(device_id)?;

		observe(OpKind::SendCommand, Some(device_id), async {
			let document =
				ActionDocument::new(action, duration_minutes, self.config.default_duration_minutes)?;

			if duration_minutes.is_some() && !action.is_duration_bound() {
				tracing::debug!(%action, "Ignoring duration for an action that does not take one.");
			}

			let url = self.config.actions_endpoint(device_id)?;
			let request = self
				.authorized(Method::POST, url)
				.await?
				.header(CONTENT_TYPE, JSON_API_MEDIA_TYPE)
				.json(&document);

			self.execute(request).await?;

			tracing::info!(%action, "Device accepted command.");

			Ok(())
		})
		.await
	}

	/// Best-effort [`Self::try_send_command`]; returns whether the device API accepted it.
	pub async fn send_command(
		&self,
		device_id: &str,
		action: DeviceAction,
		duration_minutes: Option<u32>,
	) -> bool {
		match self.try_send_command(device_id, action, duration_minutes).await {
			Ok(()) => true,
			Err(err) => {
				tracing::warn!(device_id, %action, error = %err, "Sending command failed.");

				false
			},
		}
	}

	async fn authorized(&self, method: Method, url: Url) -> Result<RequestBuilder> {
		let credential = self.ensure_token().await?;

		tracing::debug!(%method, %url, "Calling device API.");

		let mut request = self
			.http
			.request(method, url)
			.header(AUTHORIZATION, credential.bearer_header())
			.header(PROVIDER_HEADER, self.config.provider.as_str())
			.header(ACCEPT, JSON_API_MEDIA_TYPE);

		if let Some(api_key) = self.config.api_key.as_deref() {
			request = request.header(API_KEY_HEADER, api_key);
		}

		Ok(request)
	}

	async fn execute(&self, request: RequestBuilder) -> Result<Vec<u8>> {
		let response =
			request.send().await.map_err(|err| TransportError::from_reqwest(TARGET, err))?;
		let status = response.status();
		let body =
			response.bytes().await.map_err(|err| TransportError::from_reqwest(TARGET, err))?;

		if !status.is_success() {
			return Err(Error::Remote { status: status.as_u16(), body: body_preview(&body) });
		}

		Ok(body.to_vec())
	}
}
impl Debug for DeviceControlClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DeviceControlClient")
			.field("api_base_url", &self.config.api_base_url.as_str())
			.field("cached", &self.cache.get().is_some())
			.field("token_metrics", &self.token_metrics)
			.finish_non_exhaustive()
	}
}

async fn observe<T, Fut>(kind: OpKind, device_id: Option<&str>, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = OpSpan::new(kind, device_id);

	obs::record_op_outcome(kind, OpOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => obs::record_op_outcome(kind, OpOutcome::Success),
		Err(_) => obs::record_op_outcome(kind, OpOutcome::Failure),
	}

	result
}

fn parse_document<T>(body: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| Error::Envelope { source })
}

fn non_blank_id(device_id: &str) -> Result<&str> {
	let trimmed = device_id.trim();

	if trimmed.is_empty() { Err(Error::BlankDeviceId) } else { Ok(trimmed) }
}
