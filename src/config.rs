//! Device-API configuration: endpoints, credentials, and request policy.
//!
//! Values are usually loaded with [`DeviceApiConfig::from_env`], which layers built-in defaults
//! under `AUTOMOWER_*` environment variables, and are validated by [`DeviceApiConfigBuilder`].
//! Missing credentials are deliberately *not* a validation failure: the client stays
//! constructible and reports [`ConfigError::MissingClientId`] or
//! [`ConfigError::MissingClientSecret`] each time it needs a token.

// crates.io
use figment::{
	Figment,
	providers::{Env, Serialized},
};
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Default authentication base; the token endpoint lives at `<base>/oauth2/token`.
pub const DEFAULT_AUTH_BASE_URL: &str = "https://api.authentication.husqvarnagroup.dev/v1";
/// Default device API base; mowers live at `<base>/mowers`.
pub const DEFAULT_API_BASE_URL: &str = "https://api.amc.husqvarna.dev/v1";
/// Default value of the `Authorization-Provider` header.
pub const DEFAULT_PROVIDER: &str = "husqvarna";
/// Default manufacturer used when a device resource does not report one.
pub const DEFAULT_MANUFACTURER: &str = "Husqvarna";
/// Default duration for duration-bound actions.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;
/// Upper bound for any action duration (one day).
pub const MAX_DURATION_MINUTES: u32 = 1_440;
/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
/// Prefix for environment variables read by [`DeviceApiConfig::from_env`].
pub const ENV_PREFIX: &str = "AUTOMOWER_";

/// Raw, unvalidated settings as extracted from configuration providers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceApiSettings {
	/// OAuth client id; falls back to `api_key` when absent.
	pub client_id: Option<String>,
	/// OAuth client secret.
	pub client_secret: Option<TokenSecret>,
	/// Value of the `X-Api-Key` header; falls back to `client_id` when absent.
	pub api_key: Option<String>,
	/// Authentication base URL.
	pub auth_base_url: String,
	/// Device API base URL.
	pub api_base_url: String,
	/// Value of the `Authorization-Provider` header.
	pub provider: String,
	/// Default duration applied to duration-bound actions.
	pub default_duration_minutes: u32,
	/// Per-request timeout in seconds.
	pub request_timeout_secs: u64,
	/// Manufacturer reported when the remote resource omits it.
	pub manufacturer_fallback: String,
}
impl Default for DeviceApiSettings {
	fn default() -> Self {
		Self {
			client_id: None,
			client_secret: None,
			api_key: None,
			auth_base_url: DEFAULT_AUTH_BASE_URL.into(),
			api_base_url: DEFAULT_API_BASE_URL.into(),
			provider: DEFAULT_PROVIDER.into(),
			default_duration_minutes: DEFAULT_DURATION_MINUTES,
			request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
			manufacturer_fallback: DEFAULT_MANUFACTURER.into(),
		}
	}
}

/// Validated configuration consumed by the token issuer and device client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceApiConfig {
	/// OAuth client id (already resolved against `api_key`).
	pub client_id: Option<String>,
	/// OAuth client secret.
	pub client_secret: Option<TokenSecret>,
	/// `X-Api-Key` header value (already resolved against `client_id`).
	pub api_key: Option<String>,
	/// Authentication base URL.
	pub auth_base_url: Url,
	/// Device API base URL.
	pub api_base_url: Url,
	/// `Authorization-Provider` header value.
	pub provider: String,
	/// Default duration applied to duration-bound actions.
	pub default_duration_minutes: u32,
	/// Per-request timeout.
	pub request_timeout: Duration,
	/// Manufacturer reported when the remote resource omits it.
	pub manufacturer_fallback: String,
}
impl DeviceApiConfig {
	/// Creates a builder seeded with the built-in defaults.
	pub fn builder() -> DeviceApiConfigBuilder {
		DeviceApiConfigBuilder::default()
	}

	/// Loads configuration from `AUTOMOWER_*` environment variables over the defaults.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_figment(Figment::new().merge(Env::prefixed(ENV_PREFIX)))
	}

	/// Extracts and validates configuration from an arbitrary figment, layering it over the
	/// built-in defaults.
	pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
		let settings: DeviceApiSettings =
			Figment::from(Serialized::defaults(DeviceApiSettings::default()))
				.merge(figment)
				.extract()?;

		DeviceApiConfigBuilder::from_settings(settings)?.build()
	}

	/// Verifies that both halves of the client credential pair are present.
	pub fn ensure_credentials(&self) -> Result<(&str, &TokenSecret), ConfigError> {
		let client_id = self
			.client_id
			.as_deref()
			.filter(|value| !value.trim().is_empty())
			.ok_or(ConfigError::MissingClientId)?;
		let client_secret = self
			.client_secret
			.as_ref()
			.filter(|secret| !secret.is_blank())
			.ok_or(ConfigError::MissingClientSecret)?;

		Ok((client_id, client_secret))
	}

	/// `<auth-base>/oauth2/token`.
	pub fn token_endpoint(&self) -> Result<Url, ConfigError> {
		endpoint("auth_base_url", &self.auth_base_url, &["oauth2", "token"])
	}

	/// `<api-base>/mowers`.
	pub fn devices_endpoint(&self) -> Result<Url, ConfigError> {
		endpoint("api_base_url", &self.api_base_url, &["mowers"])
	}

	/// `<api-base>/mowers/{id}`; the id is percent-encoded as a single path segment.
	pub fn device_endpoint(&self, device_id: &str) -> Result<Url, ConfigError> {
		endpoint("api_base_url", &self.api_base_url, &["mowers", device_id])
	}

	/// `<api-base>/mowers/{id}/actions`.
	pub fn actions_endpoint(&self, device_id: &str) -> Result<Url, ConfigError> {
		endpoint("api_base_url", &self.api_base_url, &["mowers", device_id, "actions"])
	}
}

/// Builder for [`DeviceApiConfig`] values.
#[derive(Clone, Debug)]
pub struct DeviceApiConfigBuilder {
	client_id: Option<String>,
	client_secret: Option<TokenSecret>,
	api_key: Option<String>,
	auth_base_url: Option<Url>,
	api_base_url: Option<Url>,
	provider: String,
	default_duration_minutes: u32,
	request_timeout: Duration,
	manufacturer_fallback: String,
}
impl DeviceApiConfigBuilder {
	/// Seeds a builder from raw settings, parsing the base URLs.
	pub fn from_settings(settings: DeviceApiSettings) -> Result<Self, ConfigError> {
		let auth_base_url = parse_url("auth_base_url", &settings.auth_base_url)?;
		let api_base_url = parse_url("api_base_url", &settings.api_base_url)?;
		let request_timeout = Duration::seconds(
			i64::try_from(settings.request_timeout_secs).map_err(|_| ConfigError::NonPositiveTimeout)?,
		);

		Ok(Self {
			client_id: settings.client_id,
			client_secret: settings.client_secret,
			api_key: settings.api_key,
			auth_base_url: Some(auth_base_url),
			api_base_url: Some(api_base_url),
			provider: settings.provider,
			default_duration_minutes: settings.default_duration_minutes,
			request_timeout,
			manufacturer_fallback: settings.manufacturer_fallback,
		})
	}

	/// Sets the OAuth client id.
	pub fn client_id(mut self, value: impl Into<String>) -> Self {
		self.client_id = Some(value.into());

		self
	}

	/// Sets the OAuth client secret.
	pub fn client_secret(mut self, value: impl Into<String>) -> Self {
		self.client_secret = Some(TokenSecret::new(value));

		self
	}

	/// Sets the `X-Api-Key` header value.
	pub fn api_key(mut self, value: impl Into<String>) -> Self {
		self.api_key = Some(value.into());

		self
	}

	/// Overrides the authentication base URL.
	pub fn auth_base_url(mut self, url: Url) -> Self {
		self.auth_base_url = Some(url);

		self
	}

	/// Overrides the device API base URL.
	pub fn api_base_url(mut self, url: Url) -> Self {
		self.api_base_url = Some(url);

		self
	}

	/// Overrides the `Authorization-Provider` header value.
	pub fn provider(mut self, value: impl Into<String>) -> Self {
		self.provider = value.into();

		self
	}

	/// Overrides the default duration for duration-bound actions.
	pub fn default_duration_minutes(mut self, minutes: u32) -> Self {
		self.default_duration_minutes = minutes;

		self
	}

	/// Overrides the per-request timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Overrides the manufacturer fallback.
	pub fn manufacturer_fallback(mut self, value: impl Into<String>) -> Self {
		self.manufacturer_fallback = value.into();

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<DeviceApiConfig, ConfigError> {
		if !self.request_timeout.is_positive() {
			return Err(ConfigError::NonPositiveTimeout);
		}

		validate_duration(self.default_duration_minutes)?;

		let auth_base_url = match self.auth_base_url {
			Some(url) => url,
			None => parse_url("auth_base_url", DEFAULT_AUTH_BASE_URL)?,
		};
		let api_base_url = match self.api_base_url {
			Some(url) => url,
			None => parse_url("api_base_url", DEFAULT_API_BASE_URL)?,
		};

		validate_base("auth_base_url", &auth_base_url)?;
		validate_base("api_base_url", &api_base_url)?;

		let client_id = non_blank(self.client_id).or_else(|| non_blank(self.api_key.clone()));
		let api_key = non_blank(self.api_key).or_else(|| client_id.clone());

		Ok(DeviceApiConfig {
			client_id,
			client_secret: self.client_secret,
			api_key,
			auth_base_url,
			api_base_url,
			provider: self.provider,
			default_duration_minutes: self.default_duration_minutes,
			request_timeout: self.request_timeout,
			manufacturer_fallback: self.manufacturer_fallback,
		})
	}
}
impl Default for DeviceApiConfigBuilder {
	fn default() -> Self {
		Self {
			client_id: None,
			client_secret: None,
			api_key: None,
			auth_base_url: None,
			api_base_url: None,
			provider: DEFAULT_PROVIDER.into(),
			default_duration_minutes: DEFAULT_DURATION_MINUTES,
			request_timeout: Duration::seconds(DEFAULT_REQUEST_TIMEOUT_SECS as i64),
			manufacturer_fallback: DEFAULT_MANUFACTURER.into(),
		}
	}
}

/// Rejects durations outside `1..=MAX_DURATION_MINUTES`.
pub fn validate_duration(minutes: u32) -> Result<u32, ConfigError> {
	if (1..=MAX_DURATION_MINUTES).contains(&minutes) {
		Ok(minutes)
	} else {
		Err(ConfigError::DurationOutOfRange { minutes, max: MAX_DURATION_MINUTES })
	}
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { field, source })
}

fn validate_base(field: &'static str, url: &Url) -> Result<(), ConfigError> {
	if url.cannot_be_a_base() {
		Err(ConfigError::CannotBeABase { field, url: url.to_string() })
	} else {
		Ok(())
	}
}

fn non_blank(value: Option<String>) -> Option<String> {
	value.filter(|v| !v.trim().is_empty())
}

fn endpoint(field: &'static str, base: &Url, segments: &[&str]) -> Result<Url, ConfigError> {
	let mut url = base.clone();

	url.path_segments_mut()
		.map_err(|_| ConfigError::CannotBeABase { field, url: base.to_string() })?
		.pop_if_empty()
		.extend(segments);

	Ok(url)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse test URL.")
	}

	#[test]
	fn defaults_point_at_public_endpoints() {
		let config = DeviceApiConfig::builder().build().expect("Default config should validate.");

		assert_eq!(
			config.token_endpoint().expect("Token endpoint should build.").as_str(),
			"https://api.authentication.husqvarnagroup.dev/v1/oauth2/token"
		);
		assert_eq!(
			config.devices_endpoint().expect("Devices endpoint should build.").as_str(),
			"https://api.amc.husqvarna.dev/v1/mowers"
		);
		assert_eq!(config.provider, DEFAULT_PROVIDER);
		assert_eq!(config.default_duration_minutes, DEFAULT_DURATION_MINUTES);
		assert_eq!(config.request_timeout, Duration::seconds(10));
	}

	#[test]
	fn endpoints_respect_trailing_slashes_and_escape_ids() {
		let config = DeviceApiConfig::builder()
			.api_base_url(url("http://localhost:8080/v1/"))
			.build()
			.expect("Config should validate.");

		assert_eq!(
			config.actions_endpoint("a/b c").expect("Actions endpoint should build.").as_str(),
			"http://localhost:8080/v1/mowers/a%2Fb%20c/actions"
		);
		assert_eq!(
			config.device_endpoint("m-1").expect("Device endpoint should build.").as_str(),
			"http://localhost:8080/v1/mowers/m-1"
		);
	}

	#[test]
	fn api_key_and_client_id_alias_each_other() {
		let from_key = DeviceApiConfig::builder()
			.api_key("app-key")
			.build()
			.expect("Config should validate.");

		assert_eq!(from_key.client_id.as_deref(), Some("app-key"));
		assert_eq!(from_key.api_key.as_deref(), Some("app-key"));

		let from_id = DeviceApiConfig::builder()
			.client_id("client")
			.build()
			.expect("Config should validate.");

		assert_eq!(from_id.api_key.as_deref(), Some("client"));

		let both = DeviceApiConfig::builder()
			.client_id("client")
			.api_key("key")
			.build()
			.expect("Config should validate.");

		assert_eq!(both.client_id.as_deref(), Some("client"));
		assert_eq!(both.api_key.as_deref(), Some("key"));
	}

	#[test]
	fn missing_credentials_are_reported_lazily() {
		let config = DeviceApiConfig::builder().build().expect("Config should validate.");

		assert!(matches!(config.ensure_credentials(), Err(ConfigError::MissingClientId)));

		let config = DeviceApiConfig::builder()
			.client_id("client")
			.client_secret("   ")
			.build()
			.expect("Config should validate.");

		assert!(matches!(config.ensure_credentials(), Err(ConfigError::MissingClientSecret)));

		let config = DeviceApiConfig::builder()
			.client_id("client")
			.client_secret("secret")
			.build()
			.expect("Config should validate.");
		let (id, secret) = config.ensure_credentials().expect("Credentials should be present.");

		assert_eq!(id, "client");
		assert_eq!(secret.expose(), "secret");
	}

	#[test]
	fn builder_rejects_invalid_policy() {
		assert!(matches!(
			DeviceApiConfig::builder().default_duration_minutes(0).build(),
			Err(ConfigError::DurationOutOfRange { minutes: 0, .. })
		));
		assert!(matches!(
			DeviceApiConfig::builder().default_duration_minutes(MAX_DURATION_MINUTES + 1).build(),
			Err(ConfigError::DurationOutOfRange { .. })
		));
		assert!(matches!(
			DeviceApiConfig::builder().request_timeout(Duration::ZERO).build(),
			Err(ConfigError::NonPositiveTimeout)
		));
		assert!(matches!(
			DeviceApiConfig::builder().api_base_url(url("mailto:ops@example.com")).build(),
			Err(ConfigError::CannotBeABase { field: "api_base_url", .. })
		));
	}

	#[test]
	fn figment_layers_override_defaults() {
		let figment = Figment::new()
			.merge(Serialized::default("client_id", "figment-client"))
			.merge(Serialized::default("client_secret", "figment-secret"))
			.merge(Serialized::default("default_duration_minutes", 45))
			.merge(Serialized::default("api_base_url", "http://127.0.0.1:9000/v1"));
		let config = DeviceApiConfig::from_figment(figment).expect("Figment config should load.");

		assert_eq!(config.client_id.as_deref(), Some("figment-client"));
		assert_eq!(config.api_key.as_deref(), Some("figment-client"));
		assert_eq!(
			config.client_secret.as_ref().map(TokenSecret::expose),
			Some("figment-secret")
		);
		assert_eq!(config.default_duration_minutes, 45);
		assert_eq!(config.api_base_url.as_str(), "http://127.0.0.1:9000/v1");
		assert_eq!(config.auth_base_url.as_str(), DEFAULT_AUTH_BASE_URL);
	}

	#[test]
	fn figment_rejects_unparsable_urls() {
		let figment = Figment::new().merge(Serialized::default("auth_base_url", "not a url"));

		assert!(matches!(
			DeviceApiConfig::from_figment(figment),
			Err(ConfigError::InvalidUrl { field: "auth_base_url", .. })
		));
	}
}
