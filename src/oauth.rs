//! Token issuer: the OAuth 2.0 client-credentials exchange against the device API's
//! authentication service.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError,
	RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialBuilderError},
	clock::Clock,
	config::DeviceApiConfig,
	error::{AuthExchangeError, ConfigError, TransportError},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

const TARGET: &str = "token endpoint";

/// Exchanges the configured client id/secret for a bearer [`Credential`].
///
/// The request is a form-encoded `POST <auth-base>/oauth2/token` carrying
/// `grant_type=client_credentials`, `client_id`, and `client_secret` in the body. Issuers are
/// cheap to build and hold no token state; caching is the caller's job.
pub struct TokenIssuer {
	oauth_client: ConfiguredBasicClient,
	http_client: ReqwestHttpClient,
}
impl TokenIssuer {
	/// Builds an issuer, failing with [`ConfigError`] when credentials are missing or the token
	/// endpoint cannot be derived.
	pub fn from_config(config: &DeviceApiConfig, http_client: ReqwestHttpClient) -> Result<Self> {
		let (client_id, client_secret) = config.ensure_credentials()?;
		let token_url = TokenUrl::new(config.token_endpoint()?.to_string())
			.map_err(|source| ConfigError::InvalidUrl { field: "auth_base_url", source })?;
		let oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.expose().to_owned()))
			.set_token_uri(token_url)
			.set_auth_type(AuthType::RequestBody);

		Ok(Self { oauth_client, http_client })
	}

	/// Performs the exchange. The credential's effective expiry is
	/// `clock.now() + 0.8 × expires_in`, with `now` read once the response has arrived.
	pub async fn exchange(&self, clock: &dyn Clock) -> Result<Credential> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let response = self
			.oauth_client
			.exchange_client_credentials()
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err))?;
		let expires_in = response.expires_in().ok_or(AuthExchangeError::MissingExpiresIn)?;

		if expires_in.is_zero() {
			return Err(AuthExchangeError::NonPositiveExpiresIn.into());
		}

		let lifetime =
			Duration::try_from(expires_in).map_err(|_| AuthExchangeError::ExpiresInOutOfRange)?;
		let credential = Credential::builder()
			.access_token(response.access_token().secret().to_owned())
			.issued_at(clock.now())
			.expires_in(lifetime)
			.build()
			.map_err(map_builder_error)?;

		tracing::info!(expires_at = %credential.expires_at, "Obtained device API token.");

		Ok(credential)
	}
}
impl Debug for TokenIssuer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenIssuer")
			.field("client_id", self.oauth_client.client_id())
			.field("token_uri", self.oauth_client.token_uri())
			.finish()
	}
}

fn map_request_error(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Error {
	let status = meta.as_ref().and_then(|value| value.status);
	let rejected = status.filter(|code| !(200..300).contains(code));

	match err {
		RequestTokenError::Request(error) => map_transport_error(error),
		_ if rejected.is_some() => AuthExchangeError::Rejected {
			status: rejected.unwrap_or_default(),
			body: meta.and_then(|value| value.body_preview).unwrap_or_default(),
		}
		.into(),
		RequestTokenError::Parse(source, _body) =>
			AuthExchangeError::MalformedResponse { source, status }.into(),
		RequestTokenError::ServerResponse(response) => AuthExchangeError::Unexpected {
			message: format!("OAuth error `{}`", response.error().as_ref()),
			status,
		}
		.into(),
		RequestTokenError::Other(message) => AuthExchangeError::Unexpected { message, status }.into(),
	}
}

fn map_transport_error(err: HttpClientError<ReqwestError>) -> Error {
	match err {
		HttpClientError::Reqwest(inner) if inner.is_builder() =>
			ConfigError::http_client_build(*inner).into(),
		HttpClientError::Reqwest(inner) => TransportError::from_reqwest(TARGET, *inner).into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) =>
			AuthExchangeError::Unexpected { message, status: None }.into(),
		_ => AuthExchangeError::Unexpected {
			message: "HTTP client error occurred while calling the token endpoint".into(),
			status: None,
		}
		.into(),
	}
}

fn map_builder_error(err: CredentialBuilderError) -> Error {
	match err {
		CredentialBuilderError::NonPositiveLifetime => AuthExchangeError::NonPositiveExpiresIn,
		CredentialBuilderError::MissingExpiry => AuthExchangeError::MissingExpiresIn,
		CredentialBuilderError::LifetimeOutOfRange => AuthExchangeError::ExpiresInOutOfRange,
		CredentialBuilderError::MissingAccessToken => AuthExchangeError::Unexpected {
			message: "token response carried no access token".into(),
			status: None,
		},
	}
	.into()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn issuer_requires_credentials() {
		let config = DeviceApiConfig::builder().build().expect("Default config should validate.");
		let http = ReqwestHttpClient::with_timeout(Duration::seconds(1))
			.expect("HTTP client should build.");
		let err = TokenIssuer::from_config(&config, http)
			.expect_err("Issuer must refuse to build without a client id.");

		assert!(matches!(err, Error::Config(ConfigError::MissingClientId)));
	}

	#[test]
	fn issuer_targets_oauth2_token_path() {
		let config = DeviceApiConfig::builder()
			.client_id("id")
			.client_secret("secret")
			.build()
			.expect("Config should validate.");
		let http = ReqwestHttpClient::with_timeout(Duration::seconds(1))
			.expect("HTTP client should build.");
		let issuer = TokenIssuer::from_config(&config, http).expect("Issuer should build.");

		assert_eq!(
			issuer.oauth_client.token_uri().as_str(),
			"https://api.authentication.husqvarnagroup.dev/v1/oauth2/token"
		);
	}

	#[test]
	fn non_success_status_maps_to_rejected() {
		let meta = ResponseMetadata {
			status: Some(401),
			body_preview: Some("{\"error\":\"invalid_client\"}".into()),
		};
		let err = map_request_error(
			Some(meta),
			RequestTokenError::Other("server returned empty error response".into()),
		);

		match err {
			Error::AuthExchange(AuthExchangeError::Rejected { status, body }) => {
				assert_eq!(status, 401);
				assert!(body.contains("invalid_client"));
			},
			other => panic!("Unexpected error: {other:?}."),
		}
	}
}
