//! Internal facade over the `oauth2` client used for the authorization-code exchange.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RedirectUrl, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{CredentialPayload, SecretString},
	error::{ConfigError, ExchangeError},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	provider::{ClientAuthMethod, ProviderDescriptor},
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(
		&self,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(meta, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => ExchangeError::Io(inner).into(),
			HttpClientError::Other(message) => ExchangeError::Unexpected {
				message: format!(
					"HTTP client error occurred while calling the token endpoint: {message}"
				),
				status: meta_status(meta),
			}
			.into(),
			_ => ExchangeError::Unexpected {
				message: "HTTP client error occurred while calling the token endpoint.".into(),
				status: meta_status(meta),
			}
			.into(),
		}
	}
}

/// Drives the back-channel code exchange for one provider descriptor.
pub(crate) struct ExchangeFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConfiguredBasicClient,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> ExchangeFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn from_descriptor(
		descriptor: &ProviderDescriptor,
		client_id: &str,
		client_secret: Option<&str>,
		redirect_uri: &Url,
		http_client: impl Into<Arc<C>>,
		error_mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let auth_url = AuthUrl::new(descriptor.endpoints.authorization.to_string())
			.map_err(|source| ConfigError::InvalidDescriptor { source })?;
		let token_url = TokenUrl::new(descriptor.endpoints.token.to_string())
			.map_err(|source| ConfigError::InvalidDescriptor { source })?;
		let redirect_url = RedirectUrl::new(redirect_uri.to_string())
			.map_err(|source| ConfigError::InvalidRedirect { source })?;
		let mut oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_redirect_uri(redirect_url);

		if let Some(secret) = client_secret {
			oauth_client = oauth_client.set_client_secret(ClientSecret::new(secret.to_owned()));
		}
		if matches!(descriptor.preferred_client_auth_method, ClientAuthMethod::ClientSecretPost) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Ok(Self {
			oauth_client,
			http_client: http_client.into(),
			error_mapper: error_mapper.into(),
		})
	}

	/// Exchanges an authorization code for the provider's credential payload.
	///
	/// Failures are never retried here: the code is single-use upstream.
	pub(crate) async fn exchange_authorization_code(
		&self,
		code: &str,
	) -> Result<CredentialPayload> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let request = self.oauth_client.exchange_code(AuthorizationCode::new(code.to_owned()));
		let response = request
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err, self.error_mapper.as_ref()))?;

		Ok(payload_from_response(response))
	}
}

fn payload_from_response(response: BasicTokenResponse) -> CredentialPayload {
	let scope = response.scopes().map(|scopes| {
		let parts: Vec<&str> = scopes.iter().map(|scope| scope.as_ref()).collect();

		parts.join(" ")
	});

	CredentialPayload {
		access_token: SecretString::new(response.access_token().secret().to_owned()),
		token_type: token_type_label(response.token_type()),
		expires_in: response.expires_in().map(|duration| duration.as_secs()),
		refresh_token: response
			.refresh_token()
			.map(|token| SecretString::new(token.secret().to_owned())),
		scope,
	}
}

// `BasicTokenType` serializes to its RFC 6749 string form, extensions included.
fn token_type_label(token_type: &oauth2::basic::BasicTokenType) -> String {
	serde_json::to_value(token_type)
		.ok()
		.and_then(|value| value.as_str().map(str::to_owned))
		.unwrap_or_else(|| "bearer".into())
}

fn map_request_error<E, M>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta_ref = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(response, meta_ref),
		RequestTokenError::Request(error) => mapper.map_transport_error(meta_ref, error),
		RequestTokenError::Parse(error, _body) =>
			ExchangeError::MalformedResponse { source: error, status: meta_status(meta_ref) }.into(),
		RequestTokenError::Other(message) =>
			ExchangeError::Unexpected { message, status: meta_status(meta_ref) }.into(),
	}
}

fn map_server_response_error(
	response: BasicErrorResponse,
	meta: Option<&ResponseMetadata>,
) -> Error {
	let reason = if let Some(description) = response.error_description() {
		format!("{} ({description})", response.error().as_ref())
	} else {
		response.error().as_ref().to_owned()
	};

	ExchangeError::Rejected { reason, status: meta_status(meta) }.into()
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(meta: Option<&ResponseMetadata>, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return ExchangeError::Unexpected {
			message: "Request timed out while calling the token endpoint.".into(),
			status: meta_status(meta).or_else(|| err.status().map(|code| code.as_u16())),
		}
		.into();
	}

	ExchangeError::from(err).into()
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}
