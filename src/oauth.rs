//! Token-endpoint facade over the `oauth2` crate, plus raw provider calls.

pub use oauth2;

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AsyncHttpClient, AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet,
	EndpointSet, ExtraTokenFields, HttpClientError, HttpRequest, PkceCodeVerifier, RedirectUrl,
	RefreshToken, RequestTokenError, StandardRevocableToken, StandardTokenResponse, TokenResponse,
	TokenUrl,
	basic::{
		BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
		BasicTokenType,
	},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ScopeSet},
	error::{ConfigError, IdentityProviderError, TransientError, TransportError},
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
	obs::FlowKind,
	provider::{GrantType, Provider, ProviderResponse},
};

const MAX_LIFETIME_SECS: i64 = 10 * 366 * 24 * 60 * 60;

type FacadeTokenResponse = StandardTokenResponse<TokenExtraFields, BasicTokenType>;
type FacadeClientBase = oauth2::Client<
	BasicErrorResponse,
	FacadeTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
>;
type FacadeClient = oauth2::Client<
	BasicErrorResponse,
	FacadeTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointSet,
>;

/// Non-standard token response fields.
///
/// Zoho reports the API domain the tokens belong to, and legacy responses carry the
/// lifetime in seconds as `expires_in_sec` (with `expires_in` in milliseconds).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenExtraFields {
	/// API domain the tokens are valid for.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub api_domain: Option<String>,
	/// Lifetime in seconds, preferred over `expires_in` when present.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expires_in_sec: Option<u64>,
}
impl ExtraTokenFields for TokenExtraFields {}

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(
		&self,
		flow: FlowKind,
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
		flow: FlowKind,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(flow, meta, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => unexpected(
				meta,
				format!("HTTP client error during the {flow} flow: {message}"),
			),
			_ => unexpected(meta, format!("HTTP client error during the {flow} flow")),
		}
	}
}

#[derive(Deserialize)]
struct OAuthErrorBody {
	error: String,
	#[serde(default)]
	error_description: Option<String>,
}

/// Token-endpoint client bound to one provider and one set of client credentials.
pub(crate) struct TokenFacade<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: FacadeClient,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> TokenFacade<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn from_provider<P>(
		provider: &P,
		client_id: &str,
		client_secret: Option<&str>,
		redirect_uri: &Url,
		http_client: Arc<C>,
		error_mapper: Arc<M>,
	) -> Result<Self>
	where
		P: ?Sized + Provider,
	{
		let auth_url = AuthUrl::new(provider.base_authorization_url().to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "authorization", source })?;
		let token_url =
			TokenUrl::new(provider.base_access_token_url(GrantType::AuthorizationCode).to_string())
				.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "token", source })?;
		let redirect_url = RedirectUrl::new(redirect_uri.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "redirect", source })?;
		let mut oauth_client = FacadeClientBase::new(ClientId::new(client_id.to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_redirect_uri(redirect_url)
			.set_auth_type(AuthType::RequestBody);

		if let Some(secret) = client_secret {
			oauth_client = oauth_client.set_client_secret(ClientSecret::new(secret.to_owned()));
		}

		Ok(Self { oauth_client, http_client, error_mapper })
	}

	pub(crate) async fn exchange_code<P>(
		&self,
		provider: &P,
		code: &str,
		pkce_verifier: Option<&str>,
		redirect_uri: Option<&Url>,
	) -> Result<AccessToken>
	where
		P: ?Sized + Provider,
	{
		let meta = ResponseMetadataSlot::default();
		let handle = self.http_client.with_metadata(meta.clone());
		let mut request = self.oauth_client.exchange_code(AuthorizationCode::new(code.to_owned()));

		if let Some(verifier) = pkce_verifier {
			request = request.set_pkce_verifier(PkceCodeVerifier::new(verifier.to_owned()));
		}
		if let Some(redirect) = redirect_uri {
			let redirect_url = RedirectUrl::new(redirect.to_string())
				.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "redirect", source })?;

			request = request.set_redirect_uri(Cow::Owned(redirect_url));
		}

		let response = request.request_async(&handle).await.map_err(|err| {
			map_request_error(
				provider,
				FlowKind::AuthorizationCode,
				meta.take(),
				err,
				self.error_mapper.as_ref(),
			)
		})?;

		into_access_token(response)
	}

	pub(crate) async fn refresh<P>(&self, provider: &P, refresh_token: &str) -> Result<AccessToken>
	where
		P: ?Sized + Provider,
	{
		let meta = ResponseMetadataSlot::default();
		let handle = self.http_client.with_metadata(meta.clone());
		let secret = RefreshToken::new(refresh_token.to_owned());
		let response =
			self.oauth_client.exchange_refresh_token(&secret).request_async(&handle).await.map_err(
				|err| {
					map_request_error(
						provider,
						FlowKind::RefreshToken,
						meta.take(),
						err,
						self.error_mapper.as_ref(),
					)
				},
			)?;

		into_access_token(response)
	}
}

/// Sends a raw provider request, runs [`Provider::check_response`], and parses the JSON
/// body. Bodies that carry an OAuth `error` field are rejected even on success statuses.
pub(crate) async fn send_json<P, C, M>(
	provider: &P,
	http_client: &C,
	error_mapper: &M,
	flow: FlowKind,
	request: HttpRequest,
) -> Result<Value>
where
	P: ?Sized + Provider,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let meta = ResponseMetadataSlot::default();
	let handle = http_client.with_metadata(meta.clone());
	let response = handle
		.call(request)
		.await
		.map_err(|err| error_mapper.map_transport_error(flow, meta.take().as_ref(), err))?;
	let status = response.status().as_u16();
	let body = response.body();

	provider
		.check_response(&ProviderResponse::new(status, body))
		.map_err(|err| err.with_oauth_fields(body))?;

	if body.iter().all(u8::is_ascii_whitespace) {
		return Ok(Value::Null);
	}
	if let Some(err) = oauth_error_from_body(status, body) {
		return Err(err.into());
	}

	let mut de = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| TransientError::ResponseParse { source, status: Some(status) }.into())
}

fn into_access_token(response: FacadeTokenResponse) -> Result<AccessToken> {
	let mut builder = AccessToken::builder()
		.access_token(response.access_token().secret().to_owned())
		.token_type(token_type_label(response.token_type()))
		.issued_at(OffsetDateTime::now_utc());

	if let Some(lifetime) = lifetime(&response)? {
		builder = builder.expires_in(lifetime);
	}
	if let Some(refresh) = response.refresh_token() {
		builder = builder.refresh_token(refresh.secret().to_owned());
	}
	if let Some(scopes) = response.scopes() {
		let granted = ScopeSet::new(
			scopes
				.iter()
				.flat_map(|scope| scope.as_str().split(','))
				.filter(|scope| !scope.is_empty()),
		)
		.map_err(ConfigError::from)?;

		builder = builder.scope(granted);
	}
	if let Some(api_domain) = response.extra_fields().api_domain.as_deref() {
		builder = builder.api_domain(api_domain);
	}

	builder.build().map_err(|err| ConfigError::from(err).into())
}

fn lifetime(response: &FacadeTokenResponse) -> Result<Option<Duration>> {
	let secs = match response.extra_fields().expires_in_sec {
		Some(secs) => secs,
		None => match response.expires_in() {
			Some(lifetime) => lifetime.as_secs(),
			None => return Ok(None),
		},
	};
	let secs = i64::try_from(secs)
		.ok()
		.filter(|secs| *secs <= MAX_LIFETIME_SECS)
		.ok_or(ConfigError::ExpiresInOutOfRange)?;

	if secs <= 0 {
		return Err(ConfigError::NonPositiveExpiresIn.into());
	}

	Ok(Some(Duration::seconds(secs)))
}

fn token_type_label(token_type: &BasicTokenType) -> String {
	match token_type {
		BasicTokenType::Bearer => "Bearer".into(),
		BasicTokenType::Mac => "MAC".into(),
		BasicTokenType::Extension(other) => other.clone(),
	}
}

fn map_request_error<P, E, M, TE>(
	provider: &P,
	flow: FlowKind,
	meta: Option<ResponseMetadata>,
	err: RequestTokenError<HttpClientError<E>, TE>,
	mapper: &M,
) -> Error
where
	P: ?Sized + Provider,
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
	TE: oauth2::ErrorResponse,
{
	let meta_ref = meta.as_ref();
	let status = meta_status(meta_ref);

	match err {
		RequestTokenError::ServerResponse(response) => {
			let body = match meta.as_ref().and_then(|value| value.body.clone()) {
				Some(raw) => raw,
				None => serde_json::to_vec(&response).unwrap_or_default(),
			};
			let status = status.unwrap_or(400);

			rejected(provider, status, &body)
				.unwrap_or_else(|| IdentityProviderError::new("Unexpected status", status))
				.with_oauth_fields(&body)
				.into()
		},
		RequestTokenError::Request(error) => mapper.map_transport_error(flow, meta_ref, error),
		RequestTokenError::Parse(source, body) => {
			let status_code = status.unwrap_or(200);

			if let Some(err) = rejected(provider, status_code, &body) {
				return err.with_oauth_fields(&body).into();
			}
			if let Some(err) = oauth_error_from_body(status_code, &body) {
				return err.into();
			}

			TransientError::ResponseParse { source, status }.into()
		},
		RequestTokenError::Other(message) => {
			if let Some(err) = status.and_then(|code| rejected(provider, code, &[])) {
				return err.into();
			}

			unexpected(meta_ref, format!("token endpoint returned an unexpected response: {message}"))
		},
	}
}

fn rejected<P>(provider: &P, status: u16, body: &[u8]) -> Option<IdentityProviderError>
where
	P: ?Sized + Provider,
{
	provider.check_response(&ProviderResponse::new(status, body)).err()
}

fn oauth_error_from_body(status: u16, body: &[u8]) -> Option<IdentityProviderError> {
	let OAuthErrorBody { error, error_description } = serde_json::from_slice(body).ok()?;
	let message = error_description.as_deref().unwrap_or(&error).to_owned();
	let err = IdentityProviderError::new(message, status).with_oauth_error(error).with_body(body);

	Some(match error_description {
		Some(description) => err.with_error_description(description),
		None => err,
	})
}

impl IdentityProviderError {
	fn with_oauth_fields(mut self, body: &[u8]) -> Self {
		if let Ok(parsed) = serde_json::from_slice::<OAuthErrorBody>(body) {
			self.oauth_error = Some(parsed.error);
			self.error_description = parsed.error_description;
		}
		if self.body.is_none() {
			self = self.with_body(body);
		}

		self
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(flow: FlowKind, meta: Option<&ResponseMetadata>, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransientError::UnexpectedResponse {
			message: format!("request timed out during the {flow} flow"),
			status: meta_status(meta).or_else(|| err.status().map(|code| code.as_u16())),
			retry_after: meta_retry_after(meta),
		}
		.into();
	}

	TransportError::from(err).into()
}

fn unexpected(meta: Option<&ResponseMetadata>, message: String) -> Error {
	TransientError::UnexpectedResponse {
		message,
		status: meta_status(meta),
		retry_after: meta_retry_after(meta),
	}
	.into()
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}
