//! Crate-level error types shared across flows, providers, and transports.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure; retry with backoff.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The identity provider rejected a request.
	#[error(transparent)]
	IdentityProvider(#[from] IdentityProviderError),

	/// The `state` returned by the authorization redirect does not match the request.
	#[error("Authorization state mismatch.")]
	StateMismatch,
}
impl Error {
	/// Returns the identity provider failure, if this error carries one.
	pub fn as_identity_provider(&self) -> Option<&IdentityProviderError> {
		match self {
			Self::IdentityProvider(e) => Some(e),
			_ => None,
		}
	}
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
	/// Provider configuration is invalid.
	#[error(transparent)]
	Provider(#[from] crate::provider::ProviderConfigError),
	/// An endpoint URL was rejected by the OAuth client.
	#[error("Endpoint `{endpoint}` is invalid.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Requested scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Access token builder validation failed.
	#[error("Unable to build access token.")]
	TokenBuild(#[from] crate::auth::AccessTokenBuilderError),
	/// Token response carried an excessively large expiry.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token response carried a non-positive expiry.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
	/// A refresh was requested for a token without a refresh secret.
	#[error("Access token is missing a refresh token.")]
	MissingRefreshToken,
	/// The provider does not publish a revocation endpoint.
	#[error("Provider `{provider}` does not support token revocation.")]
	RevocationUnsupported {
		/// Provider name.
		provider: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Temporary failure variants (safe to retry).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Provider returned an unexpected but non-fatal response.
	#[error("Provider returned an unexpected response: {message}.")]
	UnexpectedResponse {
		/// Message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Provider responded with malformed JSON that could not be parsed.
	#[error("Provider returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Rejection reported by the identity provider (HTTP error status or OAuth error body).
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Identity provider rejected the request ({status}): {message}.")]
pub struct IdentityProviderError {
	/// HTTP status code of the rejected response.
	pub status: u16,
	/// Reason phrase or provider-supplied description.
	pub message: String,
	/// OAuth `error` code, when the body carried one.
	pub oauth_error: Option<String>,
	/// OAuth `error_description`, when the body carried one.
	pub error_description: Option<String>,
	/// Truncated response body.
	pub body: Option<String>,
}
impl IdentityProviderError {
	/// Creates an error for `status` with the given message.
	pub fn new(message: impl Into<String>, status: u16) -> Self {
		Self {
			status,
			message: message.into(),
			oauth_error: None,
			error_description: None,
			body: None,
		}
	}

	/// Attaches the OAuth `error` code.
	pub fn with_oauth_error(mut self, error: impl Into<String>) -> Self {
		self.oauth_error = Some(error.into());

		self
	}

	/// Attaches the OAuth `error_description`.
	pub fn with_error_description(mut self, description: impl Into<String>) -> Self {
		self.error_description = Some(description.into());

		self
	}

	/// Attaches a preview of the raw body.
	pub fn with_body(mut self, body: &[u8]) -> Self {
		if !body.is_empty() {
			self.body = Some(truncate_preview(String::from_utf8_lossy(body).into_owned()));
		}

		self
	}
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = body.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}
