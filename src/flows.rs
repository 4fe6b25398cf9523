//! Client-side flows: authorization URLs, token grants, revocation, and owner lookups.

pub mod authorization;

mod resource_owner;
mod revocation;
mod token;

pub use authorization::*;

// self
use crate::{_prelude::*, http::ProviderHttpClient, oauth::TransportErrorMapper, provider::Provider};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper, provider::ZohoCrm};

/// Zoho CRM client on the crate's default reqwest transport stack.
#[cfg(feature = "reqwest")]
pub type ZohoCrmClient = Client<ZohoCrm, ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// OAuth 2.0 client bound to one provider and one set of client credentials.
///
/// The provider describes endpoints and response quirks; the client owns the transport,
/// the error mapper, and the registered application's credentials, and drives every flow
/// through them.
pub struct Client<P, C, M>
where
	P: Provider,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Provider the client talks to.
	pub provider: Arc<P>,
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Optional client secret, sent in the token request body.
	pub client_secret: Option<String>,
	/// Redirect URI registered for the application.
	pub redirect_uri: Url,
}
impl<P, C, M> Client<P, C, M>
where
	P: Provider,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		provider: impl Into<Arc<P>>,
		client_id: impl Into<String>,
		redirect_uri: Url,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			provider: provider.into(),
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			client_id: client_id.into(),
			client_secret: None,
			redirect_uri,
		}
	}

	/// Sets or replaces the client secret.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}
}
#[cfg(feature = "reqwest")]
impl<P> Client<P, ReqwestHttpClient, ReqwestTransportErrorMapper>
where
	P: Provider,
{
	/// Creates a client backed by its own reqwest transport.
	///
	/// Fails only when the underlying reqwest client cannot be built.
	pub fn new(
		provider: impl Into<Arc<P>>,
		client_id: impl Into<String>,
		redirect_uri: Url,
	) -> Result<Self> {
		let http_client = ReqwestHttpClient::new()?;

		Ok(Self::with_http_client(
			provider,
			client_id,
			redirect_uri,
			http_client,
			Arc::new(ReqwestTransportErrorMapper),
		))
	}
}
impl<P, C, M> Clone for Client<P, C, M>
where
	P: Provider,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			provider: Arc::clone(&self.provider),
			http_client: Arc::clone(&self.http_client),
			transport_mapper: Arc::clone(&self.transport_mapper),
			client_id: self.client_id.clone(),
			client_secret: self.client_secret.clone(),
			redirect_uri: self.redirect_uri.clone(),
		}
	}
}
impl<P, C, M> Debug for Client<P, C, M>
where
	P: Provider,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("provider", &self.provider.name())
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("redirect_uri", &self.redirect_uri.as_str())
			.finish()
	}
}
