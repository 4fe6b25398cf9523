// crates.io
use oauth2::http::{Method, Request, header::ACCEPT};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::ConfigError,
	flows::Client,
	http::ProviderHttpClient,
	oauth::{self, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan, flow_debug},
	provider::Provider,
};

impl<P, C, M> Client<P, C, M>
where
	P: Provider,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Revokes `token` (usually the refresh token) at the provider's revocation URL.
	///
	/// The secret travels as the `token` query parameter, which is what Zoho's accounts
	/// server expects.
	pub async fn revoke_token(&self, token: &TokenSecret) -> Result<()> {
		const KIND: FlowKind = FlowKind::Revocation;

		let span = FlowSpan::new(KIND, "revoke_token", self.provider.name());

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let mut url = self
					.provider
					.revocation_url()
					.ok_or(ConfigError::RevocationUnsupported { provider: self.provider.name() })?
					.clone();

				url.query_pairs_mut().append_pair("token", token.expose());

				let request = Request::builder()
					.method(Method::POST)
					.uri(url.as_str())
					.header(ACCEPT, "application/json")
					.body(Vec::new())
					.map_err(ConfigError::from)?;

				oauth::send_json(
					self.provider.as_ref(),
					self.http_client.as_ref(),
					self.transport_mapper.as_ref(),
					KIND,
					request,
				)
				.await?;

				flow_debug!(provider = self.provider.name(), "Revoked token.");

				Ok(())
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}
}
