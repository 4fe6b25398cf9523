// crates.io
use oauth2::http::{
	Method, Request,
	header::{ACCEPT, AUTHORIZATION},
};
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
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
	/// Fetches the resource owner behind `token` from the provider's details endpoint.
	pub async fn resource_owner(&self, token: &AccessToken) -> Result<P::ResourceOwner> {
		const KIND: FlowKind = FlowKind::ResourceOwner;

		let span = FlowSpan::new(KIND, "resource_owner", self.provider.name());

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let url = self.provider.resource_owner_details_url(token);
				let request = Request::builder()
					.method(Method::GET)
					.uri(url.as_str())
					.header(AUTHORIZATION, format!("Bearer {}", token.access_token.expose()))
					.header(ACCEPT, "application/json")
					.body(Vec::new())
					.map_err(ConfigError::from)?;
				let response = oauth::send_json(
					self.provider.as_ref(),
					self.http_client.as_ref(),
					self.transport_mapper.as_ref(),
					KIND,
					request,
				)
				.await?;

				flow_debug!(provider = self.provider.name(), "Fetched resource owner details.");

				Ok(self.provider.create_resource_owner(response, token))
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}
}
