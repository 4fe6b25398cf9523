//! Authorization-code and refresh-token grants.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	error::ConfigError,
	flows::{AuthorizationRequest, Client},
	http::ProviderHttpClient,
	oauth::{TokenFacade, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan, flow_debug},
	provider::Provider,
};

impl<P, C, M> Client<P, C, M>
where
	P: Provider,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges an authorization `code` using the client's registered redirect URI.
	pub async fn exchange_code(&self, code: &str) -> Result<AccessToken> {
		self.run_code_exchange("exchange_code", code, None, None).await
	}

	/// Validates the returned `state` and exchanges `code` for tokens, replaying the
	/// redirect URI and PKCE verifier recorded in `request`.
	pub async fn complete_authorization(
		&self,
		request: &AuthorizationRequest,
		returned_state: &str,
		code: &str,
	) -> Result<AccessToken> {
		if let Err(err) = request.validate_state(returned_state) {
			flow_debug!(provider = self.provider.name(), "Authorization state mismatch.");
			obs::record_flow_outcome(FlowKind::AuthorizationCode, FlowOutcome::Attempt);
			obs::record_flow_failure(FlowKind::AuthorizationCode, &err);

			return Err(err);
		}

		self.run_code_exchange(
			"complete_authorization",
			code,
			request.pkce_verifier(),
			Some(&request.redirect_uri),
		)
		.await
	}

	/// Runs the refresh-token grant for `token`.
	///
	/// Zoho never rotates refresh tokens, so the previous refresh secret is carried over
	/// whenever the response omits a new one.
	pub async fn refresh_access_token(&self, token: &AccessToken) -> Result<AccessToken> {
		const KIND: FlowKind = FlowKind::RefreshToken;

		let span = FlowSpan::new(KIND, "refresh_access_token", self.provider.name());

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let refresh_token =
					token.refresh_token.as_ref().ok_or(ConfigError::MissingRefreshToken)?;
				let facade = self.token_facade()?;
				let mut refreshed = facade.refresh(self.provider.as_ref(), refresh_token.expose()).await?;

				if refreshed.refresh_token.is_none() {
					refreshed.refresh_token = Some(refresh_token.clone());
				}
				if refreshed.api_domain.is_none() {
					refreshed.api_domain = token.api_domain.clone();
				}

				flow_debug!(provider = self.provider.name(), "Refreshed access token.");

				Ok(refreshed)
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	async fn run_code_exchange(
		&self,
		stage: &'static str,
		code: &str,
		pkce_verifier: Option<&str>,
		redirect_uri: Option<&Url>,
	) -> Result<AccessToken> {
		const KIND: FlowKind = FlowKind::AuthorizationCode;

		let span = FlowSpan::new(KIND, stage, self.provider.name());

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let facade = self.token_facade()?;
				let token = facade
					.exchange_code(self.provider.as_ref(), code, pkce_verifier, redirect_uri)
					.await?;

				flow_debug!(
					provider = self.provider.name(),
					refresh_token = token.refresh_token.is_some(),
					"Exchanged authorization code."
				);

				Ok(token)
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	fn token_facade(&self) -> Result<TokenFacade<C, M>> {
		TokenFacade::from_provider(
			self.provider.as_ref(),
			&self.client_id,
			self.client_secret.as_deref(),
			&self.redirect_uri,
			Arc::clone(&self.http_client),
			Arc::clone(&self.transport_mapper),
		)
	}
}
