//! Deserializable application settings for a Zoho CRM client.
//!
//! [`ZohoCrmConfig`] mirrors the values a Zoho API console registration hands out, so a
//! service can keep them in TOML/JSON/env-backed config and turn them into a provider or
//! a ready client in one call.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	flows::Client,
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	provider::{AccessType, DataCenter, ProviderConfigError, ZohoCrm, ZohoCrmBuilder},
};
#[cfg(feature = "reqwest")] use crate::flows::ZohoCrmClient;

/// Client registration plus provider options.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct ZohoCrmConfig {
	/// OAuth 2.0 client identifier (`1000.XXXX`).
	pub client_id: String,
	/// Client secret for server-based applications.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_secret: Option<String>,
	/// Redirect URI registered in the API console.
	pub redirect_uri: Url,
	/// `access_type` sent on authorization requests.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub access_type: Option<AccessType>,
	/// Regional preset for both base URLs.
	#[serde(default)]
	pub data_center: DataCenter,
	/// Accounts server override.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub accounts_server: Option<String>,
	/// API host override.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub host_resource_location: Option<String>,
	/// Sends an S256 PKCE challenge with every authorization request.
	#[serde(default)]
	pub pkce: bool,
}
impl ZohoCrmConfig {
	/// Validates the provider half of the settings.
	pub fn into_provider(self) -> Result<ZohoCrm, ProviderConfigError> {
		self.provider_builder().build()
	}

	/// Builds a client over a caller-supplied transport.
	pub fn into_client_with<C, M>(
		self,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Client<ZohoCrm, C, M>>
	where
		C: ?Sized + ProviderHttpClient,
		M: ?Sized + TransportErrorMapper<C::TransportError>,
	{
		let provider = self.provider_builder().build().map_err(ConfigError::from)?;
		let client = Client::with_http_client(
			provider,
			self.client_id,
			self.redirect_uri,
			http_client,
			mapper,
		);

		Ok(match self.client_secret {
			Some(secret) => client.with_client_secret(secret),
			None => client,
		})
	}

	/// Builds a client on the default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn into_client(self) -> Result<ZohoCrmClient> {
		let provider = self.provider_builder().build().map_err(ConfigError::from)?;
		let client = ZohoCrmClient::new(provider, self.client_id, self.redirect_uri)?;

		Ok(match self.client_secret {
			Some(secret) => client.with_client_secret(secret),
			None => client,
		})
	}

	fn provider_builder(&self) -> ZohoCrmBuilder {
		ZohoCrmBuilder {
			data_center: self.data_center,
			accounts_server: self.accounts_server.clone(),
			host_resource_location: self.host_resource_location.clone(),
			access_type: self.access_type,
			pkce: self.pkce,
		}
	}
}
impl Debug for ZohoCrmConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ZohoCrmConfig")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("redirect_uri", &self.redirect_uri.as_str())
			.field("access_type", &self.access_type)
			.field("data_center", &self.data_center)
			.field("accounts_server", &self.accounts_server)
			.field("host_resource_location", &self.host_resource_location)
			.field("pkce", &self.pkce)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::provider::Provider;

	fn parse(json: &str) -> ZohoCrmConfig {
		serde_json::from_str(json).expect("Config fixture should deserialize.")
	}

	#[test]
	fn minimal_config_targets_the_us_data_center() {
		let config = parse(
			r#"{"client_id":"1000.CLIENT","redirect_uri":"https://app.example.com/oauth/zoho/callback"}"#,
		);

		assert_eq!(config.data_center, DataCenter::Us);
		assert!(!config.pkce);

		let provider = config.into_provider().expect("Minimal config should build a provider.");

		assert_eq!(provider.accounts_server().as_str(), "https://accounts.zoho.com/");
		assert_eq!(provider.host_resource_location().as_str(), "https://www.zohoapis.com/");
		assert_eq!(provider.access_type(), None);
	}

	#[test]
	fn explicit_servers_override_the_data_center() {
		let config = parse(
			r#"{
				"client_id": "1000.CLIENT",
				"client_secret": "mock_secret",
				"redirect_uri": "https://app.example.com/oauth/zoho/callback",
				"access_type": "offline",
				"data_center": "eu",
				"host_resource_location": "https://crm.proxy.example.com",
				"pkce": true
			}"#,
		);
		let provider = config.into_provider().expect("Full config should build a provider.");

		assert_eq!(provider.endpoints().token.as_str(), "https://accounts.zoho.eu/oauth/v2/token");
		assert_eq!(
			provider.endpoints().organization.as_str(),
			"https://crm.proxy.example.com/crm/v2/org"
		);
		assert_eq!(provider.access_type(), Some(AccessType::Offline));
		assert!(provider.pkce_method().is_some());
	}

	#[test]
	fn rejects_unknown_fields_and_bad_values() {
		let unknown = serde_json::from_str::<ZohoCrmConfig>(
			r#"{"client_id":"1000.CLIENT","redirect_uri":"https://app.example.com/cb","scope":"x"}"#,
		);

		assert!(unknown.is_err());

		let bad_access_type = serde_json::from_str::<ZohoCrmConfig>(
			r#"{"client_id":"1000.CLIENT","redirect_uri":"https://app.example.com/cb","access_type":"forever"}"#,
		);

		assert!(bad_access_type.is_err());

		let config = parse(
			r#"{"client_id":"1000.CLIENT","redirect_uri":"https://app.example.com/cb","accounts_server":"http://accounts.zoho.com"}"#,
		);

		assert!(matches!(config.into_provider(), Err(ProviderConfigError::InsecureUrl { .. })));
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn into_client_carries_credentials() {
		let config = parse(
			r#"{"client_id":"1000.CLIENT","client_secret":"mock_secret","redirect_uri":"https://app.example.com/cb"}"#,
		);
		let rendered = format!("{config:?}");

		assert!(!rendered.contains("mock_secret"));

		let client = config.into_client().expect("Config should build a client.");

		assert_eq!(client.client_id, "1000.CLIENT");
		assert_eq!(client.client_secret.as_deref(), Some("mock_secret"));
		assert_eq!(client.redirect_uri.as_str(), "https://app.example.com/cb");
	}
}
