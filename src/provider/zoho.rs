//! Zoho CRM provider.
//!
//! Zoho runs one accounts server and one API host per data center. The accounts server
//! hosts `/oauth/v2/auth`, `/oauth/v2/token`, and `/oauth/v2/token/revoke`; the API host
//! answers organization lookups at `/crm/v2/org`. Both are overridable so tokens can be
//! minted and used against any region (or a proxy in front of it).

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	error::IdentityProviderError,
	flows::PkceCodeChallengeMethod,
	owner::ZohoCrmResourceOwner,
	provider::{GrantType, Provider, ProviderResponse, ZohoCrmBuilder},
};

/// Value of Zoho's `access_type` authorization parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
	/// Issues a refresh token alongside the access token.
	Offline,
	/// Issues an access token only.
	Online,
}
impl AccessType {
	/// Wire value (`offline` / `online`).
	pub const fn as_str(self) -> &'static str {
		match self {
			AccessType::Offline => "offline",
			AccessType::Online => "online",
		}
	}
}
impl Display for AccessType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Endpoints derived from the configured base URLs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZohoEndpoints {
	/// `{accounts_server}/oauth/v2/auth`.
	pub authorization: Url,
	/// `{accounts_server}/oauth/v2/token`.
	pub token: Url,
	/// `{accounts_server}/oauth/v2/token/revoke`.
	pub revocation: Url,
	/// `{host_resource_location}/crm/v2/org`.
	pub organization: Url,
}

/// Immutable Zoho CRM provider configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZohoCrm {
	pub(crate) accounts_server: Url,
	pub(crate) host_resource_location: Url,
	pub(crate) access_type: Option<AccessType>,
	pub(crate) pkce: bool,
	pub(crate) endpoints: ZohoEndpoints,
}
impl ZohoCrm {
	/// Provider label.
	pub const NAME: &'static str = "zoho_crm";

	/// Creates a new builder seeded with the US data center.
	pub fn builder() -> ZohoCrmBuilder {
		ZohoCrmBuilder::new()
	}

	/// Accounts server base URL.
	pub fn accounts_server(&self) -> &Url {
		&self.accounts_server
	}

	/// API host base URL.
	pub fn host_resource_location(&self) -> &Url {
		&self.host_resource_location
	}

	/// Configured `access_type`, if any.
	pub fn access_type(&self) -> Option<AccessType> {
		self.access_type
	}

	/// Derived endpoint set.
	pub fn endpoints(&self) -> &ZohoEndpoints {
		&self.endpoints
	}
}
impl Provider for ZohoCrm {
	type ResourceOwner = ZohoCrmResourceOwner;

	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn base_authorization_url(&self) -> &Url {
		&self.endpoints.authorization
	}

	fn base_access_token_url(&self, _grant: GrantType) -> &Url {
		&self.endpoints.token
	}

	fn resource_owner_details_url(&self, _token: &AccessToken) -> &Url {
		&self.endpoints.organization
	}

	fn revocation_url(&self) -> Option<&Url> {
		Some(&self.endpoints.revocation)
	}

	fn pkce_method(&self) -> Option<PkceCodeChallengeMethod> {
		self.pkce.then_some(PkceCodeChallengeMethod::S256)
	}

	fn authorization_parameters(&self, params: &mut BTreeMap<String, String>) {
		if let Some(access_type) = self.access_type {
			params.insert("access_type".into(), access_type.as_str().into());
		}
	}

	fn check_response(&self, response: &ProviderResponse<'_>) -> Result<(), IdentityProviderError> {
		if response.is_error_status() {
			Err(IdentityProviderError::new(response.reason_phrase(), response.status)
				.with_body(response.body))
		} else {
			Ok(())
		}
	}

	fn create_resource_owner(&self, response: Value, _token: &AccessToken) -> ZohoCrmResourceOwner {
		ZohoCrmResourceOwner::new(response)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::owner::ResourceOwner;

	fn token() -> AccessToken {
		AccessToken::builder().access_token("mock_access_token").build().expect("Token should build.")
	}

	#[test]
	fn urls_ignore_grant_and_token() {
		let provider = ZohoCrm::builder().build().expect("Provider should build.");

		assert_eq!(provider.base_authorization_url().path(), "/oauth/v2/auth");
		assert_eq!(provider.base_access_token_url(GrantType::AuthorizationCode).path(), "/oauth/v2/token");
		assert_eq!(
			provider.base_access_token_url(GrantType::RefreshToken),
			provider.base_access_token_url(GrantType::AuthorizationCode)
		);
		assert_eq!(provider.resource_owner_details_url(&token()).path(), "/crm/v2/org");
		assert_eq!(provider.revocation_url().map(Url::path), Some("/oauth/v2/token/revoke"));
		assert!(provider.default_scopes().is_empty());
		assert_eq!(provider.scope_separator(), ',');
	}

	#[test]
	fn access_type_is_merged_only_when_set() {
		let provider = ZohoCrm::builder().build().expect("Provider should build.");
		let mut params = BTreeMap::from([("client_id".to_string(), "mock_client_id".to_string())]);

		provider.authorization_parameters(&mut params);

		assert!(!params.contains_key("access_type"));
		assert_eq!(params.len(), 1);

		let provider = ZohoCrm::builder()
			.access_type(AccessType::Offline)
			.build()
			.expect("Offline provider should build.");

		provider.authorization_parameters(&mut params);

		assert_eq!(params.get("access_type").map(String::as_str), Some("offline"));
		assert_eq!(params.get("client_id").map(String::as_str), Some("mock_client_id"));
	}

	#[test]
	fn pkce_toggle_controls_challenge_method() {
		let provider = ZohoCrm::builder().build().expect("Provider should build.");

		assert_eq!(provider.pkce_method(), None);

		let provider = ZohoCrm::builder().pkce(true).build().expect("PKCE provider should build.");

		assert_eq!(provider.pkce_method(), Some(PkceCodeChallengeMethod::S256));
	}

	#[test]
	fn check_response_rejects_error_statuses() {
		let provider = ZohoCrm::builder().build().expect("Provider should build.");

		assert!(provider.check_response(&ProviderResponse::new(200, b"{}")).is_ok());
		assert!(provider.check_response(&ProviderResponse::new(302, b"")).is_ok());

		let body = br#"{"code":"INVALID_TOKEN","status":"error"}"#;
		let err = provider
			.check_response(&ProviderResponse::new(401, body))
			.expect_err("401 responses must be rejected.");

		assert_eq!(err.status, 401);
		assert_eq!(err.message, "Unauthorized");
		assert_eq!(err.body.as_deref(), Some(r#"{"code":"INVALID_TOKEN","status":"error"}"#));

		let err = provider
			.check_response(&ProviderResponse::new(500, b""))
			.expect_err("500 responses must be rejected.");

		assert_eq!(err.message, "Internal Server Error");
	}

	#[test]
	fn resource_owner_wraps_the_response() {
		let provider = ZohoCrm::builder().build().expect("Provider should build.");
		let owner = provider.create_resource_owner(
			serde_json::json!({ "org": [{ "id": "4150868000000225013", "company_name": "Zylker" }] }),
			&token(),
		);

		assert_eq!(owner.id().as_deref(), Some("4150868000000225013"));
		assert_eq!(owner.organization_name(), Some("Zylker"));
	}
}
