//! Provider hooks consulted by the client layer.
//!
//! A [`Provider`] tells the generic client which endpoints belong to an identity service,
//! which extra parameters the authorization request carries, how to judge a response, and
//! how to turn the user-info payload into a resource owner. The hooks only see crate-owned
//! data types so implementations never depend on a particular HTTP client.

// crates.io
use oauth2::http::StatusCode;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ScopeSet},
	error::IdentityProviderError,
	flows::PkceCodeChallengeMethod,
	owner::ResourceOwner,
};

/// OAuth 2.0 grant types issued against a provider's token endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Authorization Code grant.
	AuthorizationCode,
	/// Refresh Token grant.
	RefreshToken,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Status and raw body of a provider response, handed to [`Provider::check_response`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProviderResponse<'a> {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: &'a [u8],
}
impl<'a> ProviderResponse<'a> {
	/// Creates a response view.
	pub fn new(status: u16, body: &'a [u8]) -> Self {
		Self { status, body }
	}

	/// Canonical reason phrase for the status code (e.g. `Bad Request`).
	pub fn reason_phrase(&self) -> &'static str {
		StatusCode::from_u16(self.status)
			.ok()
			.and_then(|status| status.canonical_reason())
			.unwrap_or("Unknown Status")
	}

	/// Returns true for 4xx and 5xx statuses.
	pub fn is_error_status(&self) -> bool {
		self.status >= 400
	}
}

/// Hook set describing one identity provider.
///
/// Only the endpoint accessors, [`check_response`](Provider::check_response) and
/// [`create_resource_owner`](Provider::create_resource_owner) are required; the remaining
/// hooks default to the behavior generic OAuth 2.0 servers expect.
pub trait Provider: Send + Sync {
	/// Resource owner produced from the user-info response.
	type ResourceOwner: ResourceOwner;

	/// Stable provider label used in errors and diagnostics.
	fn name(&self) -> &'static str;

	/// Authorization endpoint the end-user is redirected to.
	fn base_authorization_url(&self) -> &Url;

	/// Token endpoint for the given grant.
	fn base_access_token_url(&self, grant: GrantType) -> &Url;

	/// Endpoint returning details about the owner of `token`.
	fn resource_owner_details_url(&self, token: &AccessToken) -> &Url;

	/// Optional token revocation endpoint.
	fn revocation_url(&self) -> Option<&Url> {
		None
	}

	/// Scopes requested when the caller does not specify any.
	fn default_scopes(&self) -> ScopeSet {
		ScopeSet::default()
	}

	/// Separator used to join scopes in the authorization request.
	fn scope_separator(&self) -> char {
		','
	}

	/// PKCE method to apply to authorization requests, if any.
	fn pkce_method(&self) -> Option<PkceCodeChallengeMethod> {
		None
	}

	/// Merges provider-specific parameters into the authorization query.
	///
	/// `params` already holds the generic parameters (`client_id`, `state`, `scope`, ...);
	/// implementations insert or override entries in place.
	fn authorization_parameters(&self, _params: &mut BTreeMap<String, String>) {}

	/// Rejects responses the provider considers failures.
	fn check_response(&self, response: &ProviderResponse<'_>) -> Result<(), IdentityProviderError>;

	/// Builds the resource owner from a successful user-info response.
	fn create_resource_owner(&self, response: Value, token: &AccessToken) -> Self::ResourceOwner;
}
