//! Authorization URL construction and the state/PKCE material that must survive the
//! redirect round-trip.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::ScopeSet,
	flows::Client,
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, FlowKind, FlowOutcome, FlowSpan, flow_debug},
	provider::Provider,
};

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;
const DEFAULT_APPROVAL_PROMPT: &str = "auto";
const RESERVED_PARAMS: [&str; 3] = ["client_id", "redirect_uri", "state"];

/// Supported PKCE challenge methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE (RFC 7636 S256).
	S256,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}
}

/// Caller-supplied knobs for [`Client::authorization_url`].
#[derive(Clone, Debug, Default)]
pub struct AuthorizationOptions {
	/// Fixed `state` value; a random one is generated when unset.
	pub state: Option<String>,
	/// Requested scopes; the provider's defaults apply when unset.
	pub scopes: Option<ScopeSet>,
	/// Redirect URI for this request; the client's registered URI applies when unset.
	pub redirect_uri: Option<Url>,
	/// `approval_prompt` value (defaults to `auto`).
	pub approval_prompt: Option<String>,
	/// OpenID-style `prompt` value; replaces `approval_prompt` when set.
	pub prompt: Option<String>,
	/// Additional query parameters, applied after the provider's own.
	pub extra_params: BTreeMap<String, String>,
}
impl AuthorizationOptions {
	/// Pins the `state` value.
	pub fn state(mut self, state: impl Into<String>) -> Self {
		self.state = Some(state.into());

		self
	}

	/// Requests `scopes` instead of the provider defaults.
	pub fn scopes(mut self, scopes: ScopeSet) -> Self {
		self.scopes = Some(scopes);

		self
	}

	/// Overrides the redirect URI for this request.
	pub fn redirect_uri(mut self, redirect_uri: Url) -> Self {
		self.redirect_uri = Some(redirect_uri);

		self
	}

	/// Sets `approval_prompt` (e.g. `force`).
	pub fn approval_prompt(mut self, value: impl Into<String>) -> Self {
		self.approval_prompt = Some(value.into());

		self
	}

	/// Sets `prompt` (e.g. `consent`), dropping `approval_prompt`.
	pub fn prompt(mut self, value: impl Into<String>) -> Self {
		self.prompt = Some(value.into());

		self
	}

	/// Adds an extra query parameter.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra_params.insert(key.into(), value.into());

		self
	}
}

/// Authorization request handed to the user agent, plus the values needed to finish it.
#[derive(Clone)]
pub struct AuthorizationRequest {
	/// Fully-formed authorize URL that callers should send end-users to.
	pub url: Url,
	/// Opaque state value that must round-trip via the redirect handler.
	pub state: String,
	/// Redirect URI embedded in the authorize URL.
	pub redirect_uri: Url,
	pkce: Option<PkcePair>,
}
impl AuthorizationRequest {
	/// PKCE code challenge, when the provider requested one.
	pub fn code_challenge(&self) -> Option<&str> {
		self.pkce.as_ref().map(|pkce| pkce.challenge.as_str())
	}

	/// PKCE challenge method, when the provider requested one.
	pub fn code_challenge_method(&self) -> Option<PkceCodeChallengeMethod> {
		self.pkce.as_ref().map(|pkce| pkce.method)
	}

	/// Validates the returned `state` parameter after the authorization redirect.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state == self.state { Ok(()) } else { Err(Error::StateMismatch) }
	}

	pub(crate) fn pkce_verifier(&self) -> Option<&str> {
		self.pkce.as_ref().map(|pkce| pkce.verifier.as_str())
	}
}
impl Debug for AuthorizationRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationRequest")
			.field("url", &self.url.as_str())
			.field("state", &self.state)
			.field("redirect_uri", &self.redirect_uri.as_str())
			.field("code_challenge", &self.code_challenge())
			.field("code_challenge_method", &self.code_challenge_method())
			.finish()
	}
}

#[derive(Clone)]
struct PkcePair {
	verifier: String,
	challenge: String,
	method: PkceCodeChallengeMethod,
}
impl PkcePair {
	fn generate(method: PkceCodeChallengeMethod) -> Self {
		let verifier = random_string(PKCE_VERIFIER_LEN);
		let challenge = match method {
			PkceCodeChallengeMethod::S256 => compute_s256_challenge(&verifier),
		};

		Self { verifier, challenge, method }
	}
}

impl<P, C, M> Client<P, C, M>
where
	P: Provider,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the authorize URL for the authorization-code grant.
	///
	/// The query always carries `client_id`, `redirect_uri`, `response_type=code`, `state`,
	/// and `scope` (possibly empty), plus `approval_prompt` unless `prompt` is set. The
	/// provider then adds its own parameters, caller extras follow, and a PKCE challenge
	/// is appended when the provider asks for one. Extras cannot replace `client_id`,
	/// `redirect_uri`, or `state`.
	pub fn authorization_url(&self, options: AuthorizationOptions) -> AuthorizationRequest {
		const KIND: FlowKind = FlowKind::Authorization;

		let _span = FlowSpan::new(KIND, "authorization_url", self.provider.name()).entered();

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let AuthorizationOptions { state, scopes, redirect_uri, approval_prompt, prompt, extra_params } =
			options;
		let state = state.unwrap_or_else(|| random_string(STATE_LEN));
		let redirect_uri = redirect_uri.unwrap_or_else(|| self.redirect_uri.clone());
		let scopes = scopes.unwrap_or_else(|| self.provider.default_scopes());
		let mut params = BTreeMap::new();

		params.insert("client_id".to_owned(), self.client_id.clone());
		params.insert("redirect_uri".to_owned(), redirect_uri.to_string());
		params.insert("state".to_owned(), state.clone());
		params.insert("response_type".to_owned(), "code".to_owned());
		params.insert("scope".to_owned(), scopes.join(self.provider.scope_separator()));

		match prompt {
			Some(prompt) => {
				params.insert("prompt".to_owned(), prompt);
			},
			None => {
				params.insert(
					"approval_prompt".to_owned(),
					approval_prompt.unwrap_or_else(|| DEFAULT_APPROVAL_PROMPT.to_owned()),
				);
			},
		}

		self.provider.authorization_parameters(&mut params);
		params.extend(
			extra_params.into_iter().filter(|(key, _)| !RESERVED_PARAMS.contains(&key.as_str())),
		);

		let pkce = self.provider.pkce_method().map(PkcePair::generate);
		let mut url = self.provider.base_authorization_url().clone();

		{
			let mut pairs = url.query_pairs_mut();

			pairs.extend_pairs(params.iter());

			if let Some(pkce) = &pkce {
				pairs.append_pair("code_challenge", &pkce.challenge);
				pairs.append_pair("code_challenge_method", pkce.method.as_str());
			}
		}

		flow_debug!(
			provider = self.provider.name(),
			pkce = pkce.is_some(),
			"Built authorization URL."
		);
		obs::record_flow_outcome(KIND, FlowOutcome::Success);

		AuthorizationRequest { url, state, redirect_uri, pkce }
	}
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn compute_s256_challenge(verifier: &str) -> String {
	URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::{
		flows::ZohoCrmClient,
		provider::{AccessType, ZohoCrm},
	};

	fn client(provider: ZohoCrm) -> ZohoCrmClient {
		let redirect = Url::parse("https://app.example.com/oauth/zoho/callback")
			.expect("Redirect URI should parse.");

		ZohoCrmClient::new(provider, "mock_client_id", redirect).expect("Client should build.")
	}

	fn query(url: &Url) -> BTreeMap<String, String> {
		url.query_pairs().into_owned().collect()
	}

	#[test]
	fn default_query_carries_the_standard_parameters() {
		let client = client(ZohoCrm::builder().build().expect("Provider should build."));
		let request = client.authorization_url(AuthorizationOptions::default());
		let params = query(&request.url);
		let keys = params.keys().map(String::as_str).collect::<Vec<_>>();

		assert_eq!(request.url.scheme(), "https");
		assert_eq!(request.url.host_str(), Some("accounts.zoho.com"));
		assert_eq!(request.url.path(), "/oauth/v2/auth");
		assert_eq!(
			keys,
			["approval_prompt", "client_id", "redirect_uri", "response_type", "scope", "state"]
		);
		assert_eq!(params["approval_prompt"], "auto");
		assert_eq!(params["client_id"], "mock_client_id");
		assert_eq!(params["redirect_uri"], "https://app.example.com/oauth/zoho/callback");
		assert_eq!(params["response_type"], "code");
		assert_eq!(params["scope"], "");
		assert_eq!(params["state"], request.state);
		assert_eq!(request.state.len(), STATE_LEN);
		assert!(request.state.chars().all(|c| c.is_ascii_alphanumeric()));
		assert!(request.code_challenge().is_none());
	}

	#[test]
	fn access_type_and_scopes_are_rendered() {
		let client = client(
			ZohoCrm::builder()
				.access_type(AccessType::Offline)
				.build()
				.expect("Offline provider should build."),
		);
		let scopes = ScopeSet::new(["ZohoCRM.modules.ALL", "ZohoCRM.org.READ"])
			.expect("Scope fixture should be valid.");
		let request = client.authorization_url(AuthorizationOptions::default().scopes(scopes));
		let params = query(&request.url);

		assert_eq!(params["access_type"], "offline");
		assert_eq!(params["scope"], "ZohoCRM.modules.ALL,ZohoCRM.org.READ");
	}

	#[test]
	fn prompt_replaces_approval_prompt() {
		let client = client(ZohoCrm::builder().build().expect("Provider should build."));
		let request = client.authorization_url(AuthorizationOptions::default().prompt("consent"));
		let params = query(&request.url);

		assert_eq!(params.get("prompt").map(String::as_str), Some("consent"));
		assert!(!params.contains_key("approval_prompt"));

		let request =
			client.authorization_url(AuthorizationOptions::default().approval_prompt("force"));

		assert_eq!(query(&request.url)["approval_prompt"], "force");
	}

	#[test]
	fn extras_cannot_replace_reserved_parameters() {
		let client = client(ZohoCrm::builder().build().expect("Provider should build."));
		let request = client.authorization_url(
			AuthorizationOptions::default()
				.state("fixed_state")
				.param("client_id", "spoofed")
				.param("state", "spoofed")
				.param("login_hint", "ops@zylker.com"),
		);
		let params = query(&request.url);

		assert_eq!(params["client_id"], "mock_client_id");
		assert_eq!(params["state"], "fixed_state");
		assert_eq!(params["login_hint"], "ops@zylker.com");
		assert_eq!(request.state, "fixed_state");
	}

	#[test]
	fn pkce_challenge_matches_the_verifier() {
		let client =
			client(ZohoCrm::builder().pkce(true).build().expect("PKCE provider should build."));
		let request = client.authorization_url(AuthorizationOptions::default());
		let params = query(&request.url);
		let verifier = request.pkce_verifier().expect("PKCE verifier should be generated.");

		assert_eq!(verifier.len(), PKCE_VERIFIER_LEN);
		assert_eq!(params["code_challenge_method"], "S256");
		assert_eq!(params["code_challenge"], compute_s256_challenge(verifier));
		assert_eq!(request.code_challenge(), Some(params["code_challenge"].as_str()));
		assert!(!format!("{request:?}").contains(verifier));
	}

	#[test]
	fn s256_matches_the_rfc_7636_vector() {
		assert_eq!(
			compute_s256_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
			"E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
		);
	}

	#[test]
	fn state_validation_errors_on_mismatch() {
		let client = client(ZohoCrm::builder().build().expect("Provider should build."));
		let request = client.authorization_url(AuthorizationOptions::default().state("expected"));

		assert!(request.validate_state("expected").is_ok());
		assert!(matches!(request.validate_state("other"), Err(Error::StateMismatch)));
	}
}
