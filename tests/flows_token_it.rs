#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use oauth2_zoho_crm::{
	error::{ConfigError, Error, TransientError},
	flows::{AuthorizationOptions, ZohoCrmClient},
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	provider::{AccessType, ZohoCrm},
	reqwest,
	url::Url,
};

const CLIENT_ID: &str = "1000.CLIENTIT";
const CLIENT_SECRET: &str = "secret-it";
const REDIRECT_URI: &str = "https://app.example.com/oauth/zoho/callback";

// httpmock serves HTTPS with a self-signed certificate.
fn mock_transport() -> ReqwestHttpClient {
	let client = reqwest::Client::builder()
		.danger_accept_invalid_certs(true)
		.redirect(reqwest::redirect::Policy::none())
		.build()
		.expect("Mock transport should build.");

	ReqwestHttpClient::with_client(client)
}

fn build_client(server: &MockServer, pkce: bool) -> ZohoCrmClient {
	let provider = ZohoCrm::builder()
		.accounts_server(server.base_url())
		.host_resource_location(server.base_url())
		.access_type(AccessType::Offline)
		.pkce(pkce)
		.build()
		.expect("Mock provider should build.");
	let redirect_uri = Url::parse(REDIRECT_URI).expect("Redirect URI should parse.");

	ZohoCrmClient::with_http_client(
		provider,
		CLIENT_ID,
		redirect_uri,
		mock_transport(),
		ReqwestTransportErrorMapper,
	)
	.with_client_secret(CLIENT_SECRET)
}

#[tokio::test]
async fn exchange_code_sends_credentials_in_the_body() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, false);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/v2/token")
				.header("content-type", "application/x-www-form-urlencoded")
				.form_urlencoded_tuple("grant_type", "authorization_code")
				.form_urlencoded_tuple("code", "mock_authorization_code")
				.form_urlencoded_tuple("client_id", CLIENT_ID)
				.form_urlencoded_tuple("client_secret", CLIENT_SECRET)
				.form_urlencoded_tuple("redirect_uri", REDIRECT_URI);
			then.status(200).header("content-type", "application/json").body(
				r#"{"access_token":"mock_access_token","refresh_token":"mock_refresh_token","api_domain":"https://www.zohoapis.com","token_type":"Bearer","expires_in":3600}"#,
			);
		})
		.await;
	let token = client
		.exchange_code("mock_authorization_code")
		.await
		.expect("Authorization code exchange should succeed.");

	mock.assert_async().await;

	assert_eq!(token.access_token.expose(), "mock_access_token");
	assert_eq!(token.refresh_token.as_ref().map(|secret| secret.expose()), Some("mock_refresh_token"));
	assert_eq!(token.api_domain.as_deref(), Some("https://www.zohoapis.com"));
	assert_eq!(token.token_type, "Bearer");
	assert!(token.expires_at.is_some_and(|at| at > token.issued_at));
	assert!(!token.is_expired());
}

#[tokio::test]
async fn complete_authorization_replays_the_pkce_verifier() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, true);
	let request = client.authorization_url(AuthorizationOptions::default());
	let params = request.url.query_pairs().into_owned().collect::<Vec<_>>();

	assert!(params.iter().any(|(key, value)| key == "access_type" && value == "offline"));
	assert!(params.iter().any(|(key, value)| key == "code_challenge_method" && value == "S256"));

	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/v2/token")
				.form_urlencoded_tuple("grant_type", "authorization_code")
				.form_urlencoded_tuple("code", "mock_authorization_code")
				.form_urlencoded_tuple_exists("code_verifier");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"mock_access_token","token_type":"Bearer","expires_in":3600}"#);
		})
		.await;
	let err = client
		.complete_authorization(&request, "tampered", "mock_authorization_code")
		.await
		.expect_err("A mismatched state must be rejected before any request.");

	assert!(matches!(err, Error::StateMismatch));

	mock.assert_calls_async(0).await;

	let token = client
		.complete_authorization(&request, &request.state, "mock_authorization_code")
		.await
		.expect("Authorization should complete with the original state.");

	mock.assert_async().await;

	assert_eq!(token.access_token.expose(), "mock_access_token");
	assert!(token.refresh_token.is_none());
}

#[tokio::test]
async fn ok_status_with_error_body_is_an_identity_provider_error() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, false);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v2/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"error":"invalid_code"}"#);
		})
		.await;
	let err = client
		.exchange_code("expired_code")
		.await
		.expect_err("Zoho's error payloads must not be treated as tokens.");

	mock.assert_async().await;

	let provider_err = err.as_identity_provider().expect("Error should come from the provider.");

	assert_eq!(provider_err.status, 200);
	assert_eq!(provider_err.oauth_error.as_deref(), Some("invalid_code"));
}

#[tokio::test]
async fn error_status_is_an_identity_provider_error() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, false);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v2/token");
			then.status(400)
				.header("content-type", "application/json")
				.body(r#"{"error":"invalid_client","error_description":"Client is not registered.","zoho_detail":"client deleted"}"#);
		})
		.await;
	let err = client
		.exchange_code("mock_authorization_code")
		.await
		.expect_err("400 responses must be rejected.");

	mock.assert_async().await;

	let Error::IdentityProvider(provider_err) = err else {
		panic!("Expected an identity provider error, got {err:?}.");
	};

	assert_eq!(provider_err.status, 400);
	assert_eq!(provider_err.message, "Bad Request");
	assert_eq!(provider_err.oauth_error.as_deref(), Some("invalid_client"));
	assert_eq!(provider_err.error_description.as_deref(), Some("Client is not registered."));
	assert!(
		provider_err.body.as_deref().is_some_and(|body| body.contains("\"zoho_detail\":\"client deleted\"")),
		"The raw body should be kept, got {:?}.",
		provider_err.body
	);
}

#[tokio::test]
async fn malformed_token_bodies_are_transient() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, false);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v2/token");
			then.status(200).header("content-type", "application/json").body("{\"access_token\":");
		})
		.await;
	let err = client
		.exchange_code("mock_authorization_code")
		.await
		.expect_err("Truncated JSON must be rejected.");

	mock.assert_async().await;

	assert!(matches!(err, Error::Transient(TransientError::ResponseParse { .. })));
}

#[tokio::test]
async fn zero_lifetime_is_a_config_error() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, false);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v2/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"mock_access_token","token_type":"Bearer","expires_in":0}"#);
		})
		.await;
	let err = client
		.exchange_code("mock_authorization_code")
		.await
		.expect_err("Non-positive lifetimes must be rejected.");

	mock.assert_async().await;

	assert!(matches!(err, Error::Config(ConfigError::NonPositiveExpiresIn)));
}
