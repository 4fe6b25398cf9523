#![cfg(feature = "reqwest")]

// self
use oauth2_zoho_crm::{
	auth::AccessToken,
	error::Error,
	flows::ZohoCrmClient,
	provider::ZohoCrm,
	url::Url,
};

// Nothing listens on port 1, so every connection is refused.
const UNREACHABLE: &str = "http://127.0.0.1:1";

fn unreachable_client() -> ZohoCrmClient {
	let provider = ZohoCrm::builder()
		.accounts_server(UNREACHABLE)
		.host_resource_location(UNREACHABLE)
		.build()
		.expect("Loopback provider should build.");
	let redirect_uri =
		Url::parse("https://app.example.com/oauth/zoho/callback").expect("Redirect URI should parse.");

	ZohoCrmClient::new(provider, "1000.CLIENTOFFLINE", redirect_uri)
		.expect("Client should build.")
		.with_client_secret("secret-offline")
}

#[tokio::test]
async fn refused_connections_are_transport_errors() {
	let client = unreachable_client();
	let err = client
		.exchange_code("mock_authorization_code")
		.await
		.expect_err("Exchanges against a closed port must fail.");

	assert!(matches!(err, Error::Transport(_)), "Expected a transport error, got {err:?}.");

	let token = AccessToken::builder()
		.access_token("mock_access_token")
		.build()
		.expect("Token fixture should build.");
	let err = client
		.resource_owner(&token)
		.await
		.expect_err("Lookups against a closed port must fail.");

	assert!(matches!(err, Error::Transport(_)), "Expected a transport error, got {err:?}.");
}
