//! Prints a Zoho CRM authorization URL and, when an authorization code is supplied,
//! exchanges it and looks up the organization.
//!
//! ```sh
//! ZOHO_CLIENT_ID=1000.XXXX ZOHO_CLIENT_SECRET=... cargo run --example authorize
//! ZOHO_CLIENT_ID=1000.XXXX ZOHO_CLIENT_SECRET=... ZOHO_CODE=1000.abcd \
//! 	cargo run --example authorize
//! ```

// std
use std::env;
// crates.io
use color_eyre::{Result, eyre::eyre};
use serde_json::json;
// self
use oauth2_zoho_crm::{
	auth::ScopeSet,
	config::ZohoCrmConfig,
	flows::AuthorizationOptions,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config: ZohoCrmConfig = serde_json::from_value(json!({
		"client_id": env::var("ZOHO_CLIENT_ID")?,
		"client_secret": env::var("ZOHO_CLIENT_SECRET").ok(),
		"redirect_uri": env::var("ZOHO_REDIRECT_URI")
			.unwrap_or_else(|_| "http://localhost:8080/oauth/zoho/callback".into()),
		"access_type": "offline",
		"data_center": env::var("ZOHO_DATA_CENTER").unwrap_or_else(|_| "us".into()),
	}))?;
	let client = config.into_client()?;
	let scopes = ScopeSet::new(["ZohoCRM.org.READ", "ZohoCRM.modules.ALL"])?;
	let request = client.authorization_url(AuthorizationOptions::default().scopes(scopes));

	println!("Send your user to {}.", request.url);

	let Ok(code) = env::var("ZOHO_CODE") else {
		println!("Set ZOHO_CODE to the `code` query parameter from the redirect to continue.");

		return Ok(());
	};
	let token = client.exchange_code(&code).await?;

	println!("Access token status: {:?}.", token.status());

	let owner = client.resource_owner(&token).await?;
	let name = owner.organization_name().ok_or_else(|| eyre!("Organization has no name."))?;

	println!("Authorized against organization {name} ({:?}).", owner.id());

	if let Some(refresh) = &token.refresh_token {
		client.revoke_token(refresh).await?;

		println!("Revoked the refresh token.");
	}

	Ok(())
}
