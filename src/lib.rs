//! Zoho CRM provider for OAuth 2.0: multi-DC endpoint configuration, `access_type`
//! handling, and organization lookups on top of a transport-agnostic client.
//!
//! The crate is split into a provider layer ([`provider`], [`owner`]) that describes
//! Zoho CRM, and a client layer ([`flows`], [`oauth`], [`http`]) that drives the
//! authorization-code grant, token refreshes, revocation, and authenticated lookups for
//! any [`provider::Provider`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod owner;
pub mod provider;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		flows::Client,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::{ZohoCrm, ZohoCrmBuilder},
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = Client<ZohoCrm, ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Points both Zoho base URLs at a mock server root (e.g. `httpmock`'s `server.base_url()`).
	pub fn mock_provider_builder(base_url: &str) -> ZohoCrmBuilder {
		ZohoCrm::builder().accounts_server(base_url).host_resource_location(base_url)
	}

	/// Constructs a [`Client`] for `provider` backed by the insecure test transport.
	pub fn build_reqwest_test_client(
		provider: ZohoCrm,
		client_id: &str,
		client_secret: &str,
	) -> ReqwestTestClient {
		let redirect_uri = Url::parse("https://app.example.com/oauth/zoho/callback")
			.expect("Test redirect URI should parse.");

		Client::with_http_client(
			provider,
			client_id,
			redirect_uri,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
		.with_client_secret(client_secret)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
