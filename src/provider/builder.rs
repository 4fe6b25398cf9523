//! Validated construction of [`ZohoCrm`] from a data-center preset and optional overrides.

// self
use crate::{
	_prelude::*,
	provider::{AccessType, DataCenter, ZohoCrm, ZohoEndpoints},
};

const AUTHORIZATION_PATH: &str = "/oauth/v2/auth";
const TOKEN_PATH: &str = "/oauth/v2/token";
const REVOCATION_PATH: &str = "/oauth/v2/token/revoke";
const ORGANIZATION_PATH: &str = "/crm/v2/org";

/// Errors raised while constructing or validating a provider.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ProviderConfigError {
	/// A configured base URL does not parse.
	#[error("The {field} URL `{value}` is invalid.")]
	InvalidUrl {
		/// Which setting failed validation.
		field: &'static str,
		/// Value that failed to parse.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URLs must use HTTPS (plain HTTP is only accepted for loopback hosts).
	#[error("The {field} URL must use HTTPS: {url}.")]
	InsecureUrl {
		/// Which setting failed validation.
		field: &'static str,
		/// URL that failed validation.
		url: String,
	},
	/// Base URLs cannot carry a query string or fragment.
	#[error("The {field} URL must not carry a query or fragment: {url}.")]
	UnexpectedQuery {
		/// Which setting failed validation.
		field: &'static str,
		/// URL that failed validation.
		url: String,
	},
	/// Base URLs must be hierarchical (e.g. not `mailto:`).
	#[error("The {field} URL cannot be used as a base: {url}.")]
	CannotBeABase {
		/// Which setting failed validation.
		field: &'static str,
		/// URL that failed validation.
		url: String,
	},
}

/// Builder for [`ZohoCrm`] values.
///
/// Explicit servers take precedence over the [`DataCenter`] preset, so a caller can pick
/// a region and still route one of the hosts through a proxy.
#[derive(Clone, Debug, Default)]
pub struct ZohoCrmBuilder {
	/// Regional preset supplying both base URLs.
	pub data_center: DataCenter,
	/// Accounts server override.
	pub accounts_server: Option<String>,
	/// API host override.
	pub host_resource_location: Option<String>,
	/// Value sent as the `access_type` authorization parameter.
	pub access_type: Option<AccessType>,
	/// Whether authorization requests carry a PKCE challenge.
	pub pkce: bool,
}
impl ZohoCrmBuilder {
	/// Creates a builder seeded with the US data center.
	pub fn new() -> Self {
		Self::default()
	}

	/// Selects the regional preset.
	pub fn data_center(mut self, data_center: DataCenter) -> Self {
		self.data_center = data_center;

		self
	}

	/// Overrides the accounts server (authorization and token endpoints).
	pub fn accounts_server(mut self, url: impl Into<String>) -> Self {
		self.accounts_server = Some(url.into());

		self
	}

	/// Overrides the API host (organization lookups).
	pub fn host_resource_location(mut self, url: impl Into<String>) -> Self {
		self.host_resource_location = Some(url.into());

		self
	}

	/// Sets the `access_type` authorization parameter.
	pub fn access_type(mut self, access_type: AccessType) -> Self {
		self.access_type = Some(access_type);

		self
	}

	/// Toggles PKCE (S256) on authorization requests.
	pub fn pkce(mut self, enabled: bool) -> Self {
		self.pkce = enabled;

		self
	}

	/// Consumes the builder and validates the resulting provider.
	pub fn build(self) -> Result<ZohoCrm, ProviderConfigError> {
		let accounts_raw =
			self.accounts_server.as_deref().unwrap_or(self.data_center.accounts_server());
		let api_raw =
			self.host_resource_location.as_deref().unwrap_or(self.data_center.api_host());
		let accounts_server = parse_base("accounts_server", accounts_raw)?;
		let host_resource_location = parse_base("host_resource_location", api_raw)?;
		let endpoints = ZohoEndpoints {
			authorization: join("accounts_server", &accounts_server, AUTHORIZATION_PATH)?,
			token: join("accounts_server", &accounts_server, TOKEN_PATH)?,
			revocation: join("accounts_server", &accounts_server, REVOCATION_PATH)?,
			organization: join("host_resource_location", &host_resource_location, ORGANIZATION_PATH)?,
		};

		Ok(ZohoCrm {
			accounts_server,
			host_resource_location,
			access_type: self.access_type,
			pkce: self.pkce,
			endpoints,
		})
	}
}

fn parse_base(field: &'static str, raw: &str) -> Result<Url, ProviderConfigError> {
	let url = Url::parse(raw.trim()).map_err(|source| ProviderConfigError::InvalidUrl {
		field,
		value: raw.to_owned(),
		source,
	})?;

	if url.cannot_be_a_base() {
		return Err(ProviderConfigError::CannotBeABase { field, url: url.to_string() });
	}
	if url.query().is_some() || url.fragment().is_some() {
		return Err(ProviderConfigError::UnexpectedQuery { field, url: url.to_string() });
	}

	match url.scheme() {
		"https" => Ok(url),
		"http" if is_loopback(&url) => Ok(url),
		_ => Err(ProviderConfigError::InsecureUrl { field, url: url.to_string() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
		Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	}
}

// Appends `path` to the base, keeping any path prefix the base already has.
fn join(field: &'static str, base: &Url, path: &str) -> Result<Url, ProviderConfigError> {
	let joined = format!("{}{path}", base.as_str().trim_end_matches('/'));

	Url::parse(&joined).map_err(|source| ProviderConfigError::InvalidUrl {
		field,
		value: joined,
		source,
	})
}
