//! Regional Zoho deployments and their default base URLs.

// self
use crate::_prelude::*;

/// Zoho's regional deployments. Each one runs its own accounts server and API host, and
/// tokens minted in one data center are only valid against that data center's APIs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataCenter {
	/// United States (`zoho.com`).
	#[default]
	Us,
	/// European Union (`zoho.eu`).
	Eu,
	/// India (`zoho.in`).
	In,
	/// Australia (`zoho.com.au`).
	Au,
	/// China (`zoho.com.cn`).
	Cn,
	/// Japan (`zoho.jp`).
	Jp,
	/// Canada (`zohocloud.ca`).
	Ca,
	/// Saudi Arabia (`zoho.sa`).
	Sa,
}
impl DataCenter {
	/// Every known data center.
	pub const ALL: [DataCenter; 8] = [
		DataCenter::Us,
		DataCenter::Eu,
		DataCenter::In,
		DataCenter::Au,
		DataCenter::Cn,
		DataCenter::Jp,
		DataCenter::Ca,
		DataCenter::Sa,
	];

	/// Short label (`us`, `eu`, ...).
	pub const fn as_str(self) -> &'static str {
		match self {
			DataCenter::Us => "us",
			DataCenter::Eu => "eu",
			DataCenter::In => "in",
			DataCenter::Au => "au",
			DataCenter::Cn => "cn",
			DataCenter::Jp => "jp",
			DataCenter::Ca => "ca",
			DataCenter::Sa => "sa",
		}
	}

	/// Accounts server hosting the authorization and token endpoints.
	pub const fn accounts_server(self) -> &'static str {
		match self {
			DataCenter::Us => "https://accounts.zoho.com",
			DataCenter::Eu => "https://accounts.zoho.eu",
			DataCenter::In => "https://accounts.zoho.in",
			DataCenter::Au => "https://accounts.zoho.com.au",
			DataCenter::Cn => "https://accounts.zoho.com.cn",
			DataCenter::Jp => "https://accounts.zoho.jp",
			DataCenter::Ca => "https://accounts.zohocloud.ca",
			DataCenter::Sa => "https://accounts.zoho.sa",
		}
	}

	/// API host serving the CRM REST endpoints.
	pub const fn api_host(self) -> &'static str {
		match self {
			DataCenter::Us => "https://www.zohoapis.com",
			DataCenter::Eu => "https://www.zohoapis.eu",
			DataCenter::In => "https://www.zohoapis.in",
			DataCenter::Au => "https://www.zohoapis.com.au",
			DataCenter::Cn => "https://www.zohoapis.com.cn",
			DataCenter::Jp => "https://www.zohoapis.jp",
			DataCenter::Ca => "https://www.zohoapis.ca",
			DataCenter::Sa => "https://www.zohoapis.sa",
		}
	}

	/// Finds the data center whose API host matches `api_domain` (as reported in token
	/// responses).
	pub fn from_api_domain(api_domain: &str) -> Option<Self> {
		let needle = api_domain.trim_end_matches('/');

		Self::ALL.into_iter().find(|dc| dc.api_host() == needle)
	}
}
impl Display for DataCenter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for DataCenter {
	type Err = UnknownDataCenter;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|dc| dc.as_str().eq_ignore_ascii_case(s))
			.ok_or_else(|| UnknownDataCenter(s.to_owned()))
	}
}

/// Error returned when parsing an unknown data center label.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown Zoho data center `{0}`.")]
pub struct UnknownDataCenter(pub String);

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn us_is_the_default() {
		let dc = DataCenter::default();

		assert_eq!(dc.accounts_server(), "https://accounts.zoho.com");
		assert_eq!(dc.api_host(), "https://www.zohoapis.com");
	}

	#[test]
	fn labels_parse_case_insensitively() {
		assert_eq!("EU".parse::<DataCenter>(), Ok(DataCenter::Eu));
		assert_eq!("ca".parse::<DataCenter>(), Ok(DataCenter::Ca));
		assert!("mars".parse::<DataCenter>().is_err());

		for dc in DataCenter::ALL {
			assert_eq!(dc.to_string().parse::<DataCenter>(), Ok(dc));
		}
	}

	#[test]
	fn api_domain_lookup_matches_token_responses() {
		assert_eq!(DataCenter::from_api_domain("https://www.zohoapis.in"), Some(DataCenter::In));
		assert_eq!(DataCenter::from_api_domain("https://www.zohoapis.eu/"), Some(DataCenter::Eu));
		assert_eq!(DataCenter::from_api_domain("https://example.com"), None);
	}

	#[test]
	fn every_preset_pairs_its_accounts_server_with_its_api_host() {
		let expected = [
			(DataCenter::Us, "https://accounts.zoho.com", "https://www.zohoapis.com"),
			(DataCenter::Eu, "https://accounts.zoho.eu", "https://www.zohoapis.eu"),
			(DataCenter::In, "https://accounts.zoho.in", "https://www.zohoapis.in"),
			(DataCenter::Au, "https://accounts.zoho.com.au", "https://www.zohoapis.com.au"),
			(DataCenter::Cn, "https://accounts.zoho.com.cn", "https://www.zohoapis.com.cn"),
			(DataCenter::Jp, "https://accounts.zoho.jp", "https://www.zohoapis.jp"),
			(DataCenter::Ca, "https://accounts.zohocloud.ca", "https://www.zohoapis.ca"),
			(DataCenter::Sa, "https://accounts.zoho.sa", "https://www.zohoapis.sa"),
		];

		assert_eq!(expected.map(|(dc, _, _)| dc), DataCenter::ALL);

		for (dc, accounts, api) in expected {
			assert_eq!(dc.accounts_server(), accounts, "{dc} accounts server");
			assert_eq!(dc.api_host(), api, "{dc} API host");
			assert_eq!(DataCenter::from_api_domain(api), Some(dc));
		}
	}
}
