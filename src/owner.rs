//! Resource owners built from provider user-info responses.

pub mod accessor;

pub use accessor::value_by_key;

// self
use crate::_prelude::*;

/// Authenticated entity described by a provider's user-info response.
pub trait ResourceOwner: Send + Sync + Debug {
	/// Provider-assigned identifier, if the response carried one.
	fn id(&self) -> Option<String>;

	/// All of the owner details as returned by the provider.
	fn to_value(&self) -> Value;
}

/// Zoho CRM organization returned by `GET /crm/v2/org`.
///
/// Zoho wraps the organization in a one-element array:
/// `{"org":[{"id":"4150868000000225013","company_name":"Zylker",...}]}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZohoCrmResourceOwner {
	response: Value,
}
impl ZohoCrmResourceOwner {
	const ID_KEY: &'static str = "org.0.id";
	const ORGANIZATION_NAME_KEY: &'static str = "org.0.company_name";

	/// Wraps a raw organization response.
	pub fn new(response: Value) -> Self {
		Self { response }
	}

	/// Organization identifier (`org.0.id`).
	///
	/// Zoho serializes ids as strings; numeric ids are rendered in decimal.
	pub fn id(&self) -> Option<String> {
		match value_by_key(&self.response, Self::ID_KEY)? {
			Value::String(id) => Some(id.clone()),
			Value::Number(id) => Some(id.to_string()),
			_ => None,
		}
	}

	/// Organization name (`org.0.company_name`).
	pub fn organization_name(&self) -> Option<&str> {
		value_by_key(&self.response, Self::ORGANIZATION_NAME_KEY)?.as_str()
	}

	/// Borrows the raw response.
	pub fn as_value(&self) -> &Value {
		&self.response
	}

	/// Consumes the owner, returning the raw response.
	pub fn into_value(self) -> Value {
		self.response
	}
}
impl ResourceOwner for ZohoCrmResourceOwner {
	fn id(&self) -> Option<String> {
		ZohoCrmResourceOwner::id(self)
	}

	fn to_value(&self) -> Value {
		self.response.clone()
	}
}
