//! Provider-facing contract (behavior) and the Zoho CRM provider (data).
//!
//! `contract` defines [`Provider`], the hook set the client layer consults for endpoint
//! URLs, authorization parameters, response checks, and resource-owner construction.
//! `zoho` implements it for Zoho CRM, with `builder` validating the multi-DC base URLs
//! and `data_center` carrying Zoho's regional presets.

pub mod builder;
pub mod contract;
pub mod data_center;
pub mod zoho;

pub use builder::*;
pub use contract::*;
pub use data_center::*;
pub use zoho::*;
