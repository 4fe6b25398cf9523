//! Auth-domain models: scope sets and access tokens.

pub mod scope;
pub mod token;

pub use scope::*;
pub use token::{record::*, secret::*};
