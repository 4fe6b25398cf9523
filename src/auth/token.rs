//! Access token models returned by token endpoints.

pub mod record;
pub mod secret;
