// self
use crate::{
	_prelude::*,
	obs::{FlowKind, FlowOutcome},
};

/// Records a flow outcome via the global metrics recorder (when enabled).
///
/// Attempts and successes carry `error="none"`; use [`record_flow_failure`] when the
/// failing [`Error`] is at hand so the counter can be split by error class.
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	increment(kind, outcome, "none");
}

/// Records a failed flow labeled with the class of `error`.
pub fn record_flow_failure(kind: FlowKind, error: &Error) {
	increment(kind, FlowOutcome::Failure, error_class(error));
}

/// Stable label for the family `error` belongs to.
pub const fn error_class(error: &Error) -> &'static str {
	match error {
		Error::Config(_) => "config",
		Error::Transient(_) => "transient",
		Error::Transport(_) => "transport",
		Error::IdentityProvider(_) => "identity_provider",
		Error::StateMismatch => "state_mismatch",
	}
}

fn increment(kind: FlowKind, outcome: FlowOutcome, error: &'static str) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"zoho_crm_oauth2_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str(),
			"error" => error
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome, error);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::{ConfigError, IdentityProviderError};

	#[test]
	fn failures_are_classified_by_error_family() {
		assert_eq!(error_class(&ConfigError::MissingRefreshToken.into()), "config");
		assert_eq!(
			error_class(&IdentityProviderError::new("Bad Request", 400).into()),
			"identity_provider"
		);
		assert_eq!(error_class(&Error::StateMismatch), "state_mismatch");

		record_flow_failure(FlowKind::RefreshToken, &Error::StateMismatch);
		record_flow_outcome(FlowKind::ResourceOwner, FlowOutcome::Attempt);
	}
}
