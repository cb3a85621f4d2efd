// self
use crate::obs::{LinkOutcome, LinkStage};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_link_outcome(stage: LinkStage, outcome: LinkOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_handoff_link_total",
			"stage" => stage.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (stage, outcome);
	}
}
