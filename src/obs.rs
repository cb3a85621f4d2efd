//! Optional observability helpers for link flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_handoff.link` with the
//!   `stage` (flow step) and `op` (call site) fields.
//! - Enable `metrics` to increment the `oauth2_handoff_link_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Link-flow stages observed by the connector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkStage {
	/// Opening an attempt and building the authorize URL.
	Start,
	/// Handling the provider redirect and exchanging the code.
	Callback,
	/// One-shot credential claim.
	Claim,
}
impl LinkStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LinkStage::Start => "start",
			LinkStage::Callback => "callback",
			LinkStage::Claim => "claim",
		}
	}
}
impl Display for LinkStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkOutcome {
	/// Entry to a flow operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl LinkOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LinkOutcome::Attempt => "attempt",
			LinkOutcome::Success => "success",
			LinkOutcome::Failure => "failure",
		}
	}
}
impl Display for LinkOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
