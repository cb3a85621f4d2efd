//! One-shot completion signaling for in-flight link attempts.
//!
//! The hub gives callers an awaitable alternative to polling the claim endpoint on a
//! fixed interval: the callback handler signals once a credential lands, outstanding
//! watches resolve, and claimed flows are cleared so the same identity can link again
//! later. Polling still works; the watch is purely additive.

// crates.io
use async_lock::OnceCell;
// self
use crate::{_prelude::*, auth::FlowIdentity};

/// Distributes one-shot completion signals keyed by flow identity.
#[derive(Debug, Default)]
pub struct CompletionHub(Mutex<HashMap<FlowIdentity, Arc<OnceCell<()>>>>);
impl CompletionHub {
	fn cell(&self, identity: &FlowIdentity) -> Arc<OnceCell<()>> {
		self.0
			.lock()
			.entry(identity.clone())
			.or_insert_with(|| Arc::new(OnceCell::new()))
			.clone()
	}

	/// Returns a watch handle that resolves once the identity's flow completes.
	///
	/// Signals are sticky: a watch taken after the signal resolves immediately.
	pub fn watch(&self, identity: &FlowIdentity) -> CompletionWatch {
		CompletionWatch { cell: self.cell(identity) }
	}

	/// Marks the identity's flow as complete, waking every outstanding watch.
	pub fn signal(&self, identity: &FlowIdentity) {
		let _ = self.cell(identity).set_blocking(());
	}

	/// Drops the identity's completion entry once its credential has been claimed.
	pub fn clear(&self, identity: &FlowIdentity) {
		self.0.lock().remove(identity);
	}
}

/// Handle resolving when the matching flow completes.
#[derive(Clone, Debug)]
pub struct CompletionWatch {
	cell: Arc<OnceCell<()>>,
}
impl CompletionWatch {
	/// Waits until the callback handler reports completion.
	pub async fn wait(&self) {
		self.cell.wait().await;
	}

	/// Returns `true` if completion has already been signaled.
	pub fn is_complete(&self) -> bool {
		self.cell.is_initialized()
	}
}
