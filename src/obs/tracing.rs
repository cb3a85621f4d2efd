// self
use crate::{_prelude::*, obs::LinkStage};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedLink<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedLink<F> = F;

/// A span builder used by the link flows.
#[derive(Clone, Debug)]
pub struct LinkSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl LinkSpan {
	/// Creates a new span tagged with the provided stage + call site.
	pub fn new(stage: LinkStage, op: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth2_handoff.link", stage = stage.as_str(), op);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (stage, op);

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> LinkSpanGuard {
		#[cfg(feature = "tracing")]
		{
			LinkSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			LinkSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedLink<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// RAII guard returned by [`LinkSpan::entered`].
pub struct LinkSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for LinkSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("LinkSpanGuard(..)")
	}
}
