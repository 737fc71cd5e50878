// crates.io
use tracing::{Instrument, Span, instrument::Instrumented};
// self
use crate::{_prelude::*, obs::OpKind};

/// Span wrapper shared by client operations.
#[derive(Clone, Debug)]
pub struct OpSpan {
	span: Span,
}
impl OpSpan {
	/// Creates a span tagged with the operation and, when known, the target device.
	pub fn new(kind: OpKind, device_id: Option<&str>) -> Self {
		let span = tracing::info_span!(
			"mower_control.op",
			op = kind.as_str(),
			device_id = device_id.unwrap_or_default()
		);

		Self { span }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		fut.instrument(self.span.clone())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = OpSpan::new(OpKind::GetDevice, Some("mower-1"));
		let value = OpSpan::instrument(&span, async { 42 }).await;

		assert_eq!(value, 42);
	}
}
