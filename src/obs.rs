//! Observability helpers for device-control operations.
//!
//! Every public operation runs inside an `mower_control.op` span carrying the `op` field. With
//! the `metrics` feature enabled, each attempt, success, and failure also increments the
//! `mower_control_op_total` counter labeled by `op` and `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Client-credentials exchange.
	TokenRefresh,
	/// `GET /mowers`.
	ListDevices,
	/// `GET /mowers/{id}`.
	GetDevice,
	/// `POST /mowers/{id}/actions`.
	SendCommand,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::TokenRefresh => "token_refresh",
			OpKind::ListDevices => "list_devices",
			OpKind::GetDevice => "get_device",
			OpKind::SendCommand => "send_command",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Operation started.
	Attempt,
	/// Operation completed.
	Success,
	/// Operation failed; the public wrapper degraded to its fallback value.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
