//! JSON:API documents served by the device API.
//!
//! Only the members the status record needs are modeled; everything else the API sends is
//! ignored. Each `data` entry is kept as a raw [`serde_json::Value`] inside the envelope so one
//! malformed device cannot fail the whole listing.

// self
use crate::_prelude::*;

/// `GET /mowers` response envelope.
#[derive(Debug, Deserialize)]
pub struct DeviceListDocument {
	/// Raw device resources, translated one at a time.
	pub data: Vec<serde_json::Value>,
}

/// `GET /mowers/{id}` response envelope.
#[derive(Debug, Deserialize)]
pub struct DeviceDocument {
	/// Raw device resource.
	pub data: serde_json::Value,
}

/// One mower resource as served by the device API.
#[derive(Debug, Deserialize)]
pub struct RemoteDevice {
	/// Opaque remote identifier.
	pub id: String,
	/// Resource attributes.
	pub attributes: RemoteAttributes,
}

/// Attribute groups of a mower resource.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAttributes {
	/// Operational state.
	pub mower: RemoteMower,
	/// Battery readout.
	pub battery: RemoteBattery,
	/// Connection metadata.
	pub metadata: RemoteMetadata,
	/// Hardware identity.
	pub system: RemoteSystem,
	/// Position history, oldest first, read leniently during translation.
	#[serde(default)]
	pub positions: Option<serde_json::Value>,
}

/// Operational block of a mower resource.
#[derive(Debug, Deserialize)]
pub struct RemoteMower {
	/// Operational state, e.g. `IN_OPERATION`.
	pub state: String,
	/// Mode of operation, e.g. `MAIN_AREA`.
	pub mode: String,
}

/// Battery block of a mower resource.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteBattery {
	/// Charge level; values above 100 are rejected during translation.
	pub battery_percent: u8,
}

/// Connection metadata. Newer API revisions name the timestamp `statusTimestamp`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMetadata {
	/// Last status report, epoch milliseconds or an ISO 8601 string.
	#[serde(alias = "statusTimestamp")]
	pub last_status_timestamp: RemoteTimestamp,
	/// Whether the mower is currently reachable.
	pub connected: bool,
}

/// Hardware identity block.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSystem {
	/// Manufacturer name; older payloads omit it.
	#[serde(default)]
	pub manufacturer: Option<String>,
	/// Model name.
	pub model: String,
	/// Serial number, numeric or textual depending on the API revision.
	pub serial_number: RemoteSerial,
}

/// A single recorded position.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct RemotePosition {
	/// Degrees north.
	pub latitude: f64,
	/// Degrees east.
	pub longitude: f64,
}

/// Timestamp as sent on the wire.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RemoteTimestamp {
	/// Milliseconds since the Unix epoch.
	EpochMillis(i64),
	/// Textual timestamp in ISO 8601 form. Text without an offset is read as UTC; anything
	/// else that does not parse rejects the device.
	Text(String),
}

/// Serial number as sent on the wire.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RemoteSerial {
	/// Numeric serial.
	Number(u64),
	/// Textual serial.
	Text(String),
}
impl Display for RemoteSerial {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Number(value) => write!(f, "{value}"),
			Self::Text(value) => f.write_str(value),
		}
	}
}
