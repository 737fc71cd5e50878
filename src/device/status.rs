//! Flat device status record consumed by dashboards.

// self
use crate::_prelude::*;

/// Whether the device is currently reachable by the remote service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
	/// Device reported in recently.
	Connected,
	/// Device is offline.
	Disconnected,
}
impl Connectivity {
	/// Maps the remote `connected` flag.
	pub const fn from_connected(connected: bool) -> Self {
		if connected { Self::Connected } else { Self::Disconnected }
	}

	/// Returns the dashboard label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Connected => "connected",
			Self::Disconnected => "disconnected",
		}
	}
}
impl Display for Connectivity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Geographic coordinate in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
	/// Degrees north.
	pub latitude: f64,
	/// Degrees east.
	pub longitude: f64,
}

/// Flat status record for one device.
///
/// Serializes with the field names the dashboard expects (`id`, `status`, `batteryLevel`, ...).
/// The coordinate fields are kept private so that `latitude`/`longitude` always mirror the last
/// entry of `positions`, and are all absent together when no history exists.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeviceStatus {
	/// Opaque remote identifier.
	#[serde(rename = "id")]
	pub remote_id: String,
	/// Operational state as reported by the device.
	#[serde(rename = "status")]
	pub state: String,
	/// Battery charge, 0 to 100.
	#[serde(rename = "batteryLevel")]
	pub battery_percent: u8,
	/// Last status report, RFC 3339.
	#[serde(rename = "lastActivity")]
	pub last_activity: String,
	/// Mode of operation.
	#[serde(rename = "modeOfOperation")]
	pub mode: String,
	/// Manufacturer name.
	pub manufacturer: String,
	/// Model name.
	pub model: String,
	/// Serial number rendered as text.
	#[serde(rename = "serialNumber")]
	pub serial_number: String,
	/// Connectivity flag.
	#[serde(rename = "connectionStatus")]
	pub connectivity: Connectivity,
	#[serde(skip_serializing_if = "Option::is_none")]
	latitude: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	longitude: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	positions: Option<Vec<Position>>,
}
impl DeviceStatus {
	/// Creates a record without any position data.
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		remote_id: impl Into<String>,
		state: impl Into<String>,
		battery_percent: u8,
		last_activity: impl Into<String>,
		mode: impl Into<String>,
		manufacturer: impl Into<String>,
		model: impl Into<String>,
		serial_number: impl Into<String>,
		connectivity: Connectivity,
	) -> Self {
		Self {
			remote_id: remote_id.into(),
			state: state.into(),
			battery_percent,
			last_activity: last_activity.into(),
			mode: mode.into(),
			manufacturer: manufacturer.into(),
			model: model.into(),
			serial_number: serial_number.into(),
			connectivity,
			latitude: None,
			longitude: None,
			positions: None,
		}
	}

	/// Replaces the position history. The current coordinate becomes the last entry; an empty
	/// history clears every position field.
	pub fn with_positions(mut self, positions: Vec<Position>) -> Self {
		match positions.last().copied() {
			Some(Position { latitude, longitude }) => {
				self.latitude = Some(latitude);
				self.longitude = Some(longitude);
				self.positions = Some(positions);
			},
			None => {
				self.latitude = None;
				self.longitude = None;
				self.positions = None;
			},
		}

		self
	}

	/// Latitude of the most recent position.
	pub fn latitude(&self) -> Option<f64> {
		self.latitude
	}

	/// Longitude of the most recent position.
	pub fn longitude(&self) -> Option<f64> {
		self.longitude
	}

	/// Most recent position.
	pub fn position(&self) -> Option<Position> {
		self.latitude.zip(self.longitude).map(|(latitude, longitude)| Position { latitude, longitude })
	}

	/// Full position history, oldest first.
	pub fn positions(&self) -> Option<&[Position]> {
		self.positions.as_deref()
	}

	/// Human-friendly name used when registering the device: `"<model> (<serial tail>)"`.
	pub fn registration_name(&self) -> String {
		let model = if self.model.trim().is_empty() { "Automower" } else { self.model.as_str() };
		let serial = self.serial_number.trim();
		let tail = match serial.char_indices().rev().nth(5) {
			Some((idx, _)) => &serial[idx..],
			None if serial.is_empty() => "Unknown",
			None => serial,
		};

		format!("{model} ({tail})")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn sample() -> DeviceStatus {
		DeviceStatus::new(
			"mower-1",
			"IN_OPERATION",
			80,
			"2024-05-01T12:00:00Z",
			"MAIN_AREA",
			"Husqvarna",
			"Automower 430X",
			"190012345",
			Connectivity::Connected,
		)
	}

	#[test]
	fn positions_drive_current_coordinate() {
		let status = sample().with_positions(vec![
			Position { latitude: 1.0, longitude: 2.0 },
			Position { latitude: 3.0, longitude: 4.0 },
		]);

		assert_eq!(status.latitude(), Some(3.0));
		assert_eq!(status.longitude(), Some(4.0));
		assert_eq!(status.positions().map(<[Position]>::len), Some(2));

		let cleared = status.with_positions(Vec::new());

		assert_eq!(cleared.position(), None);
		assert!(cleared.positions().is_none());
	}

	#[test]
	fn serializes_with_dashboard_names() {
		let json = serde_json::to_value(sample()).expect("Status should serialize.");

		assert_eq!(json["id"], "mower-1");
		assert_eq!(json["status"], "IN_OPERATION");
		assert_eq!(json["batteryLevel"], 80);
		assert_eq!(json["lastActivity"], "2024-05-01T12:00:00Z");
		assert_eq!(json["modeOfOperation"], "MAIN_AREA");
		assert_eq!(json["serialNumber"], "190012345");
		assert_eq!(json["connectionStatus"], "connected");
		assert!(json.get("latitude").is_none());
		assert!(json.get("positions").is_none());
	}

	#[test]
	fn registration_name_uses_serial_tail() {
		assert_eq!(sample().registration_name(), "Automower 430X (012345)");

		let mut short = sample();

		short.model = String::new();
		short.serial_number = "42".into();

		assert_eq!(short.registration_name(), "Automower (42)");

		short.serial_number = String::new();

		assert_eq!(short.registration_name(), "Automower (Unknown)");
	}
}
