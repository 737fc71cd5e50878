//! Remote resource to [`DeviceStatus`] translation.

// crates.io
use serde_json::Value;
use time::{
	PrimitiveDateTime,
	format_description::well_known::{Iso8601, Rfc3339},
};
// self
use crate::{
	_prelude::*,
	device::{
		remote::{RemoteDevice, RemotePosition, RemoteSerial, RemoteTimestamp},
		status::{Connectivity, DeviceStatus, Position},
	},
	error::TranslationError,
};

/// Outcome of translating a device listing.
#[derive(Debug, Default)]
pub struct TranslatedList {
	/// Successfully translated records, in input order.
	pub devices: Vec<DeviceStatus>,
	/// Entries that were dropped.
	pub dropped: Vec<TranslationError>,
}

/// Translates one raw device resource.
///
/// `manufacturer_fallback` fills in payloads whose `system` block omits the manufacturer.
pub fn translate_device(
	value: Value,
	manufacturer_fallback: &str,
) -> Result<DeviceStatus, TranslationError> {
	let device_id = value.get("id").and_then(Value::as_str).map(str::to_owned);
	let remote: RemoteDevice = serde_path_to_error::deserialize(value).map_err(|err| {
		TranslationError::new(device_id.as_deref(), err.path().to_string(), err.inner().to_string())
	})?;

	from_remote(remote, manufacturer_fallback)
}

/// Translates every entry of a listing, dropping malformed entries with a warning.
pub fn translate_list(values: Vec<Value>, manufacturer_fallback: &str) -> TranslatedList {
	let mut list = TranslatedList::default();

	for value in values {
		match translate_device(value, manufacturer_fallback) {
			Ok(status) => list.devices.push(status),
			Err(err) => {
				tracing::warn!(
					device_id = err.device_id.as_deref().unwrap_or("<unknown>"),
					path = %err.path,
					reason = %err.reason,
					"Dropping device entry that could not be translated."
				);

				list.dropped.push(err);
			},
		}
	}

	list
}

fn from_remote(
	remote: RemoteDevice,
	manufacturer_fallback: &str,
) -> Result<DeviceStatus, TranslationError> {
	let RemoteDevice { id, attributes } = remote;
	let battery_percent = attributes.battery.battery_percent;

	if battery_percent > 100 {
		return Err(TranslationError::new(
			Some(&id),
			"attributes.battery.batteryPercent",
			format!("battery level {battery_percent} exceeds 100"),
		));
	}

	let last_activity = normalize_timestamp(&attributes.metadata.last_status_timestamp)
		.map_err(|reason| {
			TranslationError::new(Some(&id), "attributes.metadata.lastStatusTimestamp", reason)
		})?;
	let manufacturer = attributes
		.system
		.manufacturer
		.filter(|value| !value.trim().is_empty())
		.unwrap_or_else(|| manufacturer_fallback.to_owned());
	let serial_number = match attributes.system.serial_number {
		RemoteSerial::Number(value) => value.to_string(),
		RemoteSerial::Text(value) => value,
	};
	let positions = attributes.positions.map(|raw| read_positions(&id, raw)).unwrap_or_default();

	Ok(DeviceStatus::new(
		id,
		attributes.mower.state,
		battery_percent,
		last_activity,
		attributes.mower.mode,
		manufacturer,
		attributes.system.model,
		serial_number,
		Connectivity::from_connected(attributes.metadata.connected),
	)
	.with_positions(positions))
}

// Unreadable histories count as absent.
fn read_positions(device_id: &str, raw: Value) -> Vec<Position> {
	match serde_path_to_error::deserialize::<_, Vec<RemotePosition>>(raw) {
		Ok(fixes) =>
			fixes.into_iter().map(|p| Position { latitude: p.latitude, longitude: p.longitude }).collect(),
		Err(err) => {
			tracing::warn!(
				device_id,
				path = %err.path(),
				reason = %err.inner(),
				"Ignoring position history that could not be read."
			);

			Vec::new()
		},
	}
}

fn normalize_timestamp(raw: &RemoteTimestamp) -> Result<String, String> {
	let moment = match raw {
		RemoteTimestamp::EpochMillis(millis) =>
			OffsetDateTime::from_unix_timestamp_nanos(i128::from(*millis) * 1_000_000)
				.map_err(|err| format!("timestamp {millis} is out of range: {err}"))?,
		RemoteTimestamp::Text(text) => parse_text_timestamp(text)
			.ok_or_else(|| format!("timestamp `{text}` is not ISO 8601"))?,
	};

	moment.format(&Rfc3339).map_err(|err| format!("timestamp cannot be formatted: {err}"))
}

fn parse_text_timestamp(text: &str) -> Option<OffsetDateTime> {
	OffsetDateTime::parse(text, &Rfc3339)
		.or_else(|_| OffsetDateTime::parse(text, &Iso8601::DEFAULT))
		.or_else(|_| PrimitiveDateTime::parse(text, &Iso8601::DEFAULT).map(|dt| dt.assume_utc()))
		.ok()
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn resource(id: &str) -> Value {
		json!({
			"type": "mower",
			"id": id,
			"attributes": {
				"system": { "name": "Front lawn", "model": "Automower 430X", "serialNumber": 190012345 },
				"battery": { "batteryPercent": 77 },
				"mower": { "mode": "MAIN_AREA", "activity": "MOWING", "state": "IN_OPERATION" },
				"metadata": { "connected": true, "statusTimestamp": 1714564800000_i64 },
				"positions": [
					{ "latitude": 57.70, "longitude": 14.16 },
					{ "latitude": 57.71, "longitude": 14.17 }
				]
			}
		})
	}

	#[test]
	fn translates_full_resource() {
		let status = translate_device(resource("mower-1"), "Husqvarna")
			.expect("Well-formed resource should translate.");

		assert_eq!(status.remote_id, "mower-1");
		assert_eq!(status.state, "IN_OPERATION");
		assert_eq!(status.mode, "MAIN_AREA");
		assert_eq!(status.battery_percent, 77);
		assert_eq!(status.last_activity, "2024-05-01T12:00:00Z");
		assert_eq!(status.manufacturer, "Husqvarna");
		assert_eq!(status.serial_number, "190012345");
		assert_eq!(status.connectivity, Connectivity::Connected);
		assert_eq!(status.position(), Some(Position { latitude: 57.71, longitude: 14.17 }));
	}

	#[test]
	fn accepts_textual_timestamp_and_serial() {
		let mut value = resource("mower-2");

		value["attributes"]["metadata"] =
			json!({ "connected": false, "lastStatusTimestamp": "2024-05-01T14:00:00+02:00" });
		value["attributes"]["system"]["serialNumber"] = json!("SN-0042");
		value["attributes"]["system"]["manufacturer"] = json!("Gardena");

		let status = translate_device(value, "Husqvarna").expect("Resource should translate.");

		assert_eq!(status.last_activity, "2024-05-01T14:00:00+02:00");
		assert_eq!(status.serial_number, "SN-0042");
		assert_eq!(status.manufacturer, "Gardena");
		assert_eq!(status.connectivity, Connectivity::Disconnected);
	}

	#[test]
	fn missing_or_empty_positions_leave_coordinates_absent() {
		let mut empty = resource("mower-3");

		empty["attributes"]["positions"] = json!([]);

		let status = translate_device(empty, "Husqvarna").expect("Resource should translate.");

		assert_eq!(status.position(), None);
		assert!(status.positions().is_none());

		let mut missing = resource("mower-4");

		if let Some(attrs) = missing["attributes"].as_object_mut() {
			attrs.remove("positions");
		}

		let status = translate_device(missing, "Husqvarna").expect("Resource should translate.");

		assert_eq!(status.latitude(), None);
		assert_eq!(status.longitude(), None);
	}

	#[test]
	fn garbled_position_history_keeps_the_device() {
		let mut partial = resource("mower-7");

		partial["attributes"]["positions"] =
			json!([{ "latitude": 57.70, "longitude": 14.16 }, { "latitude": 57.8 }]);

		let mut scalar = resource("mower-8");

		scalar["attributes"]["positions"] = json!("unavailable");

		let list = translate_list(vec![partial, scalar], "Husqvarna");

		assert!(list.dropped.is_empty());
		assert_eq!(list.devices.len(), 2);

		for status in &list.devices {
			assert_eq!(status.position(), None);
			assert!(status.positions().is_none());
			assert_eq!(status.battery_percent, 77);
		}
	}

	#[test]
	fn offsetless_timestamp_is_read_as_utc() {
		let mut value = resource("mower-9");

		value["attributes"]["metadata"]["statusTimestamp"] = json!("2024-05-01T12:00:00");

		let status = translate_device(value, "Husqvarna").expect("Resource should translate.");

		assert_eq!(status.last_activity, "2024-05-01T12:00:00Z");

		let mut garbage = resource("mower-10");

		garbage["attributes"]["metadata"]["statusTimestamp"] = json!("yesterday");

		let err = translate_device(garbage, "Husqvarna").expect_err("Free text must fail.");

		assert_eq!(err.path, "attributes.metadata.lastStatusTimestamp");
	}

	#[test]
	fn missing_field_reports_path() {
		let mut value = resource("mower-5");

		value["attributes"]["battery"] = json!({});

		let err = translate_device(value, "Husqvarna").expect_err("Missing battery must fail.");

		assert_eq!(err.device_id.as_deref(), Some("mower-5"));
		assert_eq!(err.path, "attributes.battery");
		assert!(err.reason.contains("batteryPercent"));
	}

	#[test]
	fn battery_above_hundred_is_rejected() {
		let mut value = resource("mower-6");

		value["attributes"]["battery"]["batteryPercent"] = json!(130);

		let err = translate_device(value, "Husqvarna").expect_err("Battery 130 must fail.");

		assert_eq!(err.path, "attributes.battery.batteryPercent");
	}

	#[test]
	fn list_drops_malformed_entries_and_keeps_order() {
		let mut broken = resource("mower-b");

		broken["attributes"]["mower"] = json!({ "mode": "MAIN_AREA" });

		let list = translate_list(
			vec![resource("mower-a"), broken, json!("not an object"), resource("mower-c")],
			"Husqvarna",
		);
		let ids = list.devices.iter().map(|d| d.remote_id.as_str()).collect::<Vec<_>>();

		assert_eq!(ids, ["mower-a", "mower-c"]);
		assert_eq!(list.dropped.len(), 2);
		assert_eq!(list.dropped[0].device_id.as_deref(), Some("mower-b"));
		assert_eq!(list.dropped[1].device_id, None);
	}
}
