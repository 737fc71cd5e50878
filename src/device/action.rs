//! Control actions and their JSON:API command payload.

// self
use crate::{_prelude::*, config::MAX_DURATION_MINUTES};

/// Control action accepted by `POST /mowers/{id}/actions`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceAction {
	/// Start mowing for a bounded time.
	Start,
	/// Pause in place.
	Pause,
	/// Park in the charging station for a bounded time.
	Park,
	/// Park until the next scheduled task.
	ParkUntilNextSchedule,
	/// Park until explicitly resumed.
	ParkUntilFurtherNotice,
	/// Return to the configured schedule.
	ResumeSchedule,
}
impl DeviceAction {
	/// Every action, in declaration order.
	pub const ALL: [Self; 6] = [
		Self::Start,
		Self::Pause,
		Self::Park,
		Self::ParkUntilNextSchedule,
		Self::ParkUntilFurtherNotice,
		Self::ResumeSchedule,
	];

	/// Wire name of the action.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Start => "Start",
			Self::Pause => "Pause",
			Self::Park => "Park",
			Self::ParkUntilNextSchedule => "ParkUntilNextSchedule",
			Self::ParkUntilFurtherNotice => "ParkUntilFurtherNotice",
			Self::ResumeSchedule => "ResumeSchedule",
		}
	}

	/// Whether the action carries a duration in minutes.
	pub const fn is_duration_bound(self) -> bool {
		matches!(self, Self::Start | Self::Park)
	}
}
impl Display for DeviceAction {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for DeviceAction {
	type Err = ActionParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let action = match s.trim() {
			"Start" | "START" => Self::Start,
			"Pause" | "STOP" | "PAUSE" => Self::Pause,
			"Park" | "PARK" => Self::Park,
			"ParkUntilNextSchedule" | "PARK_UNTIL_NEXT_TASK" => Self::ParkUntilNextSchedule,
			"ParkUntilFurtherNotice" | "PARK_UNTIL_FURTHER_NOTICE" => Self::ParkUntilFurtherNotice,
			"ResumeSchedule" | "RESUME_SCHEDULE" => Self::ResumeSchedule,
			other => return Err(ActionParseError { value: other.to_owned() }),
		};

		Ok(action)
	}
}

/// Raised when a string names no known action.
#[derive(Debug, PartialEq, Eq, ThisError)]
#[error("Unknown device action `{value}`.")]
pub struct ActionParseError {
	/// Rejected input.
	pub value: String,
}

/// Body of an action request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActionDocument {
	/// Action resource.
	pub data: ActionData,
}
impl ActionDocument {
	/// Builds the payload for `action`.
	///
	/// Duration-bound actions use `duration_minutes` or, when absent, `default_minutes`. Either
	/// must fall within `1..=MAX_DURATION_MINUTES`, otherwise [`Error::InvalidDuration`] is
	/// returned. Other actions never carry attributes.
	pub fn new(
		action: DeviceAction,
		duration_minutes: Option<u32>,
		default_minutes: u32,
	) -> Result<Self> {
		let attributes = if action.is_duration_bound() {
			let duration = duration_minutes.unwrap_or(default_minutes);

			if !(1..=MAX_DURATION_MINUTES).contains(&duration) {
				return Err(Error::InvalidDuration { minutes: duration, max: MAX_DURATION_MINUTES });
			}

			Some(ActionAttributes { duration })
		} else {
			None
		};

		Ok(Self { data: ActionData { action, attributes } })
	}
}

/// Action resource of an [`ActionDocument`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActionData {
	/// Requested action.
	#[serde(rename = "type")]
	pub action: DeviceAction,
	/// Present only for duration-bound actions.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub attributes: Option<ActionAttributes>,
}

/// Attributes of a duration-bound action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ActionAttributes {
	/// Minutes.
	pub duration: u32,
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn parses_canonical_names_and_aliases() {
		for action in DeviceAction::ALL {
			assert_eq!(action.as_str().parse::<DeviceAction>(), Ok(action));
		}

		assert_eq!("STOP".parse(), Ok(DeviceAction::Pause));
		assert_eq!("PARK_UNTIL_NEXT_TASK".parse(), Ok(DeviceAction::ParkUntilNextSchedule));
		assert_eq!("RESUME_SCHEDULE".parse(), Ok(DeviceAction::ResumeSchedule));
		assert_eq!(
			"Dance".parse::<DeviceAction>(),
			Err(ActionParseError { value: "Dance".into() })
		);
	}

	#[test]
	fn duration_bound_actions_carry_attributes() {
		let start = ActionDocument::new(DeviceAction::Start, Some(45), 60)
			.expect("Start with 45 minutes should be accepted.");

		assert_eq!(
			serde_json::to_value(&start).expect("Payload should serialize."),
			json!({ "data": { "type": "Start", "attributes": { "duration": 45 } } })
		);

		let park = ActionDocument::new(DeviceAction::Park, None, 90)
			.expect("Park with the default duration should be accepted.");

		assert_eq!(park.data.attributes, Some(ActionAttributes { duration: 90 }));
	}

	#[test]
	fn other_actions_omit_attributes() {
		let resume = ActionDocument::new(DeviceAction::ResumeSchedule, Some(30), 60)
			.expect("ResumeSchedule should be accepted.");

		assert_eq!(
			serde_json::to_value(&resume).expect("Payload should serialize."),
			json!({ "data": { "type": "ResumeSchedule" } })
		);
	}

	#[test]
	fn out_of_range_duration_is_rejected() {
		assert!(matches!(
			ActionDocument::new(DeviceAction::Start, Some(0), 60),
			Err(Error::InvalidDuration { minutes: 0, .. })
		));
		assert!(matches!(
			ActionDocument::new(DeviceAction::Park, Some(1_441), 60),
			Err(Error::InvalidDuration { minutes: 1_441, .. })
		));
	}
}
