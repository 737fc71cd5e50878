//! Lists a mocked mower fleet, prints the dashboard JSON for each device, and parks the first
//! one until further notice.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use mower_control::{
	client::DeviceControlClient, config::DeviceApiConfig, device::DeviceAction, url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200).json_body(json!({
				"access_token": "demo-access",
				"token_type": "Bearer",
				"expires_in": 86_399
			}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/mowers");
			then.status(200).header("content-type", "application/vnd.api+json").json_body(json!({
				"data": [
					{
						"type": "mower",
						"id": "c7233734-b219-4287-a173-08e3643f89f0",
						"attributes": {
							"system": { "name": "Backyard", "model": "Automower 430X", "serialNumber": 190012345 },
							"battery": { "batteryPercent": 83 },
							"mower": { "mode": "MAIN_AREA", "activity": "MOWING", "state": "IN_OPERATION" },
							"metadata": { "connected": true, "statusTimestamp": 1717228800000_i64 },
							"positions": [
								{ "latitude": 57.70887, "longitude": 11.97456 },
								{ "latitude": 57.70891, "longitude": 11.97462 }
							]
						}
					},
					{
						"type": "mower",
						"id": "1a2b3c4d-0000-4000-8000-000000000002",
						"attributes": {
							"system": { "manufacturer": "Husqvarna", "model": "Automower 305", "serialNumber": "170098765" },
							"battery": { "batteryPercent": 100 },
							"mower": { "mode": "HOME", "activity": "PARKED_IN_CS", "state": "RESTRICTED" },
							"metadata": { "connected": false, "statusTimestamp": "2024-06-01T06:15:00Z" }
						}
					}
				]
			}));
		})
		.await;

	let park = server
		.mock_async(|when, then| {
			when.method(POST).path("/mowers/c7233734-b219-4287-a173-08e3643f89f0/actions");
			then.status(202);
		})
		.await;
	let base = Url::parse(&server.base_url())?;
	let config = DeviceApiConfig::builder()
		.api_key("demo-app-key")
		.client_secret("demo-app-secret")
		.auth_base_url(base.clone())
		.api_base_url(base)
		.build()?;
	let client = DeviceControlClient::new(config)?;

	client.warm_up().await;

	let fleet = client.list_devices().await;

	for device in &fleet {
		println!("{}: {}", device.registration_name(), serde_json::to_string_pretty(device)?);
	}

	if let Some(first) = fleet.first() {
		let accepted =
			client.send_command(&first.remote_id, DeviceAction::ParkUntilFurtherNotice, None).await;

		println!("Park until further notice accepted: {accepted}.");
	}

	park.assert_calls_async(1).await;

	println!("Token metrics: {:?}.", client.token_metrics());

	Ok(())
}
