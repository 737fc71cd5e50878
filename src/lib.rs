//! Session and command-control layer for robotic lawnmower fleets.
//!
//! [`client::DeviceControlClient`] obtains and refreshes client-credentials tokens, translates
//! JSON:API mower resources into flat [`device::DeviceStatus`] records, and issues control
//! commands. Remote failures degrade to empty results instead of propagating to the caller.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod clock;
pub mod config;
pub mod device;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests that drive the client against a mock server;
	//! enabled via `cfg(test)` or the `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::DeviceControlClient,
		clock::{Clock, ManualClock},
		config::DeviceApiConfig,
	};

	/// Client id used by test configurations.
	pub const TEST_CLIENT_ID: &str = "test-client-id";
	/// Client secret used by test configurations.
	pub const TEST_CLIENT_SECRET: &str = "test-client-secret";

	/// Builds a configuration whose auth and device endpoints both point at `base`
	/// (typically an `httpmock` server URL).
	pub fn test_config(base: &str) -> DeviceApiConfig {
		let base = Url::parse(base).expect("Failed to parse mock server URL.");

		DeviceApiConfig::builder()
			.client_id(TEST_CLIENT_ID)
			.client_secret(TEST_CLIENT_SECRET)
			.auth_base_url(base.clone())
			.api_base_url(base)
			.request_timeout(Duration::seconds(2))
			.build()
			.expect("Failed to build test configuration.")
	}

	/// Constructs a [`DeviceControlClient`] driven by a [`ManualClock`] pinned to a fixed
	/// instant so token lifetimes can be stepped deterministically.
	pub fn build_test_client(config: DeviceApiConfig) -> (DeviceControlClient, Arc<ManualClock>) {
		let clock = Arc::new(ManualClock::new(time::macros::datetime!(2025-06-01 08:00 UTC)));
		let dyn_clock: Arc<dyn Clock> = clock.clone();
		let client = DeviceControlClient::with_clock(config, dyn_clock)
			.expect("Failed to build device control client for tests.");

		(client, clock)
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
