//! Address to coordinate resolution through an external geocoding service

use std::time::Duration;

use common::Error;
use primitive_location::GeoPoint;
use serde::Deserialize;

use crate::Config;

/// Coordinate stored for addresses that could not be resolved
pub const UNRESOLVED: GeoPoint = GeoPoint { lat: 0.0, lng: 0.0 };

#[derive(Clone, Debug)]
pub struct Geocoder {
	backend: Backend,
}

#[derive(Clone, Debug)]
enum Backend {
	/// Never resolves anything, used for tests and offline development
	Stub,
	Http { client: reqwest::Client, url: String, api_key: String },
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
	#[serde(default)]
	results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
	geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
	location: GeoPoint,
}

impl GeocodeResponse {
	fn first_point(self) -> Option<GeoPoint> {
		self.results.into_iter().next().map(|r| r.geometry.location)
	}
}

/// Client used for geocoding lookups, every request times out after five
/// seconds
fn http_client() -> Result<reqwest::Client, Error> {
	let client =
		reqwest::Client::builder().timeout(Duration::from_secs(5)).build()?;

	Ok(client)
}

impl Geocoder {
	/// Create the geocoder selected by `config`
	///
	/// # Errors
	/// Errors if the HTTP client can not be built
	pub fn new(config: &Config) -> Result<Self, Error> {
		if config.geocoding_url == "stub" {
			return Ok(Self::stub());
		}

		Ok(Self {
			backend: Backend::Http {
				client:  http_client()?,
				url:     config.geocoding_url.clone(),
				api_key: config.geocoding_api_key.clone(),
			},
		})
	}

	#[must_use]
	pub fn stub() -> Self { Self { backend: Backend::Stub } }

	/// Resolve an address, any failure is logged and treated as "unknown"
	#[instrument(skip(self))]
	pub async fn geocode(&self, address: &str) -> Option<GeoPoint> {
		match self.lookup(address).await {
			Ok(point) => point,
			Err(e) => {
				warn!("geocoding '{address}' failed: {e:?}");

				None
			},
		}
	}

	/// Resolve an address, falling back to [`UNRESOLVED`]
	pub async fn resolve_or_unresolved(&self, address: &str) -> GeoPoint {
		self.geocode(address).await.unwrap_or(UNRESOLVED)
	}

	async fn lookup(&self, address: &str) -> Result<Option<GeoPoint>, Error> {
		let Backend::Http { client, url, api_key } = &self.backend else {
			return Ok(None);
		};

		let response = client
			.get(url)
			.query(&[("address", address), ("key", api_key.as_str())])
			.send()
			.await?
			.error_for_status()?
			.json::<GeocodeResponse>()
			.await?;

		Ok(response.first_point())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn http_client_builds() {
		assert!(http_client().is_ok());
	}

	#[test]
	fn picks_first_result() {
		let response: GeocodeResponse = serde_json::from_value(serde_json::json!({
			"status": "OK",
			"results": [
				{ "geometry": { "location": { "lat": 39.9, "lng": 116.4 } } },
				{ "geometry": { "location": { "lat": 1.0, "lng": 2.0 } } },
			],
		}))
		.unwrap();

		assert_eq!(
			response.first_point(),
			Some(GeoPoint { lat: 39.9, lng: 116.4 })
		);
	}

	#[test]
	fn zero_results_resolve_nothing() {
		let response: GeocodeResponse =
			serde_json::from_value(serde_json::json!({ "status": "ZERO_RESULTS" }))
				.unwrap();

		assert_eq!(response.first_point(), None);
	}

	#[tokio::test]
	async fn stub_falls_back_to_origin() {
		let geocoder = Geocoder::stub();

		assert_eq!(geocoder.geocode("anywhere").await, None);
		assert_eq!(geocoder.resolve_or_unresolved("anywhere").await, UNRESOLVED);
	}
}
