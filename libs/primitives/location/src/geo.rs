//! Plain geometry on latitude/longitude pairs

use serde::{Deserialize, Serialize};

/// Mean earth radius in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct GeoPoint {
	pub lat: f64,
	pub lng: f64,
}

/// Great-circle distance between two points in kilometres
#[must_use]
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
	let d_lat = (b.lat - a.lat).to_radians();
	let d_lng = (b.lng - a.lng).to_radians();

	let h = (d_lat / 2.0).sin().powi(2)
		+ a.lat.to_radians().cos()
			* b.lat.to_radians().cos()
			* (d_lng / 2.0).sin().powi(2);

	2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
	pub north_east_lat: f64,
	pub north_east_lng: f64,
	pub south_west_lat: f64,
	pub south_west_lng: f64,
}

/// A closed ring of points
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
	points: Vec<GeoPoint>,
}

impl Polygon {
	/// Build a polygon, closing the ring if the last point does not repeat
	/// the first one
	#[must_use]
	pub fn new(mut points: Vec<GeoPoint>) -> Self {
		if let (Some(&first), Some(&last)) = (points.first(), points.last())
			&& first != last
		{
			points.push(first);
		}

		Self { points }
	}

	#[must_use]
	pub fn points(&self) -> &[GeoPoint] { &self.points }

	/// A ring needs at least three distinct corners to enclose an area
	#[must_use]
	pub fn is_valid(&self) -> bool { self.points.len() >= 4 }

	/// Ray casting point-in-polygon test
	#[must_use]
	pub fn contains(&self, point: GeoPoint) -> bool {
		if !self.is_valid() {
			return false;
		}

		let mut inside = false;

		for edge in self.points.windows(2) {
			let (a, b) = (edge[0], edge[1]);

			if (a.lat > point.lat) != (b.lat > point.lat) {
				let cross = (b.lng - a.lng) * (point.lat - a.lat)
					/ (b.lat - a.lat)
					+ a.lng;

				if point.lng < cross {
					inside = !inside;
				}
			}
		}

		inside
	}

	/// Smallest box containing every corner
	#[must_use]
	pub fn bounding_box(&self) -> Option<BoundingBox> {
		let first = self.points.first()?;

		let init = BoundingBox {
			north_east_lat: first.lat,
			north_east_lng: first.lng,
			south_west_lat: first.lat,
			south_west_lng: first.lng,
		};

		Some(self.points.iter().fold(init, |b, p| {
			BoundingBox {
				north_east_lat: b.north_east_lat.max(p.lat),
				north_east_lng: b.north_east_lng.max(p.lng),
				south_west_lat: b.south_west_lat.min(p.lat),
				south_west_lng: b.south_west_lng.min(p.lng),
			}
		}))
	}
}
