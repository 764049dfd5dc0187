use db::location;
use diesel::dsl::sql;
use diesel::expression::SqlLiteral;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_builder::QueryFragment;
use diesel::sql_types::{Bool, Double};
use models_common::{BoxedCondition, ToFilter};
use primitive_location::{BoundingBox, EARTH_RADIUS_KM, GeoPoint};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

#[serde_as]
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundsFilter {
	#[serde_as(as = "DisplayFromStr")]
	pub north_east_lat: f64,
	#[serde_as(as = "DisplayFromStr")]
	pub north_east_lng: f64,
	#[serde_as(as = "DisplayFromStr")]
	pub south_west_lat: f64,
	#[serde_as(as = "DisplayFromStr")]
	pub south_west_lng: f64,
}

impl From<BoundingBox> for BoundsFilter {
	fn from(value: BoundingBox) -> Self {
		Self {
			north_east_lat: value.north_east_lat,
			north_east_lng: value.north_east_lng,
			south_west_lat: value.south_west_lat,
			south_west_lng: value.south_west_lng,
		}
	}
}

impl<S> ToFilter<S> for BoundsFilter
where
	location::latitude: SelectableExpression<S>,
	location::longitude: SelectableExpression<S>,
{
	type SqlType = Bool;

	fn to_filter(&self) -> BoxedCondition<S, Self::SqlType> {
		Box::new(
			location::latitude
				.between(self.south_west_lat, self.north_east_lat)
				.and(
					location::longitude
						.between(self.south_west_lng, self.north_east_lng),
				),
		)
	}
}

/// Box around `center` that contains every point within `km` of it
///
/// When the circle covers a pole or crosses the antimeridian the box spans
/// every longitude
#[must_use]
pub fn search_box(center: GeoPoint, km: f64) -> BoundingBox {
	let angular = km / EARTH_RADIUS_KM;
	let lat_delta = angular.to_degrees();
	let colatitude = (90.0 - center.lat.abs()).to_radians();

	let lng_delta = if angular >= colatitude {
		None
	} else {
		let ratio = angular.sin() / center.lat.to_radians().cos();

		Some(ratio.min(1.0).asin().to_degrees())
	};

	let (south_west_lng, north_east_lng) = match lng_delta {
		Some(delta)
			if center.lng - delta >= -180.0 && center.lng + delta <= 180.0 =>
		{
			(center.lng - delta, center.lng + delta)
		},
		_ => (-180.0, 180.0),
	};

	BoundingBox {
		north_east_lat: (center.lat + lat_delta).min(90.0),
		north_east_lng,
		south_west_lat: (center.lat - lat_delta).max(-90.0),
		south_west_lng,
	}
}

/// Condition keeping locations within `km` great-circle kilometres of
/// `center`
///
/// The condition only reads the `location` columns, so it can be used in
/// subqueries of other tables as well
#[must_use]
pub fn within_radius(
	center: GeoPoint,
	km: f64,
) -> SqlLiteral<Bool, impl QueryFragment<Pg> + Send + 'static> {
	sql::<Bool>("(2 * ")
		.bind::<Double, _>(EARTH_RADIUS_KM)
		.sql(" * asin(least(1.0, sqrt(power(sin(radians(")
		.bind::<Double, _>(location::latitude)
		.sql(" - ")
		.bind::<Double, _>(center.lat)
		.sql(") / 2), 2) + cos(radians(")
		.bind::<Double, _>(center.lat)
		.sql(")) * cos(radians(")
		.bind::<Double, _>(location::latitude)
		.sql(")) * power(sin(radians(")
		.bind::<Double, _>(location::longitude)
		.sql(" - ")
		.bind::<Double, _>(center.lng)
		.sql(") / 2), 2)))) <= ")
		.bind::<Double, _>(km)
		.sql(")")
}

#[cfg(test)]
mod tests {
	use diesel::debug_query;
	use primitive_location::haversine_km;

	use super::*;

	/// Point `km` away from `from` along the initial `bearing` in degrees
	fn destination(from: GeoPoint, km: f64, bearing: f64) -> GeoPoint {
		let angular = km / EARTH_RADIUS_KM;
		let (lat, lng) = (from.lat.to_radians(), from.lng.to_radians());
		let bearing = bearing.to_radians();

		let dest_lat = (lat.sin() * angular.cos()
			+ lat.cos() * angular.sin() * bearing.cos())
		.asin();
		let dest_lng = lng
			+ (bearing.sin() * angular.sin() * lat.cos())
				.atan2(angular.cos() - lat.sin() * dest_lat.sin());

		let wrapped = (dest_lng.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;

		GeoPoint { lat: dest_lat.to_degrees(), lng: wrapped }
	}

	fn assert_circle_inside(center: GeoPoint, km: f64) {
		let bbox = search_box(center, km);

		for step in 0..3600 {
			let point = destination(center, km, f64::from(step) / 10.0);

			assert!(
				point.lat >= bbox.south_west_lat - 1e-9
					&& point.lat <= bbox.north_east_lat + 1e-9
					&& point.lng >= bbox.south_west_lng - 1e-9
					&& point.lng <= bbox.north_east_lng + 1e-9,
				"{point:?} escapes {bbox:?}"
			);
		}
	}

	#[test]
	fn search_box_contains_radius() {
		let center = GeoPoint { lat: 51.05, lng: 3.72 };
		let bbox = search_box(center, 10.0);

		let north = GeoPoint { lat: bbox.north_east_lat, lng: center.lng };

		assert!(haversine_km(center, north) >= 10.0 - 1e-6);
		assert!(bbox.north_east_lng < 4.0 && bbox.south_west_lng > 3.4);
		assert_circle_inside(center, 10.0);
	}

	#[test]
	fn search_box_contains_wide_circles() {
		assert_circle_inside(GeoPoint { lat: 60.0, lng: 10.0 }, 500.0);
		assert_circle_inside(GeoPoint { lat: -45.0, lng: 120.0 }, 1_500.0);
		assert_circle_inside(GeoPoint { lat: 89.9, lng: 0.0 }, 20.0);
	}

	#[test]
	fn search_box_across_antimeridian_spans_all_longitudes() {
		let center = GeoPoint { lat: 0.0, lng: 179.95 };
		let bbox = search_box(center, 50.0);
		let other_side = GeoPoint { lat: 0.0, lng: -179.95 };

		assert!(haversine_km(center, other_side) < 50.0);
		assert!(other_side.lng >= bbox.south_west_lng);
		assert!(other_side.lng <= bbox.north_east_lng);
		assert_circle_inside(center, 50.0);
	}

	#[test]
	fn search_box_at_pole_spans_all_longitudes() {
		let bbox = search_box(GeoPoint { lat: 90.0, lng: 0.0 }, 5.0);

		assert!((bbox.north_east_lng - 180.0).abs() < f64::EPSILON);
		assert!((bbox.south_west_lng + 180.0).abs() < f64::EPSILON);
		assert!(bbox.north_east_lat <= 90.0);
	}

	#[test]
	fn bounds_filter_renders_between() {
		let filter = BoundsFilter {
			north_east_lat: 2.0,
			north_east_lng: 2.0,
			south_west_lat: 1.0,
			south_west_lng: 1.0,
		};

		let query = location::table
			.filter(ToFilter::<location::table>::to_filter(&filter))
			.select(location::id);
		let sql = debug_query::<Pg, _>(&query).to_string();

		assert!(sql.contains("\"location\".\"latitude\" BETWEEN"));
		assert!(sql.contains("\"location\".\"longitude\" BETWEEN"));
	}

	#[test]
	fn radius_condition_binds_point() {
		let center = GeoPoint { lat: 39.9, lng: 116.4 };

		let query = location::table
			.filter(within_radius(center, 12.5))
			.select(location::id);
		let sql = debug_query::<Pg, _>(&query).to_string();

		assert!(sql.contains("asin"));
		assert!(sql.contains("\"location\".\"latitude\""));
		assert!(sql.contains("12.5"));
	}
}
