use chrono::NaiveDateTime;
use location::{BoxedLocation, Location};
use primitive_location::{BoundingBox, GeoPoint, PrimitiveLocation};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator_derive::Validate;

#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationResponse {
	pub id:         i32,
	pub address:    String,
	pub latitude:   f64,
	pub longitude:  f64,
	/// Distance to the searched point in kilometres
	pub distance:   Option<f64>,
	pub created_at: NaiveDateTime,
	pub updated_at: NaiveDateTime,
}

impl From<PrimitiveLocation> for LocationResponse {
	fn from(value: PrimitiveLocation) -> Self {
		Self {
			id:         value.id,
			address:    value.address,
			latitude:   value.latitude,
			longitude:  value.longitude,
			distance:   None,
			created_at: value.created_at,
			updated_at: value.updated_at,
		}
	}
}

impl From<Location> for LocationResponse {
	fn from(value: Location) -> Self {
		Self { distance: value.distance, ..value.primitive.into() }
	}
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct CreateLocationRequest {
	#[validate(length(
		min = 1,
		max = 255,
		message = "address must be between 1 and 255 characters long",
		code = "address-length"
	))]
	pub address: String,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct NearbyQuery {
	pub lat:      f64,
	pub lng:      f64,
	/// Search radius in kilometres
	pub distance: f64,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainsQuery {
	pub contains_lat: Option<f64>,
	pub contains_lng: Option<f64>,
}

impl ContainsQuery {
	#[must_use]
	pub fn point(&self) -> Option<GeoPoint> {
		Some(GeoPoint { lat: self.contains_lat?, lng: self.contains_lng? })
	}
}

#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxedLocationResponse {
	pub id:           i32,
	pub name:         String,
	pub address:      String,
	pub latitude:     f64,
	pub longitude:    f64,
	pub boundary:     Vec<GeoPoint>,
	pub bounding_box: Option<BoundingBox>,
	pub created_at:   NaiveDateTime,
	pub updated_at:   NaiveDateTime,
}

impl From<BoxedLocation> for BoxedLocationResponse {
	fn from(value: BoxedLocation) -> Self {
		let primitive = value.primitive;

		Self {
			id:           primitive.id,
			name:         primitive.name,
			address:      primitive.address,
			latitude:     primitive.latitude,
			longitude:    primitive.longitude,
			boundary:     value.polygon.points().to_vec(),
			bounding_box: value.polygon.bounding_box(),
			created_at:   primitive.created_at,
			updated_at:   primitive.updated_at,
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct CreateBoxedLocationRequest {
	#[validate(length(min = 1, max = 255, code = "name-length"))]
	pub name:     String,
	#[validate(length(min = 1, max = 255, code = "address-length"))]
	pub address:  String,
	#[validate(length(
		min = 3,
		message = "a boundary needs at least three corners",
		code = "boundary-length"
	))]
	pub boundary: Vec<GeoPoint>,
}
