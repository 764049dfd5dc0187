#[macro_use]
extern crate tracing;

use chrono::NaiveDateTime;
use common::{DbConn, Error};
use db::{boxed_location, location};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

mod geo;

pub use geo::*;

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = location)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveLocation {
	pub id:         i32,
	pub address:    String,
	pub latitude:   f64,
	pub longitude:  f64,
	pub created_at: NaiveDateTime,
	pub updated_at: NaiveDateTime,
}

impl PrimitiveLocation {
	/// Get a [`PrimitiveLocation`] by its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(l_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let location = conn
			.interact(move |conn| {
				use self::location::dsl::*;

				location.find(l_id).select(Self::as_select()).get_result(conn)
			})
			.await??;

		Ok(location)
	}

	#[must_use]
	pub fn point(&self) -> GeoPoint {
		GeoPoint { lat: self.latitude, lng: self.longitude }
	}
}

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = boxed_location)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveBoxedLocation {
	pub id:         i32,
	pub name:       String,
	pub address:    String,
	pub latitude:   f64,
	pub longitude:  f64,
	pub boundary:   serde_json::Value,
	pub created_at: NaiveDateTime,
	pub updated_at: NaiveDateTime,
}

impl PrimitiveBoxedLocation {
	/// Decode the stored boundary of this area
	///
	/// # Errors
	/// Errors if the stored boundary is not a list of points
	pub fn polygon(&self) -> Result<Polygon, Error> {
		let points: Vec<GeoPoint> =
			serde_json::from_value(self.boundary.clone())?;

		Ok(Polygon::new(points))
	}
}
