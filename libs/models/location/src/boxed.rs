use common::{DbConn, Error};
use db::boxed_location;
use diesel::pg::Pg;
use diesel::prelude::*;
use primitive_location::{GeoPoint, Polygon, PrimitiveBoxedLocation};
use serde::{Deserialize, Serialize};

/// An area with a name, a centre point and a bounding polygon
#[derive(Clone, Debug)]
pub struct BoxedLocation {
	pub primitive: PrimitiveBoxedLocation,
	pub polygon:   Polygon,
}

impl TryFrom<PrimitiveBoxedLocation> for BoxedLocation {
	type Error = Error;

	fn try_from(primitive: PrimitiveBoxedLocation) -> Result<Self, Error> {
		let polygon = primitive.polygon()?;

		Ok(Self { primitive, polygon })
	}
}

impl BoxedLocation {
	/// Get a [`BoxedLocation`] given its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(b_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let boxed = conn
			.interact(move |conn| {
				use self::boxed_location::dsl::*;

				boxed_location
					.find(b_id)
					.select(PrimitiveBoxedLocation::as_select())
					.get_result(conn)
			})
			.await??;

		boxed.try_into()
	}

	/// Get all [`BoxedLocation`]s ordered by id, optionally only those whose
	/// polygon contains a given point
	#[instrument(skip(conn))]
	pub async fn get_all(
		contains: Option<GeoPoint>,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let boxed = conn
			.interact(move |conn| {
				use self::boxed_location::dsl::*;

				boxed_location
					.order(id)
					.select(PrimitiveBoxedLocation::as_select())
					.get_results(conn)
			})
			.await??
			.into_iter()
			.map(Self::try_from)
			.collect::<Result<Vec<_>, _>>()?;

		let Some(point) = contains else {
			return Ok(boxed);
		};

		Ok(boxed.into_iter().filter(|b| b.polygon.contains(point)).collect())
	}

	/// Delete a [`BoxedLocation`] given its id
	#[instrument(skip(conn))]
	pub async fn delete_by_id(b_id: i32, conn: &DbConn) -> Result<(), Error> {
		let deleted = conn
			.interact(move |conn| {
				use self::boxed_location::dsl::*;

				diesel::delete(boxed_location.find(b_id)).execute(conn)
			})
			.await??;

		if deleted == 0 {
			return Err(Error::NotFound(format!("boxed location with id {b_id}")));
		}

		info!("deleted boxed location with id {b_id}");

		Ok(())
	}
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = boxed_location)]
#[diesel(check_for_backend(Pg))]
pub struct NewBoxedLocation {
	pub name:      String,
	pub address:   String,
	pub latitude:  f64,
	pub longitude: f64,
	pub boundary:  serde_json::Value,
}

impl NewBoxedLocation {
	/// Build a new area from its bounding polygon
	///
	/// # Errors
	/// Errors if the polygon does not enclose an area
	pub fn new(
		name: String,
		address: String,
		center: GeoPoint,
		polygon: &Polygon,
	) -> Result<Self, Error> {
		if !polygon.is_valid() {
			return Err(Error::ValidationError(
				"a boundary needs at least three corners".to_string(),
			));
		}

		let boundary = serde_json::to_value(polygon.points())?;

		Ok(Self {
			name,
			address,
			latitude: center.lat,
			longitude: center.lng,
			boundary,
		})
	}

	/// Insert this [`NewBoxedLocation`]
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<BoxedLocation, Error> {
		let boxed = conn
			.interact(|conn| {
				use self::boxed_location::dsl::*;

				diesel::insert_into(boxed_location)
					.values(self)
					.returning(PrimitiveBoxedLocation::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("created boxed location {} ({})", boxed.name, boxed.id);

		boxed.try_into()
	}
}
