#[macro_use]
extern crate tracing;

use common::{DbConn, Error};
use db::location;
use diesel::pg::Pg;
use diesel::prelude::*;
use models_common::{
	PaginatedData,
	PaginationConfig,
	QUERY_HARD_LIMIT,
	ToFilter,
};
use primitive_location::{GeoPoint, PrimitiveLocation, haversine_km};
use serde::{Deserialize, Serialize};

mod boxed;
mod filter;

pub use boxed::*;
pub use filter::*;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Location {
	pub primitive: PrimitiveLocation,
	/// Distance to the searched point in kilometres, if any
	pub distance:  Option<f64>,
}

impl From<PrimitiveLocation> for Location {
	fn from(primitive: PrimitiveLocation) -> Self {
		Self { primitive, distance: None }
	}
}

impl Location {
	/// Get a [`Location`] given its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(l_id: i32, conn: &DbConn) -> Result<Self, Error> {
		Ok(PrimitiveLocation::get_by_id(l_id, conn).await?.into())
	}

	/// Get the [`Location`] stored for an exact address, if any
	#[instrument(skip(conn))]
	pub async fn get_by_address(
		query_address: String,
		conn: &DbConn,
	) -> Result<Option<Self>, Error> {
		let location = conn
			.interact(move |conn| {
				use self::location::dsl::*;

				location
					.filter(address.eq(query_address))
					.select(PrimitiveLocation::as_select())
					.first(conn)
					.optional()
			})
			.await??;

		Ok(location.map(Into::into))
	}

	/// Get a page of [`Location`]s ordered by id
	#[instrument(skip(conn))]
	pub async fn get_all(
		p_cfg: PaginationConfig,
		conn: &DbConn,
	) -> Result<PaginatedData<Vec<Self>>, Error> {
		let (total, locations) = conn
			.interact(move |conn| {
				use self::location::dsl::*;

				let total = location.count().get_result::<i64>(conn)?;

				let locations = location
					.order(id)
					.limit(p_cfg.limit)
					.offset(p_cfg.offset)
					.select(PrimitiveLocation::as_select())
					.get_results(conn)?;

				Ok::<_, diesel::result::Error>((total, locations))
			})
			.await??;

		let locations = locations.into_iter().map(Into::into).collect();

		Ok((total, locations))
	}

	/// Get all [`Location`]s inside an inclusive bounding box
	#[instrument(skip(conn))]
	pub async fn in_bbox(
		bounds: BoundsFilter,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let filter = ToFilter::<location::table>::to_filter(&bounds);

		let locations = conn
			.interact(move |conn| {
				use self::location::dsl::*;

				location
					.filter(filter)
					.order(id)
					.limit(QUERY_HARD_LIMIT)
					.select(PrimitiveLocation::as_select())
					.get_results(conn)
			})
			.await??
			.into_iter()
			.map(Into::into)
			.collect();

		Ok(locations)
	}

	/// Get all [`Location`]s within `km` kilometres of `center`, nearest
	/// first
	#[instrument(skip(conn))]
	pub async fn nearby(
		center: GeoPoint,
		km: f64,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let bounds = BoundsFilter::from(search_box(center, km));
		let filter = ToFilter::<location::table>::to_filter(&bounds);

		let candidates = conn
			.interact(move |conn| {
				use self::location::dsl::*;

				location
					.filter(filter)
					.select(PrimitiveLocation::as_select())
					.get_results(conn)
			})
			.await??;

		Ok(rank_by_distance(candidates, center, km))
	}
}

/// Keep locations within `km` of `center` and sort them nearest first
fn rank_by_distance(
	candidates: Vec<PrimitiveLocation>,
	center: GeoPoint,
	km: f64,
) -> Vec<Location> {
	let mut ranked: Vec<Location> = candidates
		.into_iter()
		.filter_map(|primitive| {
			let distance = haversine_km(center, primitive.point());

			(distance <= km)
				.then_some(Location { primitive, distance: Some(distance) })
		})
		.collect();

	ranked.sort_by(|a, b| {
		a.distance
			.partial_cmp(&b.distance)
			.unwrap_or(std::cmp::Ordering::Equal)
			.then(a.primitive.id.cmp(&b.primitive.id))
	});

	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	ranked.truncate(QUERY_HARD_LIMIT as usize);

	ranked
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = location)]
#[diesel(check_for_backend(Pg))]
pub struct NewLocation {
	pub address:   String,
	pub latitude:  f64,
	pub longitude: f64,
}

impl NewLocation {
	/// Insert this [`NewLocation`], failing if the address is taken
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<Location, Error> {
		let new_location = conn
			.interact(|conn| {
				use self::location::dsl::*;

				diesel::insert_into(location)
					.values(self)
					.returning(PrimitiveLocation::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("created location {new_location:?}");

		Ok(new_location.into())
	}

	/// Return the location stored for this address, inserting it first if
	/// it does not exist yet
	///
	/// # Errors
	/// Errors if any query fails
	pub fn get_or_insert(
		self,
		conn: &mut PgConnection,
	) -> QueryResult<PrimitiveLocation> {
		use self::location::dsl::*;

		diesel::insert_into(location)
			.values(&self)
			.on_conflict(address)
			.do_nothing()
			.execute(conn)?;

		location
			.filter(address.eq(self.address))
			.select(PrimitiveLocation::as_select())
			.get_result(conn)
	}
}
