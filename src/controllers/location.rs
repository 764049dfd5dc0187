//! Controllers for [`Location`]s and [`BoxedLocation`]s

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, NoContent};
use common::{DbPool, Error};
use location::{
	BoundsFilter,
	BoxedLocation,
	Location,
	NewBoxedLocation,
	NewLocation,
};
use primitive_location::{GeoPoint, Polygon};
use validator::Validate;

use crate::geocoder::Geocoder;
use crate::schemas::location::{
	BoxedLocationResponse,
	ContainsQuery,
	CreateBoxedLocationRequest,
	CreateLocationRequest,
	LocationResponse,
	NearbyQuery,
};
use crate::schemas::pagination::PaginationOptions;

#[instrument(skip(pool))]
pub(crate) async fn get_locations(
	State(pool): State<DbPool>,
	Query(p_opts): Query<PaginationOptions>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let (total, locations) = Location::get_all(p_opts.into(), &conn).await?;
	let locations: Vec<LocationResponse> =
		locations.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(p_opts.paginate(total, locations))))
}

/// Create a location for an address, geocoding it first
#[instrument(skip(pool, geocoder))]
pub(crate) async fn create_location(
	State(pool): State<DbPool>,
	State(geocoder): State<Geocoder>,
	Json(request): Json<CreateLocationRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let point = geocoder.resolve_or_unresolved(&request.address).await;

	let new_location = NewLocation {
		address:   request.address,
		latitude:  point.lat,
		longitude: point.lng,
	};

	let conn = pool.get().await?;

	let location = new_location.insert(&conn).await?;
	let response: LocationResponse = location.into();

	Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(pool))]
pub(crate) async fn get_location(
	State(pool): State<DbPool>,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let location = Location::get_by_id(id, &conn).await?;
	let response: LocationResponse = location.into();

	Ok((StatusCode::OK, Json(response)))
}

/// Get all locations within the given latlng bounds
///
/// The southwestern corner is the minimum latitude and longitude, the
/// northeastern corner is the maximum latitude and longitude.
#[instrument(skip(pool))]
pub(crate) async fn get_locations_in_bbox(
	State(pool): State<DbPool>,
	Query(bounds): Query<BoundsFilter>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let locations = Location::in_bbox(bounds, &conn).await?;
	let locations: Vec<LocationResponse> =
		locations.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(locations)))
}

#[instrument(skip(pool))]
pub(crate) async fn get_nearby_locations(
	State(pool): State<DbPool>,
	Query(query): Query<NearbyQuery>,
) -> Result<impl IntoResponse, Error> {
	if !query.distance.is_finite() || query.distance < 0.0 {
		return Err(Error::ValidationError(
			"distance must be a non-negative number".to_string(),
		));
	}

	let conn = pool.get().await?;

	let center = GeoPoint { lat: query.lat, lng: query.lng };
	let locations = Location::nearby(center, query.distance, &conn).await?;
	let locations: Vec<LocationResponse> =
		locations.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(locations)))
}

#[instrument(skip(pool))]
pub(crate) async fn get_boxed_locations(
	State(pool): State<DbPool>,
	Query(contains): Query<ContainsQuery>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let boxed = BoxedLocation::get_all(contains.point(), &conn).await?;
	let boxed: Vec<BoxedLocationResponse> =
		boxed.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(boxed)))
}

/// Create an area, its centre is the geocoded address
#[instrument(skip(pool, geocoder))]
pub(crate) async fn create_boxed_location(
	State(pool): State<DbPool>,
	State(geocoder): State<Geocoder>,
	Json(request): Json<CreateBoxedLocationRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let center = geocoder.resolve_or_unresolved(&request.address).await;
	let polygon = Polygon::new(request.boundary);

	let new_boxed =
		NewBoxedLocation::new(request.name, request.address, center, &polygon)?;

	let conn = pool.get().await?;

	let boxed = new_boxed.insert(&conn).await?;
	let response: BoxedLocationResponse = boxed.into();

	Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(pool))]
pub(crate) async fn get_boxed_location(
	State(pool): State<DbPool>,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let boxed = BoxedLocation::get_by_id(id, &conn).await?;
	let response: BoxedLocationResponse = boxed.into();

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool))]
pub(crate) async fn delete_boxed_location(
	State(pool): State<DbPool>,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	BoxedLocation::delete_by_id(id, &conn).await?;

	Ok((StatusCode::NO_CONTENT, NoContent))
}
