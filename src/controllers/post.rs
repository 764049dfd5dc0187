//! Controllers for [`Post`]s

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, NoContent};
use common::{DbConn, DbPool, Error};
use location::{Location, NewLocation};
use post::{Post, PostFilter};
use primitive_post::PrimitivePost;
use validator::Validate;

use crate::AuthorId;
use crate::controllers::ensure_owner;
use crate::geocoder::Geocoder;
use crate::schemas::pagination::PaginationOptions;
use crate::schemas::post::{CreatePostRequest, PostResponse, UpdatePostRequest};

/// Build the location for an address, only asking the geocoder when the
/// address is not stored yet
pub(crate) async fn locate(
	address: String,
	geocoder: &Geocoder,
	conn: &DbConn,
) -> Result<NewLocation, Error> {
	if let Some(known) = Location::get_by_address(address.clone(), conn).await? {
		return Ok(NewLocation {
			address,
			latitude: known.primitive.latitude,
			longitude: known.primitive.longitude,
		});
	}

	let point = geocoder.resolve_or_unresolved(&address).await;

	Ok(NewLocation { address, latitude: point.lat, longitude: point.lng })
}

/// Search through all posts, most recently updated first
#[instrument(skip(pool))]
pub(crate) async fn search_posts(
	State(pool): State<DbPool>,
	Query(filter): Query<PostFilter>,
	Query(p_opts): Query<PaginationOptions>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let (total, posts) = Post::search(filter, p_opts.into(), &conn).await?;
	let posts: Vec<PostResponse> = posts.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(p_opts.paginate(total, posts))))
}

#[instrument(skip(pool, geocoder))]
pub(crate) async fn create_post(
	State(pool): State<DbPool>,
	State(geocoder): State<Geocoder>,
	author_id: AuthorId,
	Json(request): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let location =
		locate(request.location.address.clone(), &geocoder, &conn).await?;

	let new_post = request.to_insertable(*author_id, location);
	let post = new_post.insert(&conn).await?;
	let response: PostResponse = post.into();

	Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(pool))]
pub(crate) async fn get_post(
	State(pool): State<DbPool>,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let post = Post::get_by_id(id, &conn).await?;
	let response: PostResponse = post.into();

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool, geocoder))]
pub(crate) async fn update_post(
	State(pool): State<DbPool>,
	State(geocoder): State<Geocoder>,
	author_id: AuthorId,
	Path(id): Path<i32>,
	Json(mut request): Json<UpdatePostRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let current = PrimitivePost::get_by_id(id, &conn).await?;
	ensure_owner(current.author_id, author_id)?;

	let location_id = match request.location.take() {
		Some(loc) => {
			let new_location = locate(loc.address, &geocoder, &conn).await?;

			let l_id = conn
				.interact(move |conn| new_location.get_or_insert(conn))
				.await??
				.id;

			Some(l_id)
		},
		None => None,
	};

	let post = request.to_update(location_id).apply_to(id, &conn).await?;
	let response: PostResponse = post.into();

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool))]
pub(crate) async fn delete_post(
	State(pool): State<DbPool>,
	author_id: AuthorId,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let current = PrimitivePost::get_by_id(id, &conn).await?;
	ensure_owner(current.author_id, author_id)?;

	Post::delete_by_id(id, &conn).await?;

	Ok((StatusCode::NO_CONTENT, NoContent))
}
