//! Controllers for [`PostImage`]s

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, NoContent};
use common::{DbPool, Error};
use image::{ImageRef, PostImage, PostImageUpdate};
use primitive_post::PrimitivePost;
use validator::Validate;

use crate::AuthorId;
use crate::controllers::ensure_owner;
use crate::schemas::image::{
	CreateImageRequest,
	ImageResponse,
	UpdateImageRequest,
};

#[instrument(skip(pool))]
pub(crate) async fn get_post_images(
	State(pool): State<DbPool>,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	PrimitivePost::get_by_id(id, &conn).await?;

	let images = PostImage::get_for_post(id, &conn).await?;
	let images: Vec<ImageResponse> =
		images.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(images)))
}

/// Attach an image reference to a post of the current author
#[instrument(skip(pool))]
pub(crate) async fn add_post_image(
	State(pool): State<DbPool>,
	author_id: AuthorId,
	Path(id): Path<i32>,
	Json(request): Json<CreateImageRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let post = PrimitivePost::get_by_id(id, &conn).await?;
	ensure_owner(post.author_id, author_id)?;

	let new_image = ImageRef::from(request).attach(*author_id, id);
	let image = new_image.insert(&conn).await?;
	let response: ImageResponse = image.into();

	Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(pool))]
pub(crate) async fn get_image(
	State(pool): State<DbPool>,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let image = PostImage::get_by_id(id, &conn).await?;
	let response: ImageResponse = image.into();

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool))]
pub(crate) async fn update_image(
	State(pool): State<DbPool>,
	author_id: AuthorId,
	Path(id): Path<i32>,
	Json(request): Json<UpdateImageRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let current = PostImage::get_by_id(id, &conn).await?;
	ensure_owner(current.primitive.author_id, author_id)?;

	let update: PostImageUpdate = request.into();
	let image = update.apply_to(id, &conn).await?;
	let response: ImageResponse = image.into();

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool))]
pub(crate) async fn delete_image(
	State(pool): State<DbPool>,
	author_id: AuthorId,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let current = PostImage::get_by_id(id, &conn).await?;
	ensure_owner(current.primitive.author_id, author_id)?;

	PostImage::delete_by_id(id, &conn).await?;

	Ok((StatusCode::NO_CONTENT, NoContent))
}
