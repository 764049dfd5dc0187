//! Controllers for [`Author`]s

use author::{Author, AuthorUpdate};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, NoContent};
use common::{DbPool, Error};
use validator::Validate;

use crate::AuthorId;
use crate::schemas::author::{
	AuthorResponse,
	ChangePasswordRequest,
	DeleteAuthorRequest,
	UpdateAuthorRequest,
};
use crate::schemas::pagination::PaginationOptions;

#[instrument(skip(pool))]
pub(crate) async fn get_authors(
	State(pool): State<DbPool>,
	Query(p_opts): Query<PaginationOptions>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let (total, authors) = Author::get_all_active(p_opts.into(), &conn).await?;
	let authors: Vec<AuthorResponse> =
		authors.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(p_opts.paginate(total, authors))))
}

#[instrument(skip(pool))]
pub(crate) async fn get_author(
	State(pool): State<DbPool>,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let author = Author::get_active(id, &conn).await?;
	let response: AuthorResponse = author.into();

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool))]
pub(crate) async fn get_current_author(
	State(pool): State<DbPool>,
	author_id: AuthorId,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let author = Author::get(*author_id, &conn).await?;
	let response: AuthorResponse = author.into();

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool))]
pub(crate) async fn update_current_author(
	State(pool): State<DbPool>,
	author_id: AuthorId,
	Json(request): Json<UpdateAuthorRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let update: AuthorUpdate = request.into();
	let author = update.apply_to(*author_id, &conn).await?;
	let response: AuthorResponse = author.into();

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool))]
pub(crate) async fn delete_current_author(
	State(pool): State<DbPool>,
	author_id: AuthorId,
	Json(request): Json<DeleteAuthorRequest>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	Author::deactivate(*author_id, request.username, &conn).await?;

	Ok((StatusCode::NO_CONTENT, NoContent))
}

#[instrument(skip_all)]
pub(crate) async fn change_password(
	State(pool): State<DbPool>,
	author_id: AuthorId,
	Json(request): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	Author::change_password(
		*author_id,
		request.current_password,
		request.new_password,
		&conn,
	)
	.await?;

	Ok((StatusCode::NO_CONTENT, NoContent))
}
