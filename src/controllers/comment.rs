//! Controllers for [`Comment`]s

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, NoContent};
use comment::{Comment, CommentUpdate};
use common::{DbPool, Error};
use validator::Validate;

use crate::AuthorId;
use crate::controllers::ensure_owner;
use crate::schemas::comment::{
	CommentResponse,
	CreateCommentRequest,
	UpdateCommentRequest,
};

/// Get the comments of a post as nested reply trees
#[instrument(skip(pool))]
pub(crate) async fn get_post_comments(
	State(pool): State<DbPool>,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let tree = Comment::tree_for_post(id, &conn).await?;
	let roots = tree.nest_with(CommentResponse::with_replies);

	Ok((StatusCode::OK, Json(roots)))
}

#[instrument(skip(pool))]
pub(crate) async fn create_comment(
	State(pool): State<DbPool>,
	author_id: AuthorId,
	Json(request): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let comment = request.to_insertable(*author_id).insert(&conn).await?;
	let response: CommentResponse = comment.into();

	Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(pool))]
pub(crate) async fn get_comment(
	State(pool): State<DbPool>,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let comment = Comment::get_by_id(id, &conn).await?;
	let response: CommentResponse = comment.into();

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool))]
pub(crate) async fn update_comment(
	State(pool): State<DbPool>,
	author_id: AuthorId,
	Path(id): Path<i32>,
	Json(request): Json<UpdateCommentRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let current = Comment::get_by_id(id, &conn).await?;
	ensure_owner(current.primitive.author_id, author_id)?;

	let update: CommentUpdate = request.into();
	let comment = update.apply_to(id, &conn).await?;
	let response: CommentResponse = comment.into();

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool))]
pub(crate) async fn delete_comment(
	State(pool): State<DbPool>,
	author_id: AuthorId,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let current = Comment::get_by_id(id, &conn).await?;
	ensure_owner(current.primitive.author_id, author_id)?;

	Comment::delete_by_id(id, &conn).await?;

	Ok((StatusCode::NO_CONTENT, NoContent))
}
