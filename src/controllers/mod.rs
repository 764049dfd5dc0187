//! Defines controller functions that correspond to individual routes

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{DbPool, Error};
use diesel::{RunQueryDsl, sql_query};
use serde_json::json;

use crate::AuthorId;

pub mod auth;
pub mod author;
pub mod booking;
pub mod comment;
pub mod image;
pub mod location;
pub mod post;

/// List the top level endpoints
pub(crate) async fn root() -> impl IntoResponse {
	Json(json!({
		"auth": "/auth",
		"authors": "/authors",
		"locations": "/locations",
		"boxedLocations": "/boxed-locations",
		"posts": "/posts",
		"comments": "/comments",
		"images": "/images",
		"bookings": "/bookings",
		"healthcheck": "/healthcheck",
	}))
}

/// Check if the database connection and webserver are functional
pub(crate) async fn healthcheck(
	State(pool): State<DbPool>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	conn.interact(|conn| sql_query("SELECT 1").execute(conn)).await??;

	Ok((StatusCode::OK, Json(json!({ "status": "ok" }))))
}

/// Only let the owning author through
fn ensure_owner(owner_id: i32, author: AuthorId) -> Result<(), Error> {
	if owner_id != *author {
		warn!("author {author} tried to modify a resource of author {owner_id}");

		return Err(Error::Forbidden);
	}

	Ok(())
}
