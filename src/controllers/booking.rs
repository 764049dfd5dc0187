//! Controllers for [`Booking`]s

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use booking::{Booking, BookingFilter};
use common::{DbPool, Error};
use validator::Validate;

use crate::AuthorId;
use crate::schemas::booking::{
	BookingResponse,
	ChangeBookingStatusRequest,
	CreateBookingRequest,
};
use crate::schemas::pagination::PaginationOptions;

/// Propose a booking window on a post
#[instrument(skip(pool))]
pub(crate) async fn propose_booking(
	State(pool): State<DbPool>,
	author_id: AuthorId,
	Json(request): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let booking = request.to_insertable(*author_id).propose(&conn).await?;
	let response: BookingResponse = booking.into();

	Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(pool))]
pub(crate) async fn search_bookings(
	State(pool): State<DbPool>,
	Query(filter): Query<BookingFilter>,
	Query(p_opts): Query<PaginationOptions>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let (total, bookings) =
		Booking::search(filter, p_opts.into(), &conn).await?;
	let bookings: Vec<BookingResponse> =
		bookings.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(p_opts.paginate(total, bookings))))
}

#[instrument(skip(pool))]
pub(crate) async fn get_booking(
	State(pool): State<DbPool>,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let booking = Booking::get_by_id(id, &conn).await?;
	let response: BookingResponse = booking.into();

	Ok((StatusCode::OK, Json(response)))
}

/// Approve, reject or cancel a booking
#[instrument(skip(pool))]
pub(crate) async fn change_booking_status(
	State(pool): State<DbPool>,
	author_id: AuthorId,
	Path(id): Path<i32>,
	Json(request): Json<ChangeBookingStatusRequest>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let booking =
		Booking::change_state(id, request.status, *author_id, &conn).await?;
	let response: BookingResponse = booking.into();

	Ok((StatusCode::OK, Json(response)))
}
