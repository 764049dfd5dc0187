#[macro_use]
extern crate tracing;

use chrono::NaiveDateTime;
use common::{BookingError, DbConn, Error};
use db::{BookingState, PostState, booking, post};
use diesel::pg::Pg;
use diesel::prelude::*;
use models_common::{PaginatedData, PaginationConfig, ToFilter};
use primitive_booking::{BookingWindow, PrimitiveBooking};
use serde::{Deserialize, Serialize};

mod filter;

pub use filter::*;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Booking {
	pub primitive: PrimitiveBooking,
}

impl From<PrimitiveBooking> for Booking {
	fn from(primitive: PrimitiveBooking) -> Self { Self { primitive } }
}

/// Find the lowest id booking in `existing` whose window overlaps `window`
pub fn first_conflict<'a>(
	window: BookingWindow,
	existing: impl IntoIterator<Item = &'a PrimitiveBooking>,
) -> Option<&'a PrimitiveBooking> {
	existing
		.into_iter()
		.filter(|b| b.window().overlaps(&window))
		.min_by_key(|b| b.id)
}

fn overlap_error(conflict: &PrimitiveBooking) -> Error {
	BookingError::Overlap {
		id:    conflict.id,
		begin: conflict.begin_at,
		end:   conflict.end_at,
	}
	.into()
}

/// Take the row lock on a post, serializing every booking decision for it
///
/// Returns the id of the post owner.
fn lock_open_post(p_id: i32, conn: &mut PgConnection) -> Result<i32, Error> {
	let locked = post::table
		.find(p_id)
		.select((post::author_id, post::state))
		.for_update()
		.get_result::<(i32, PostState)>(conn)
		.optional()?;

	match locked {
		Some((owner, state)) if state.is_open() => Ok(owner),
		_ => Err(Error::NotFound(format!("open post with id {p_id}"))),
	}
}

impl Booking {
	/// Get a [`Booking`] given its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(b_id: i32, conn: &DbConn) -> Result<Self, Error> {
		Ok(PrimitiveBooking::get_by_id(b_id, conn).await?.into())
	}

	/// Search through all [`Booking`]s ordered by id
	#[instrument(skip(conn))]
	pub async fn search(
		b_filter: BookingFilter,
		p_cfg: PaginationConfig,
		conn: &DbConn,
	) -> Result<PaginatedData<Vec<Self>>, Error> {
		b_filter.validate()?;

		let count_filter = ToFilter::<booking::table>::to_filter(&b_filter);
		let page_filter = ToFilter::<booking::table>::to_filter(&b_filter);

		let (total, bookings) = conn
			.interact(move |conn| {
				use self::booking::dsl::*;

				let total =
					booking.filter(count_filter).count().get_result::<i64>(conn)?;

				let bookings = booking
					.filter(page_filter)
					.order(id)
					.limit(p_cfg.limit)
					.offset(p_cfg.offset)
					.select(PrimitiveBooking::as_select())
					.get_results(conn)?;

				Ok::<_, diesel::result::Error>((total, bookings))
			})
			.await??;

		let bookings = bookings.into_iter().map(Into::into).collect();

		Ok((total, bookings))
	}

	/// Move a booking to another state on behalf of `requester`
	///
	/// # Errors
	/// Errors if the requester neither owns the post nor the booking, if the
	/// transition is not allowed, or if approving would overlap another
	/// approved booking
	#[instrument(skip(conn))]
	pub async fn change_state(
		b_id: i32,
		next: BookingState,
		requester: i32,
		conn: &DbConn,
	) -> Result<Self, Error> {
		let updated = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					let current = booking::table
						.find(b_id)
						.select(PrimitiveBooking::as_select())
						.for_update()
						.get_result(conn)?;

					let owner = post::table
						.find(current.post_id)
						.select(post::author_id)
						.for_update()
						.get_result::<i32>(conn)?;

					if requester != owner && requester != current.author_id {
						return Err(Error::Forbidden);
					}

					if !current.state.can_transition_to(next) {
						return Err(BookingError::InvalidTransition {
							from: current.state.to_string(),
							to:   next.to_string(),
						}
						.into());
					}

					if next == BookingState::Approved {
						let approved = booking::table
							.filter(booking::post_id.eq(current.post_id))
							.filter(booking::state.eq(BookingState::Approved))
							.filter(booking::id.ne(b_id))
							.order(booking::id)
							.select(PrimitiveBooking::as_select())
							.get_results(conn)?;

						if let Some(conflict) =
							first_conflict(current.window(), &approved)
						{
							return Err(overlap_error(conflict));
						}
					}

					diesel::update(booking::table.find(b_id))
						.set(booking::state.eq(next))
						.returning(PrimitiveBooking::as_returning())
						.get_result(conn)
						.map_err(Into::into)
				})
			})
			.await??;

		info!("booking {b_id} is now {next} (by author {requester})");

		Ok(updated.into())
	}
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = booking)]
#[diesel(check_for_backend(Pg))]
pub struct NewBooking {
	pub author_id: i32,
	pub post_id:   i32,
	pub title:     String,
	pub begin_at:  NaiveDateTime,
	pub end_at:    NaiveDateTime,
}

impl NewBooking {
	/// Admit this [`NewBooking`] as a proposal if it does not overlap any
	/// active booking of its post
	///
	/// # Errors
	/// Errors if the window is empty, if the post does not exist or is
	/// closed, or with [`BookingError::Overlap`] naming the lowest id active
	/// booking it collides with
	#[instrument(skip(conn))]
	pub async fn propose(self, conn: &DbConn) -> Result<Booking, Error> {
		let window = BookingWindow::new(self.begin_at, self.end_at)?;

		let proposed = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					lock_open_post(self.post_id, conn)?;

					let active = booking::table
						.filter(booking::post_id.eq(self.post_id))
						.filter(booking::state.eq_any(BookingState::ACTIVE))
						.order(booking::id)
						.select(PrimitiveBooking::as_select())
						.get_results(conn)?;

					if let Some(conflict) = first_conflict(window, &active) {
						return Err(overlap_error(conflict));
					}

					diesel::insert_into(booking::table)
						.values(self)
						.returning(PrimitiveBooking::as_returning())
						.get_result(conn)
						.map_err(Into::into)
				})
			})
			.await??;

		info!(
			"author {} proposed booking {} on post {}",
			proposed.author_id, proposed.id, proposed.post_id
		);

		Ok(proposed.into())
	}
}
