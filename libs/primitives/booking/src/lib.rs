#[macro_use]
extern crate tracing;

use chrono::NaiveDateTime;
use common::{DbConn, Error};
use db::{BookingState, booking};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = booking)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveBooking {
	pub id:         i32,
	pub author_id:  i32,
	pub post_id:    i32,
	pub title:      String,
	pub begin_at:   NaiveDateTime,
	pub end_at:     NaiveDateTime,
	pub state:      BookingState,
	pub created_at: NaiveDateTime,
	pub updated_at: NaiveDateTime,
}

impl PrimitiveBooking {
	/// Get a [`PrimitiveBooking`] by its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(b_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let booking = conn
			.interact(move |conn| {
				use self::booking::dsl::*;

				booking.find(b_id).select(Self::as_select()).get_result(conn)
			})
			.await??;

		Ok(booking)
	}

	/// The time window this booking occupies
	#[must_use]
	pub fn window(&self) -> BookingWindow {
		BookingWindow { begin: self.begin_at, end: self.end_at }
	}
}

/// A half-open `[begin, end)` time window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BookingWindow {
	begin: NaiveDateTime,
	end:   NaiveDateTime,
}

impl BookingWindow {
	/// Create a new window, `begin` must lie strictly before `end`
	///
	/// # Errors
	/// Errors with a validation error for empty or inverted windows
	pub fn new(begin: NaiveDateTime, end: NaiveDateTime) -> Result<Self, Error> {
		if begin >= end {
			return Err(Error::ValidationError(
				"begin must be before end".to_string(),
			));
		}

		Ok(Self { begin, end })
	}

	/// Check whether two windows share any instant
	///
	/// Back-to-back windows (one ending when the other begins) do not overlap
	#[must_use]
	pub fn overlaps(&self, other: &Self) -> bool {
		self.begin < other.end && other.begin < self.end
	}
}

#[cfg(test)]
mod tests {
	use chrono::{NaiveDate, NaiveDateTime};

	use super::BookingWindow;

	fn at(hour: u32, min: u32) -> NaiveDateTime {
		NaiveDate::from_ymd_opt(2024, 3, 1)
			.unwrap()
			.and_hms_opt(hour, min, 0)
			.unwrap()
	}

	fn window(b: (u32, u32), e: (u32, u32)) -> BookingWindow {
		BookingWindow::new(at(b.0, b.1), at(e.0, e.1)).unwrap()
	}

	#[test]
	fn empty_window_is_invalid() {
		assert!(BookingWindow::new(at(10, 0), at(10, 0)).is_err());
	}

	#[test]
	fn inverted_window_is_invalid() {
		assert!(BookingWindow::new(at(11, 0), at(10, 0)).is_err());
	}

	#[test]
	fn partial_overlap() {
		let a = window((10, 0), (11, 0));
		let b = window((10, 30), (11, 30));

		assert!(a.overlaps(&b));
	}

	#[test]
	fn back_to_back_does_not_overlap() {
		let a = window((10, 0), (11, 0));
		let b = window((11, 0), (12, 0));

		assert!(!a.overlaps(&b));
		assert!(!b.overlaps(&a));
	}

	#[test]
	fn containment_overlaps() {
		let outer = window((9, 0), (17, 0));
		let inner = window((12, 0), (12, 15));

		assert!(outer.overlaps(&inner));
		assert!(inner.overlaps(&outer));
	}

	#[test]
	fn overlap_is_symmetric() {
		let windows = [
			window((8, 0), (9, 0)),
			window((8, 30), (10, 0)),
			window((9, 0), (9, 30)),
			window((10, 0), (12, 0)),
			window((7, 0), (13, 0)),
		];

		for a in &windows {
			for b in &windows {
				assert_eq!(a.overlaps(b), b.overlaps(a), "{a:?} / {b:?}");
			}
		}
	}
}
