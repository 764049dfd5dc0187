#[macro_use]
extern crate tracing;

use std::ops::RangeInclusive;

use chrono::NaiveDateTime;
use common::{DbConn, Error};
use db::{CommentState, comment};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Ratings a comment may carry
pub const RATING_RANGE: RangeInclusive<i32> = 0..=10;

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = comment)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveComment {
	pub id:         i32,
	pub author_id:  i32,
	pub post_id:    i32,
	pub parent_id:  Option<i32>,
	pub content:    String,
	pub rating:     i32,
	pub state:      CommentState,
	pub created_at: NaiveDateTime,
	pub updated_at: NaiveDateTime,
}

impl PrimitiveComment {
	/// Get a [`PrimitiveComment`] by its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(c_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let comment = conn
			.interact(move |conn| {
				use self::comment::dsl::*;

				comment.find(c_id).select(Self::as_select()).get_result(conn)
			})
			.await??;

		Ok(comment)
	}
}

/// Reject ratings outside of [`RATING_RANGE`]
///
/// # Errors
/// Errors with a validation error if the rating is out of range
pub fn check_rating(rating: i32) -> Result<(), Error> {
	if RATING_RANGE.contains(&rating) {
		return Ok(());
	}

	Err(Error::ValidationError(format!(
		"rating must be between {} and {}",
		RATING_RANGE.start(),
		RATING_RANGE.end(),
	)))
}
