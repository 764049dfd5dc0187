#[macro_use]
extern crate tracing;

use chrono::NaiveDateTime;
use common::{DbConn, Error};
use db::{PostState, post};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

mod price;

pub use price::Price;

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = post)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitivePost {
	pub id:          i32,
	pub author_id:   i32,
	pub location_id: i32,
	pub title:       String,
	pub content:     String,
	pub price_cents: i64,
	pub capacity:    i32,
	pub city:        String,
	pub post_type:   String,
	pub state:       PostState,
	pub created_at:  NaiveDateTime,
	pub updated_at:  NaiveDateTime,
}

impl PrimitivePost {
	/// Get a [`PrimitivePost`] by its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(p_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let post = conn
			.interact(move |conn| {
				use self::post::dsl::*;

				post.find(p_id).select(Self::as_select()).get_result(conn)
			})
			.await??;

		Ok(post)
	}

	#[must_use]
	pub fn price(&self) -> Price { Price::from_cents(self.price_cents) }
}
