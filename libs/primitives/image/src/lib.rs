#[macro_use]
extern crate tracing;

use chrono::NaiveDateTime;
use common::{DbConn, Error};
use db::post_image;
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = post_image)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitivePostImage {
	pub id:         i32,
	pub author_id:  i32,
	pub post_id:    i32,
	pub name:       String,
	pub image_url:  String,
	pub created_at: NaiveDateTime,
	pub updated_at: NaiveDateTime,
}

impl PrimitivePostImage {
	#[instrument(skip(conn))]
	pub async fn get_by_id(img_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let img = conn
			.interact(move |conn| {
				use self::post_image::dsl::*;

				post_image.find(img_id).select(Self::as_select()).first(conn)
			})
			.await??;

		Ok(img)
	}

	#[instrument(skip(conn))]
	pub async fn delete_by_id(img_id: i32, conn: &DbConn) -> Result<(), Error> {
		conn.interact(move |conn| {
			use self::post_image::dsl::*;

			diesel::delete(post_image.find(img_id)).execute(conn)
		})
		.await??;

		info!("deleted post image with id {img_id}");

		Ok(())
	}
}
