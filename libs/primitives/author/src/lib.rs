#[macro_use]
extern crate tracing;

use chrono::{NaiveDate, NaiveDateTime};
use common::{DbConn, Error};
use db::author;
use diesel::pg::Pg;
use diesel::prelude::*;
use lettre::message::Mailbox;
use serde::{Deserialize, Serialize};

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = author)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveAuthor {
	pub id:                      i32,
	pub username:                String,
	pub email:                   String,
	#[serde(skip_serializing)]
	pub password_hash:           String,
	pub first_name:              String,
	pub last_name:               String,
	pub birthday:                Option<NaiveDate>,
	pub phone_number:            Option<String>,
	pub is_active:               bool,
	#[serde(skip_serializing)]
	pub activation_token:        Option<String>,
	pub activation_token_expiry: Option<NaiveDateTime>,
	pub date_joined:             NaiveDateTime,
	pub last_login:              Option<NaiveDateTime>,
}

impl PrimitiveAuthor {
	/// Get a [`PrimitiveAuthor`] by its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(a_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let author = conn
			.interact(move |conn| {
				use self::author::dsl::*;

				author.find(a_id).select(Self::as_select()).get_result(conn)
			})
			.await??;

		Ok(author)
	}

	/// Check whether the activation token of this author is still usable
	/// at the given moment
	#[must_use]
	pub fn activation_token_valid_at(&self, now: NaiveDateTime) -> bool {
		self.activation_token_expiry.is_some_and(|expiry| now < expiry)
	}
}

impl TryFrom<&PrimitiveAuthor> for Mailbox {
	type Error = Error;

	fn try_from(value: &PrimitiveAuthor) -> Result<Mailbox, Error> {
		Ok(Mailbox::new(Some(value.username.clone()), value.email.parse()?))
	}
}
