use booking::{Booking, NewBooking};
use chrono::NaiveDateTime;
use db::BookingState;
use primitive_booking::PrimitiveBooking;
use serde::{Deserialize, Serialize};
use validator_derive::Validate;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
	pub id:         i32,
	pub author_id:  i32,
	pub post_id:    i32,
	pub title:      String,
	pub begin:      NaiveDateTime,
	pub end:        NaiveDateTime,
	pub state:      BookingState,
	pub created_at: NaiveDateTime,
	pub updated_at: NaiveDateTime,
}

impl From<PrimitiveBooking> for BookingResponse {
	fn from(value: PrimitiveBooking) -> Self {
		Self {
			id:         value.id,
			author_id:  value.author_id,
			post_id:    value.post_id,
			title:      value.title,
			begin:      value.begin_at,
			end:        value.end_at,
			state:      value.state,
			created_at: value.created_at,
			updated_at: value.updated_at,
		}
	}
}

impl From<Booking> for BookingResponse {
	fn from(value: Booking) -> Self { value.primitive.into() }
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
	pub post_id: i32,
	#[serde(default)]
	#[validate(length(max = 255, code = "title-length"))]
	pub title:   String,
	pub begin:   NaiveDateTime,
	pub end:     NaiveDateTime,
}

impl CreateBookingRequest {
	#[must_use]
	pub fn to_insertable(self, author_id: i32) -> NewBooking {
		NewBooking {
			author_id,
			post_id: self.post_id,
			title: self.title,
			begin_at: self.begin,
			end_at: self.end,
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct ChangeBookingStatusRequest {
	pub status: BookingState,
}
