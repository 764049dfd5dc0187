use author::{Author, AuthorUpdate};
use chrono::{NaiveDate, NaiveDateTime};
use primitive_author::PrimitiveAuthor;
use serde::{Deserialize, Serialize};
use validator_derive::Validate;

use crate::schemas::auth::PHONE_REGEX;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
	pub id:            i32,
	pub username:      String,
	pub email:         String,
	pub first_name:    String,
	pub last_name:     String,
	pub birthday:      Option<NaiveDate>,
	pub phone_number:  Option<String>,
	pub is_active:     bool,
	pub date_joined:   NaiveDateTime,
	pub last_login:    Option<NaiveDateTime>,
	pub post_count:    i64,
	pub booking_count: i64,
	pub comment_count: i64,
}

impl From<Author> for AuthorResponse {
	fn from(value: Author) -> Self {
		let mut response = Self::from(value.primitive);

		response.post_count = value.post_count;
		response.booking_count = value.booking_count;
		response.comment_count = value.comment_count;

		response
	}
}

impl From<PrimitiveAuthor> for AuthorResponse {
	fn from(value: PrimitiveAuthor) -> Self {
		Self {
			id:            value.id,
			username:      value.username,
			email:         value.email,
			first_name:    value.first_name,
			last_name:     value.last_name,
			birthday:      value.birthday,
			phone_number:  value.phone_number,
			is_active:     value.is_active,
			date_joined:   value.date_joined,
			last_login:    value.last_login,
			post_count:    0,
			booking_count: 0,
			comment_count: 0,
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuthorRequest {
	#[validate(email(message = "invalid email", code = "email"))]
	pub email:        Option<String>,
	#[validate(length(max = 32, code = "first-name-length"))]
	pub first_name:   Option<String>,
	#[validate(length(max = 32, code = "last-name-length"))]
	pub last_name:    Option<String>,
	pub birthday:     Option<NaiveDate>,
	#[validate(regex(path = *PHONE_REGEX, code = "phone-number"))]
	pub phone_number: Option<String>,
}

impl From<UpdateAuthorRequest> for AuthorUpdate {
	fn from(value: UpdateAuthorRequest) -> Self {
		Self {
			email:        value.email,
			first_name:   value.first_name,
			last_name:    value.last_name,
			birthday:     value.birthday,
			phone_number: value.phone_number,
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DeleteAuthorRequest {
	/// Must repeat the username of the author being deleted
	pub username: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
	pub current_password: String,
	#[validate(length(
		min = 8,
		message = "password must be at least 8 characters long",
		code = "password-length"
	))]
	pub new_password:     String,
}
