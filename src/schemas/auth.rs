use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator_derive::Validate;

static USERNAME_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9-_]*$").unwrap());

pub(crate) static PHONE_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^\+?1?\d{9,15}$").unwrap());

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
	#[validate(regex(
		path = *USERNAME_REGEX,
		message = "username must start with a letter and only contain letters, numbers, dashes, or underscores",
		code = "username-regex"
	))]
	#[validate(length(
		min = 2,
		max = 32,
		message = "username must be between 2 and 32 characters long",
		code = "username-length"
	))]
	pub username:     String,
	#[validate(length(
		min = 8,
		message = "password must be at least 8 characters long",
		code = "password-length"
	))]
	pub password:     String,
	#[validate(email(message = "invalid email", code = "email"))]
	pub email:        String,
	#[serde(default)]
	#[validate(length(
		max = 32,
		message = "first name must be at most 32 characters long",
		code = "first-name-length"
	))]
	pub first_name:   String,
	#[serde(default)]
	#[validate(length(
		max = 32,
		message = "last name must be at most 32 characters long",
		code = "last-name-length"
	))]
	pub last_name:    String,
	pub birthday:     Option<NaiveDate>,
	#[validate(regex(
		path = *PHONE_REGEX,
		message = "phone number must be entered in the format '+999999999', up to 15 digits",
		code = "phone-number"
	))]
	pub phone_number: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LoginRequest {
	pub username: String,
	pub password: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct VerifyTokenRequest {
	pub token: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
	pub refresh_token: String,
}
