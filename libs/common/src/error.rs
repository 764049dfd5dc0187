//! Library-wide error types and [`From`] impls

use std::collections::HashMap;
use std::sync::LazyLock;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDateTime;
use diesel::result::DatabaseErrorKind;
use thiserror::Error;
use tokio::sync::mpsc;

/// Top level application error, can be converted into a [`Response`]
#[derive(Debug, Error)]
pub enum Error {
	/// Duplicate resource created
	#[error("{0}")]
	Duplicate(String),
	/// Request/operation forbidden
	#[error("forbidden")]
	Forbidden,
	/// An error that should never happen
	#[error("{0}")]
	Infallible(String),
	/// Opaque internal server error
	#[error("internal server error")]
	InternalServerError,
	/// Resource not found
	#[error("not found - {0}")]
	NotFound(String),
	/// Any error related to logging in
	#[error(transparent)]
	LoginError(#[from] LoginError),
	/// Some data in the request was missing
	#[error("{0}")]
	MissingRequestData(String),
	/// Invalid or missing token
	#[error(transparent)]
	TokenError(#[from] TokenError),
	/// Any error related to proposing or deciding a booking
	#[error(transparent)]
	BookingError(#[from] BookingError),
	/// A concurrent write won the race for the same resource
	#[error("conflict - {0}")]
	Conflict(String),
	/// Resource could not be validated
	#[error("{0}")]
	ValidationError(String),
}

impl Error {
	/// Return a unique identifying code for this error
	///
	/// Error codes only ever increase, a code is never reused once it has
	/// been assigned
	fn code(&self) -> i32 {
		match self {
			Self::Duplicate(_) => 1,
			Self::Forbidden => 2,
			Self::Infallible(_) => 3,
			Self::InternalServerError => 4,
			Self::NotFound(_) => 5,
			Self::LoginError(e) => {
				match e {
					LoginError::UnknownUsername(_) => 6,
					LoginError::InvalidPassword => 7,
					LoginError::Inactive => 8,
				}
			},
			Self::MissingRequestData(_) => 9,
			Self::TokenError(e) => {
				match e {
					TokenError::MissingAccessToken => 10,
					TokenError::InvalidToken => 11,
					TokenError::ExpiredToken => 12,
					TokenError::ExpiredActivationToken => 13,
					TokenError::WrongTokenKind => 14,
				}
			},
			Self::BookingError(e) => {
				match e {
					BookingError::Overlap { .. } => 15,
					BookingError::InvalidTransition { .. } => 16,
				}
			},
			Self::Conflict(_) => 17,
			Self::ValidationError(_) => 18,
		}
	}

	/// Return additional information about the error
	fn info(&self) -> Option<String> {
		match self {
			Self::Duplicate(m)
			| Self::NotFound(m)
			| Self::Conflict(m)
			| Self::LoginError(LoginError::UnknownUsername(m))
			| Self::ValidationError(m) => Some(m.to_owned()),
			Self::BookingError(e) => {
				match e {
					BookingError::Overlap { id, begin, end } => {
						Some(
							serde_json::json!({
								"id": id,
								"begin": begin,
								"end": end,
							})
							.to_string(),
						)
					},
					BookingError::InvalidTransition { from, to } => {
						Some(
							serde_json::json!({"from": from, "to": to})
								.to_string(),
						)
					},
				}
			},
			_ => None,
		}
	}
}

/// Convert an error into a [`Response`]
impl IntoResponse for Error {
	fn into_response(self) -> Response {
		error!("{self:?}");

		let message = self.to_string();

		let data = serde_json::json!({
			"message": message,
			"code": self.code(),
			"info": self.info(),
		});

		let status = match self {
			Self::Duplicate(_)
			| Self::Conflict(_)
			| Self::BookingError(BookingError::Overlap { .. }) => {
				StatusCode::CONFLICT
			},
			Self::InternalServerError | Self::Infallible(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			},
			Self::TokenError(
				TokenError::MissingAccessToken
				| TokenError::InvalidToken
				| TokenError::ExpiredToken,
			) => StatusCode::UNAUTHORIZED,
			Self::Forbidden | Self::LoginError(_) | Self::TokenError(_) => {
				StatusCode::FORBIDDEN
			},
			Self::NotFound(_) => StatusCode::NOT_FOUND,
			Self::BookingError(BookingError::InvalidTransition { .. })
			| Self::ValidationError(_)
			| Self::MissingRequestData(_) => StatusCode::UNPROCESSABLE_ENTITY,
		};

		(status, axum::Json(data)).into_response()
	}
}

/// Any error related to logging in
#[derive(Debug, Error)]
pub enum LoginError {
	#[error("no author with username '{0}' was found")]
	UnknownUsername(String),
	#[error("invalid password")]
	InvalidPassword,
	#[error("author is not active")]
	Inactive,
}

/// Any error related to a token
#[derive(Debug, Error)]
pub enum TokenError {
	#[error("missing or invalid access token")]
	MissingAccessToken,
	#[error("invalid token")]
	InvalidToken,
	#[error("token has expired")]
	ExpiredToken,
	#[error("activation token has expired")]
	ExpiredActivationToken,
	#[error("wrong kind of token")]
	WrongTokenKind,
}

/// Any error related to admitting a booking
#[derive(Debug, Error)]
pub enum BookingError {
	/// The requested window overlaps an active booking on the same post
	#[error("the booking overlaps an existing booking")]
	Overlap { id: i32, begin: NaiveDateTime, end: NaiveDateTime },
	/// The requested state change is not allowed
	#[error("cannot move a booking from {from} to {to}")]
	InvalidTransition { from: String, to: String },
}

/// A list of possible internal errors
///
/// API end users should never see these details
#[derive(Debug, Error)]
pub enum InternalServerError {
	/// Error executing some database operation
	#[error("database error -- {0:?}")]
	DatabaseError(diesel::result::Error),
	/// Error interacting with a database connection
	#[error("database interaction error -- {0:?}")]
	DatabaseInteractionError(deadpool_diesel::InteractError),
	/// A handler asked for the current author outside of the auth layer
	#[error("author requested without authentication")]
	AuthorWithoutAuthError,
	/// Error contacting the geocoding provider
	#[error("geocoding error -- {0:?}")]
	GeocodingError(reqwest::Error),
	/// Error hashing some value
	#[error("hash error -- {0:?}")]
	HashError(argon2::password_hash::Error),
	/// Malformed email
	#[error("invalid email -- {0:?}")]
	InvalidEmail(lettre::address::AddressError),
	/// Error signing a token
	#[error("token signing error -- {0:?}")]
	JwtError(jsonwebtoken::errors::Error),
	/// Mailer stopped unexpectedly
	#[error("mailer stopped -- {0:?}")]
	MailerStopped(mpsc::error::SendError<lettre::Message>),
	/// Mail queue is full
	#[error("mail queue full -- {0:?}")]
	MailQueueFull(mpsc::error::TrySendError<lettre::Message>),
	/// Generic mailer error
	#[error("mail error -- {0:?}")]
	MailError(lettre::error::Error),
	/// Error acquiring database pool connection
	#[error("database pool error -- {0:?}")]
	PoolError(deadpool_diesel::PoolError),
	/// Error related to `serde_json`
	#[error("serde_json error -- {0:?}")]
	SerdeJsonError(serde_json::Error),
	/// Failed to parse a url
	#[error("could not parse url -- {0:?}")]
	UrlParseError(url::ParseError),
}

// Map internal server errors to application errors
impl From<InternalServerError> for Error {
	fn from(value: InternalServerError) -> Self {
		error!("internal server error -- {value}");

		Self::InternalServerError
	}
}

/// Map validation errors to application errors
impl From<validator::ValidationErrors> for Error {
	fn from(err: validator::ValidationErrors) -> Self {
		let errs = err.field_errors();
		let repr = errs
			.values()
			.map(|v| {
				v.iter()
					.map(ToString::to_string)
					.collect::<Vec<String>>()
					.join("\n")
			})
			.collect::<Vec<String>>()
			.join("\n");

		Self::ValidationError(repr)
	}
}

/// Map password hashing errors to application errors
impl From<argon2::password_hash::Error> for Error {
	fn from(err: argon2::password_hash::Error) -> Self {
		match err {
			argon2::password_hash::Error::Password => {
				LoginError::InvalidPassword.into()
			},
			_ => InternalServerError::HashError(err).into(),
		}
	}
}

/// Map database interaction errors to application errors
impl From<deadpool_diesel::InteractError> for Error {
	fn from(value: deadpool_diesel::InteractError) -> Self {
		InternalServerError::DatabaseInteractionError(value).into()
	}
}

/// Map of constraint names to column names.
static CONSTRAINT_TO_COLUMN: LazyLock<HashMap<&str, &str>> =
	LazyLock::new(|| {
		HashMap::from([
			("author_username_key", "username"),
			("location_address_key", "address"),
			("boxed_location_name_key", "name"),
		])
	});

/// Map database result errors to application errors.
impl From<diesel::result::Error> for Error {
	fn from(err: diesel::result::Error) -> Self {
		match &err {
			// No rows returned by query that expected at least one
			diesel::result::Error::NotFound => {
				Self::NotFound("no context provided".to_string())
			},
			// Unique constraint violation
			diesel::result::Error::DatabaseError(
				DatabaseErrorKind::UniqueViolation,
				info,
			) => {
				let field = info
					.constraint_name()
					.and_then(|name| CONSTRAINT_TO_COLUMN.get(name));

				match field {
					Some(field) => {
						Self::Duplicate(format!("{field} is already in use"))
					},
					None => InternalServerError::DatabaseError(err).into(),
				}
			},
			// Foreign key or check constraint violation
			diesel::result::Error::DatabaseError(
				DatabaseErrorKind::ForeignKeyViolation
				| DatabaseErrorKind::CheckViolation,
				info,
			) => Error::ValidationError(info.message().to_string()),
			// Concurrent transaction could not be serialized
			diesel::result::Error::DatabaseError(
				DatabaseErrorKind::SerializationFailure,
				info,
			) => Error::Conflict(info.message().to_string()),
			_ => InternalServerError::DatabaseError(err).into(),
		}
	}
}

impl From<deadpool_diesel::PoolError> for Error {
	fn from(value: deadpool_diesel::PoolError) -> Self {
		InternalServerError::PoolError(value).into()
	}
}

/// Map token decoding errors to application errors
impl From<jsonwebtoken::errors::Error> for Error {
	fn from(err: jsonwebtoken::errors::Error) -> Self {
		use jsonwebtoken::errors::ErrorKind;

		match err.kind() {
			ErrorKind::ExpiredSignature => TokenError::ExpiredToken.into(),
			ErrorKind::InvalidToken
			| ErrorKind::InvalidSignature
			| ErrorKind::InvalidIssuer
			| ErrorKind::InvalidAudience
			| ErrorKind::InvalidSubject
			| ErrorKind::InvalidAlgorithm
			| ErrorKind::ImmatureSignature
			| ErrorKind::MissingRequiredClaim(_)
			| ErrorKind::Base64(_)
			| ErrorKind::Json(_)
			| ErrorKind::Utf8(_) => TokenError::InvalidToken.into(),
			_ => InternalServerError::JwtError(err).into(),
		}
	}
}

impl From<lettre::address::AddressError> for Error {
	fn from(err: lettre::address::AddressError) -> Self {
		InternalServerError::InvalidEmail(err).into()
	}
}

impl From<mpsc::error::SendError<lettre::Message>> for Error {
	fn from(err: mpsc::error::SendError<lettre::Message>) -> Self {
		InternalServerError::MailerStopped(err).into()
	}
}

impl From<mpsc::error::TrySendError<lettre::Message>> for Error {
	fn from(err: mpsc::error::TrySendError<lettre::Message>) -> Self {
		InternalServerError::MailQueueFull(err).into()
	}
}

impl From<lettre::error::Error> for Error {
	fn from(err: lettre::error::Error) -> Self {
		InternalServerError::MailError(err).into()
	}
}

impl From<reqwest::Error> for Error {
	fn from(err: reqwest::Error) -> Self {
		InternalServerError::GeocodingError(err).into()
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		InternalServerError::SerdeJsonError(err).into()
	}
}

impl From<url::ParseError> for Error {
	fn from(err: url::ParseError) -> Self {
		InternalServerError::UrlParseError(err).into()
	}
}
