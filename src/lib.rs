//! # webizcafe backend library

#[macro_use]
extern crate tracing;

use std::ops::Deref;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use common::{DbPool, Error, InternalServerError};

mod config;
mod seeder;

pub mod controllers;
pub mod geocoder;
pub mod mailer;
pub mod middleware;
pub mod routes;
pub mod schemas;
pub mod tokens;

pub use config::*;
use geocoder::Geocoder;
use mailer::Mailer;
pub use seeder::*;

/// The author a request was authenticated as
///
/// Only available on routes behind an [`AuthLayer`](middleware::AuthLayer)
#[derive(Clone, Copy, Debug)]
pub(crate) struct AuthorId(pub(crate) i32);

impl Deref for AuthorId {
	type Target = i32;

	fn deref(&self) -> &Self::Target { &self.0 }
}

impl std::fmt::Display for AuthorId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl<S> FromRequestParts<S> for AuthorId
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(
		parts: &mut Parts,
		_state: &S,
	) -> Result<Self, Self::Rejection> {
		parts
			.extensions
			.get::<Self>()
			.copied()
			.ok_or_else(|| InternalServerError::AuthorWithoutAuthError.into())
	}
}

/// Common state of the app
#[derive(Clone)]
pub struct AppState {
	pub config:        Config,
	pub database_pool: DbPool,
	pub mailer:        Mailer,
	pub geocoder:      Geocoder,
}

impl FromRef<AppState> for Config {
	fn from_ref(input: &AppState) -> Self { input.config.clone() }
}

impl FromRef<AppState> for DbPool {
	fn from_ref(input: &AppState) -> Self { input.database_pool.clone() }
}

impl FromRef<AppState> for Mailer {
	fn from_ref(input: &AppState) -> Self { input.mailer.clone() }
}

impl FromRef<AppState> for Geocoder {
	fn from_ref(input: &AppState) -> Self { input.geocoder.clone() }
}
