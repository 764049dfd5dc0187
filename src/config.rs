use std::str::FromStr;
use std::sync::Arc;

use chrono::TimeDelta;
use common::DbPool;
use deadpool_diesel::postgres::{Manager, Pool};
use lettre::Address;
use url::Url;

use crate::geocoder::Geocoder;
use crate::mailer::StubMailbox;

#[derive(Clone, Debug)]
pub struct Config {
	pub database_url: String,

	pub jwt_secret:                String,
	pub access_token_lifetime:     TimeDelta,
	pub refresh_token_lifetime:    TimeDelta,
	pub activation_token_lifetime: TimeDelta,
	pub skip_activation:           bool,

	pub frontend_url: Url,

	pub email_address:       Address,
	pub email_queue_size:    usize,
	pub email_smtp_server:   String,
	pub email_smtp_password: String,

	pub geocoding_url:     String,
	pub geocoding_api_key: String,
}

impl Config {
	fn get_env_var(var: &str) -> String {
		std::env::var(var).unwrap_or_else(|_| panic!("{var} must be set"))
	}

	fn get_parsed_env_var<T: FromStr>(var: &str) -> T {
		Self::get_env_var(var)
			.parse::<T>()
			.unwrap_or_else(|_| panic!("{var} could not be parsed"))
	}

	/// Create a new [`Config`] from environment variables
	///
	/// # Panics
	/// Panics if an environment variable is missing or malformed
	#[must_use]
	pub fn from_env() -> Self {
		let database_url = Self::get_env_var("DATABASE_URL");

		let jwt_secret = Self::get_env_var("JWT_SECRET");
		let access_token_lifetime = TimeDelta::minutes(
			Self::get_parsed_env_var("ACCESS_TOKEN_LIFETIME_MINUTES"),
		);
		let refresh_token_lifetime = TimeDelta::minutes(
			Self::get_parsed_env_var("REFRESH_TOKEN_LIFETIME_MINUTES"),
		);
		let activation_token_lifetime = TimeDelta::minutes(
			Self::get_parsed_env_var("ACTIVATION_TOKEN_LIFETIME_MINUTES"),
		);
		let skip_activation = std::env::var("SKIP_ACTIVATION")
			.is_ok_and(|v| v == "true" || v == "1");

		let frontend_url = Self::get_parsed_env_var("FRONTEND_URL");

		let email_address = Self::get_parsed_env_var("EMAIL_ADDRESS");
		let email_queue_size = Self::get_parsed_env_var("EMAIL_QUEUE_SIZE");
		let email_smtp_server = Self::get_env_var("EMAIL_SMTP_SERVER");
		let email_smtp_password = Self::get_env_var("EMAIL_SMTP_PASSWORD");

		let geocoding_url = Self::get_env_var("GEOCODING_URL");
		let geocoding_api_key = Self::get_env_var("GEOCODING_API_KEY");

		Self {
			database_url,
			jwt_secret,
			access_token_lifetime,
			refresh_token_lifetime,
			activation_token_lifetime,
			skip_activation,
			frontend_url,
			email_address,
			email_queue_size,
			email_smtp_server,
			email_smtp_password,
			geocoding_url,
			geocoding_api_key,
		}
	}

	/// Create a database pool for the given config
	///
	/// # Panics
	/// Panics if creating the pool fails
	#[must_use]
	pub fn create_database_pool(&self) -> DbPool {
		let manager = Manager::new(
			self.database_url.to_string(),
			deadpool_diesel::Runtime::Tokio1,
		);

		Pool::builder(manager).build().unwrap()
	}

	/// Create an in-memory mailbox if mails should not leave the process
	#[must_use]
	pub fn create_stub_mailbox(&self) -> Option<Arc<StubMailbox>> {
		(self.email_smtp_server == "stub")
			.then(|| Arc::new(StubMailbox::default()))
	}

	/// Create the geocoder configured for this environment
	///
	/// # Panics
	/// Panics if the geocoding HTTP client can not be built
	#[must_use]
	pub fn create_geocoder(&self) -> Geocoder {
		Geocoder::new(self).unwrap_or_else(|e| {
			panic!("failed to build the geocoding client -- {e:?}")
		})
	}
}
