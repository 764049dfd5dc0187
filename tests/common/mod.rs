use std::sync::Arc;

use axum_test::TestServer;
use chrono::TimeDelta;
use common::DbPool;
use axum::http::StatusCode;
use serde_json::{Value, json};
use webizcafe::mailer::{Mailer, StubMailbox};
use webizcafe::schemas::post::PostResponse;
use webizcafe::tokens::TokenPair;
use webizcafe::{AppState, Config, SeedAuthor, Seeder, routes};

pub mod wrappers;

mod mock_db;

use mock_db::{DATABASE_PROVIDER, DatabaseGuard};

/// Ids of the seeded authors, in the order of `seed/authors.json`
#[allow(dead_code)]
pub const ALICE: i32 = 1;
#[allow(dead_code)]
pub const BOB: i32 = 2;
#[allow(dead_code)]
pub const CAROL: i32 = 3;
#[allow(dead_code)]
pub const DAVE: i32 = 4;

#[allow(dead_code)]
pub struct TestEnv {
	pub app:          TestServer,
	pub config:       Config,
	pub pool:         DbPool,
	pub db_guard:     DatabaseGuard,
	pub stub_mailbox: Arc<StubMailbox>,
}

/// Configuration for tests, mails and geocoding never leave the process
pub fn test_config(database_url: String) -> Config {
	Config {
		database_url,
		jwt_secret: "webizcafe-test-secret".to_string(),
		access_token_lifetime: TimeDelta::minutes(15),
		refresh_token_lifetime: TimeDelta::days(1),
		activation_token_lifetime: TimeDelta::days(1),
		skip_activation: false,
		frontend_url: "http://localhost:3000/".parse().unwrap(),
		email_address: "noreply@webizcafe.test".parse().unwrap(),
		email_queue_size: 16,
		email_smtp_server: "stub".to_string(),
		email_smtp_password: String::new(),
		geocoding_url: "stub".to_string(),
		geocoding_api_key: String::new(),
	}
}

impl TestEnv {
	/// Get a test environment with a temporary database and stubbed mails
	///
	/// # Panics
	/// Panics if `DATABASE_URL` is not set, or if building a test server or
	/// seeding the database fails
	pub async fn new() -> Self {
		let database_url = std::env::var("DATABASE_URL")
			.expect("DATABASE_URL must be set to run the integration tests");

		let config = test_config(database_url);

		let test_pool_guard = (*DATABASE_PROVIDER).acquire().await;
		let test_pool = test_pool_guard.create_pool();

		{
			let conn = test_pool.get().await.unwrap();
			let mut seeder = Seeder::new(&conn);

			seeder
				.populate("seed/authors.json", async |conn, authors| {
					for author in authors {
						SeedAuthor::insert(author, conn).await?;
					}

					Ok(())
				})
				.await;
		}

		let stub_mailbox = config.create_stub_mailbox();
		let mailer = Mailer::new(&config, stub_mailbox.clone());
		let geocoder = config.create_geocoder();

		let state = AppState {
			config: config.clone(),
			database_pool: test_pool.clone(),
			mailer,
			geocoder,
		};
		let app = routes::get_app_router(state);

		let test_server = TestServer::builder().build(app).unwrap();

		TestEnv {
			app: test_server,
			config,
			pool: test_pool,
			db_guard: test_pool_guard,
			stub_mailbox: stub_mailbox.unwrap(),
		}
	}

	/// A valid access token for the given author
	#[allow(dead_code)]
	pub fn token_for(&self, author_id: i32) -> String {
		TokenPair::issue(author_id, &self.config).unwrap().access_token
	}

	/// Create a post as `author_id`, `overrides` replace the default fields
	#[allow(dead_code)]
	pub async fn create_post(
		&self,
		author_id: i32,
		overrides: Value,
	) -> PostResponse {
		let mut body = json!({
			"title": "quiet desk",
			"content": "a desk in a quiet office",
			"price": "50.00",
			"capacity": 20,
			"city": "beijing",
			"postType": "office",
			"state": "published",
			"location": { "address": "1 Chaoyang Road" },
		});

		if let (Some(body), Some(overrides)) =
			(body.as_object_mut(), overrides.as_object())
		{
			for (k, v) in overrides {
				body.insert(k.clone(), v.clone());
			}
		}

		let response = self
			.app
			.post("/posts")
			.authorization_bearer(self.token_for(author_id))
			.json(&body)
			.await;

		assert_eq!(response.status_code(), StatusCode::CREATED);

		response.json::<PostResponse>()
	}
}
