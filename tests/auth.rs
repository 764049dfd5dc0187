use axum::http::StatusCode;
use diesel::prelude::*;
use serde_json::json;
use webizcafe::schemas::author::AuthorResponse;
use webizcafe::tokens::{Claims, TokenPair};

mod common;

use crate::common::{ALICE, DAVE, TestEnv};

#[tokio::test(flavor = "multi_thread")]
async fn register_sends_activation_mail() {
	let env = TestEnv::new().await;

	let response = env
		.expect_mail_to(&["erin@example.com"], async || {
			env.app
				.post("/auth/register")
				.json(&json!({
					"username": "erin",
					"password": "erinpassword",
					"email": "erin@example.com",
				}))
				.await
		})
		.await;

	assert_eq!(response.status_code(), StatusCode::CREATED);

	let body = response.json::<AuthorResponse>();

	assert_eq!(body.username, "erin");
	assert!(!body.is_active);
}

#[tokio::test(flavor = "multi_thread")]
async fn register_invalid_username() {
	let env = TestEnv::new().await;

	let response = env
		.expect_no_mail(async || {
			env.app
				.post("/auth/register")
				.json(&json!({
					"username": "1erin",
					"password": "erinpassword",
					"email": "erin@example.com",
				}))
				.await
		})
		.await;

	let body = response.text();

	assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
	assert!(body.contains("username must start with a letter"), "got: {body}");
}

#[tokio::test(flavor = "multi_thread")]
async fn register_duplicate_username() {
	let env = TestEnv::new().await;

	let response = env
		.expect_no_mail(async || {
			env.app
				.post("/auth/register")
				.json(&json!({
					"username": "alice",
					"password": "anotherpassword",
					"email": "alice2@example.com",
				}))
				.await
		})
		.await;

	assert_eq!(response.status_code(), StatusCode::CONFLICT);
	assert!(response.text().contains("username is already in use"));
}

#[tokio::test(flavor = "multi_thread")]
async fn activate_registered_author() {
	let env = TestEnv::new().await;

	env.expect_mail_to(&["erin@example.com"], async || {
		env.app
			.post("/auth/register")
			.json(&json!({
				"username": "erin",
				"password": "erinpassword",
				"email": "erin@example.com",
			}))
			.await
	})
	.await;

	let conn = env.pool.get().await.unwrap();
	let token = conn
		.interact(|conn| {
			use db::author::dsl::*;

			author
				.filter(username.eq("erin"))
				.select(activation_token)
				.get_result::<Option<String>>(conn)
		})
		.await
		.unwrap()
		.unwrap()
		.unwrap();

	let response = env.app.get(&format!("/auth/activate/{token}")).await;

	assert_eq!(response.status_code(), StatusCode::OK);
	assert!(response.json::<AuthorResponse>().is_active);

	let response = env.app.get(&format!("/auth/activate/{token}")).await;

	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn login_and_get_current_author() {
	let env = TestEnv::new().await;

	let response = env
		.app
		.post("/auth/token")
		.json(&json!({ "username": "alice", "password": "alicepassword" }))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let tokens = response.json::<TokenPair>();

	assert_eq!(tokens.token_type, "Bearer");

	let response = env
		.app
		.get("/authors/me")
		.authorization_bearer(&tokens.access_token)
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);
	assert_eq!(response.json::<AuthorResponse>().username, "alice");
}

#[tokio::test(flavor = "multi_thread")]
async fn login_wrong_password() {
	let env = TestEnv::new().await;

	let response = env
		.app
		.post("/auth/token")
		.json(&json!({ "username": "alice", "password": "wrongpassword" }))
		.await;

	assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test(flavor = "multi_thread")]
async fn login_inactive_author() {
	let env = TestEnv::new().await;

	let response = env
		.app
		.post("/auth/token")
		.json(&json!({ "username": "dave", "password": "davepassword" }))
		.await;

	assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
	assert!(response.text().contains("author is not active"));
}

#[tokio::test(flavor = "multi_thread")]
async fn protected_route_needs_token() {
	let env = TestEnv::new().await;

	let response = env.app.get("/authors/me").await;

	assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

	let response =
		env.app.get("/authors/me").authorization_bearer("garbage").await;

	assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test(flavor = "multi_thread")]
async fn inactive_author_token_is_refused() {
	let env = TestEnv::new().await;

	let response = env
		.app
		.get("/authors/me")
		.authorization_bearer(env.token_for(DAVE))
		.await;

	assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test(flavor = "multi_thread")]
async fn refresh_and_verify_tokens() {
	let env = TestEnv::new().await;

	let tokens = TokenPair::issue(ALICE, &env.config).unwrap();

	let response = env
		.app
		.post("/auth/token/refresh")
		.json(&json!({ "refreshToken": tokens.refresh_token }))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let response = env
		.app
		.post("/auth/token/refresh")
		.json(&json!({ "refreshToken": tokens.access_token }))
		.await;

	assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

	let response = env
		.app
		.post("/auth/token/verify")
		.json(&json!({ "token": tokens.access_token }))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);
	assert_eq!(response.json::<Claims>().sub, ALICE.to_string());
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_current_author_deactivates() {
	let env = TestEnv::new().await;

	let token = env.token_for(ALICE);

	let response = env
		.app
		.delete("/authors/me")
		.authorization_bearer(&token)
		.json(&json!({ "username": "bob" }))
		.await;

	assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

	let response = env
		.app
		.delete("/authors/me")
		.authorization_bearer(&token)
		.json(&json!({ "username": "alice" }))
		.await;

	assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

	let response = env.app.get("/authors/me").authorization_bearer(&token).await;

	assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

	let response = env.app.get(&format!("/authors/{ALICE}")).await;

	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn change_password_checks_current_password() {
	let env = TestEnv::new().await;

	let token = env.token_for(ALICE);

	let response = env
		.app
		.post("/authors/me/change-password")
		.authorization_bearer(&token)
		.json(&json!({
			"currentPassword": "notmypassword",
			"newPassword": "alicenewpassword",
		}))
		.await;

	assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

	let response = env
		.app
		.post("/authors/me/change-password")
		.authorization_bearer(&token)
		.json(&json!({
			"currentPassword": "alicepassword",
			"newPassword": "alicenewpassword",
		}))
		.await;

	assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

	let response = env
		.app
		.post("/auth/token")
		.json(&json!({ "username": "alice", "password": "alicenewpassword" }))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread")]
async fn list_authors_hides_inactive() {
	let env = TestEnv::new().await;

	let response = env.app.get("/authors?perPage=50").await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let body = response.json::<serde_json::Value>();

	assert_eq!(body["total"], 3);
	assert!(
		body["data"]
			.as_array()
			.unwrap()
			.iter()
			.all(|a| a["username"] != "dave")
	);
}
