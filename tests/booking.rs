use std::future::IntoFuture;

use axum::http::StatusCode;
use serde_json::{Value, json};
use webizcafe::schemas::booking::BookingResponse;
use webizcafe::schemas::pagination::PaginationResponse;

mod common;

use crate::common::{ALICE, BOB, CAROL, TestEnv};

fn window(begin: &str, end: &str) -> (String, String) {
	(format!("2024-03-01T{begin}:00"), format!("2024-03-01T{end}:00"))
}

impl TestEnv {
	async fn propose(
		&self,
		author_id: i32,
		post_id: i32,
		begin: &str,
		end: &str,
	) -> axum_test::TestResponse {
		let (begin, end) = window(begin, end);

		self.app
			.post("/bookings")
			.authorization_bearer(self.token_for(author_id))
			.json(&json!({
				"postId": post_id,
				"title": "team meeting",
				"begin": begin,
				"end": end,
			}))
			.await
	}

	async fn set_status(
		&self,
		author_id: i32,
		booking_id: i32,
		status: &str,
	) -> axum_test::TestResponse {
		self.app
			.post(&format!("/bookings/{booking_id}/status"))
			.authorization_bearer(self.token_for(author_id))
			.json(&json!({ "status": status }))
			.await
	}
}

#[tokio::test(flavor = "multi_thread")]
async fn approved_booking_blocks_overlap() {
	let env = TestEnv::new().await;

	let post = env.create_post(ALICE, json!({})).await;

	let response = env.propose(BOB, post.id, "10:00", "11:00").await;

	assert_eq!(response.status_code(), StatusCode::CREATED);

	let booking = response.json::<BookingResponse>();

	assert_eq!(booking.state.to_string(), "proposed");

	let response = env.set_status(ALICE, booking.id, "approved").await;

	assert_eq!(response.status_code(), StatusCode::OK);
	assert_eq!(response.json::<BookingResponse>().state.to_string(), "approved");

	let response = env.propose(CAROL, post.id, "10:30", "11:30").await;

	assert_eq!(response.status_code(), StatusCode::CONFLICT);

	let body = response.json::<Value>();
	let info: Value =
		serde_json::from_str(body["info"].as_str().unwrap()).unwrap();

	assert_eq!(info["id"], booking.id);

	let response = env.propose(CAROL, post.id, "11:00", "12:00").await;

	assert_eq!(response.status_code(), StatusCode::CREATED);
}

#[tokio::test(flavor = "multi_thread")]
async fn proposals_block_each_other() {
	let env = TestEnv::new().await;

	let post = env.create_post(ALICE, json!({})).await;

	let first = env.propose(BOB, post.id, "09:00", "10:00").await;

	assert_eq!(first.status_code(), StatusCode::CREATED);

	let second = env.propose(CAROL, post.id, "09:59", "10:30").await;

	assert_eq!(second.status_code(), StatusCode::CONFLICT);

	// Cancelled bookings free their window again
	let booking = first.json::<BookingResponse>();
	let response = env.set_status(BOB, booking.id, "cancelled").await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let third = env.propose(CAROL, post.id, "09:59", "10:30").await;

	assert_eq!(third.status_code(), StatusCode::CREATED);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_proposals_admit_one() {
	let env = TestEnv::new().await;

	let post = env.create_post(ALICE, json!({})).await;
	let (begin, end) = window("14:00", "15:00");

	let body = json!({ "postId": post.id, "begin": begin, "end": end });

	let a = env
		.app
		.post("/bookings")
		.authorization_bearer(env.token_for(BOB))
		.json(&body);
	let b = env
		.app
		.post("/bookings")
		.authorization_bearer(env.token_for(CAROL))
		.json(&body);

	let (a, b) = tokio::join!(a.into_future(), b.into_future());

	let mut codes = [a.status_code(), b.status_code()];
	codes.sort();

	assert_eq!(codes, [StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[tokio::test(flavor = "multi_thread")]
async fn rejects_invalid_windows_and_posts() {
	let env = TestEnv::new().await;

	let post = env.create_post(ALICE, json!({})).await;

	let response = env.propose(BOB, post.id, "10:00", "10:00").await;

	assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

	let response = env.propose(BOB, post.id, "11:00", "10:00").await;

	assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

	let response = env.propose(BOB, 999, "10:00", "11:00").await;

	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

	let closed = env.create_post(ALICE, json!({ "state": "closed" })).await;
	let response = env.propose(BOB, closed.id, "10:00", "11:00").await;

	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn status_changes_are_guarded() {
	let env = TestEnv::new().await;

	let post = env.create_post(ALICE, json!({})).await;
	let booking = env
		.propose(BOB, post.id, "10:00", "11:00")
		.await
		.json::<BookingResponse>();

	let response = env.set_status(CAROL, booking.id, "approved").await;

	assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

	let response = env.set_status(ALICE, booking.id, "rejected").await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let response = env.set_status(ALICE, booking.id, "approved").await;

	assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

	let response = env.set_status(ALICE, 999, "approved").await;

	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn search_bookings_by_window() {
	let env = TestEnv::new().await;

	let post = env.create_post(ALICE, json!({})).await;

	let morning = env
		.propose(BOB, post.id, "08:00", "09:00")
		.await
		.json::<BookingResponse>();
	let noon = env
		.propose(CAROL, post.id, "12:00", "13:00")
		.await
		.json::<BookingResponse>();

	let (from, until) = window("08:30", "12:00");

	let response = env
		.app
		.get(&format!("/bookings?postId={}&from={from}&until={until}", post.id))
		.authorization_bearer(env.token_for(ALICE))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let body = response.json::<PaginationResponse<Vec<BookingResponse>>>();

	assert_eq!(body.total, 1);
	assert_eq!(body.data[0].id, morning.id);

	let response = env
		.app
		.get(&format!("/bookings?authorId={CAROL}"))
		.authorization_bearer(env.token_for(ALICE))
		.await;

	let body = response.json::<PaginationResponse<Vec<BookingResponse>>>();

	assert_eq!(body.total, 1);
	assert_eq!(body.data[0].id, noon.id);

	let response = env
		.app
		.get(&format!("/bookings?from={until}&until={from}"))
		.authorization_bearer(env.token_for(ALICE))
		.await;

	assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

	let response = env.app.get("/bookings").await;

	assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}
