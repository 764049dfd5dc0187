use axum::http::StatusCode;
use serde_json::json;
use webizcafe::schemas::pagination::PaginationResponse;
use webizcafe::schemas::post::PostResponse;

mod common;

use crate::common::{ALICE, BOB, TestEnv};

/// Ids of the posts returned for a query, in response order
async fn search(env: &TestEnv, query: &str) -> Vec<i32> {
	let response = env.app.get(&format!("/posts?{query}")).await;

	assert_eq!(response.status_code(), StatusCode::OK, "{}", response.text());

	response
		.json::<PaginationResponse<Vec<PostResponse>>>()
		.data
		.into_iter()
		.map(|p| p.id)
		.collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn create_post_reuses_location() {
	let env = TestEnv::new().await;

	let first = env.create_post(ALICE, json!({})).await;
	let second = env.create_post(BOB, json!({ "title": "second desk" })).await;

	assert_eq!(first.location.id, second.location.id);
	assert_eq!(first.location.address, "1 Chaoyang Road");
	assert_eq!(first.price.cents(), 5000);
	assert_eq!(second.author_id, BOB);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_post_with_images() {
	let env = TestEnv::new().await;

	let post = env
		.create_post(
			ALICE,
			json!({
				"images": [
					{ "name": "front", "imageUrl": "https://img.example.com/1.png" },
					{ "name": "back", "imageUrl": "https://img.example.com/2.png" },
				],
			}),
		)
		.await;

	assert_eq!(post.images.len(), 2);
	assert_eq!(post.images[0].name, "front");

	let response = env.app.get(&format!("/posts/{}/images", post.id)).await;

	assert_eq!(response.status_code(), StatusCode::OK);
	assert_eq!(response.json::<serde_json::Value>().as_array().unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_post_rejects_zero_capacity() {
	let env = TestEnv::new().await;

	let response = env
		.app
		.post("/posts")
		.authorization_bearer(env.token_for(ALICE))
		.json(&json!({
			"title": "broom closet",
			"price": "1",
			"capacity": 0,
			"city": "beijing",
			"location": { "address": "2 Chaoyang Road" },
		}))
		.await;

	assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test(flavor = "multi_thread")]
async fn filters_compose() {
	let env = TestEnv::new().await;

	let post = env.create_post(ALICE, json!({})).await;

	let matching = search(&env, "min_price=40&max_price=60&posttype=office,cafe").await;
	let too_cheap = search(&env, "min_price=60").await;
	let other_city = search(&env, "city=shanghai,guangzhou").await;
	let capacity = search(&env, "min_capacity=20&max_capacity=20&city=beijing").await;

	assert_eq!(matching, vec![post.id]);
	assert!(too_cheap.is_empty());
	assert!(other_city.is_empty());
	assert_eq!(capacity, vec![post.id]);
}

#[tokio::test(flavor = "multi_thread")]
async fn filtering_is_idempotent_and_ordered() {
	let env = TestEnv::new().await;

	let a = env.create_post(ALICE, json!({ "postType": "cafe" })).await;
	let b = env.create_post(ALICE, json!({ "postType": "office" })).await;
	let c = env.create_post(BOB, json!({ "postType": "cafe" })).await;

	let first = search(&env, "posttype=cafe,office").await;
	let second = search(&env, "posttype=cafe,office").await;

	assert_eq!(first, vec![c.id, b.id, a.id]);
	assert_eq!(first, second);

	let cafes = search(&env, "posttype=cafe").await;

	assert_eq!(cafes, vec![c.id, a.id]);
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_set_tokens_are_ignored() {
	let env = TestEnv::new().await;

	let post = env.create_post(ALICE, json!({})).await;

	assert_eq!(search(&env, "posttype=,,&city=").await, vec![post.id]);
	assert_eq!(search(&env, "unknown=key").await, vec![post.id]);
}

#[tokio::test(flavor = "multi_thread")]
async fn rating_filter_matches_any_comment() {
	let env = TestEnv::new().await;

	let post = env.create_post(ALICE, json!({})).await;

	for rating in [2, 9] {
		let response = env
			.app
			.post("/comments")
			.authorization_bearer(env.token_for(BOB))
			.json(&json!({
				"postId": post.id,
				"content": "nice view",
				"rating": rating,
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::CREATED);
	}

	assert_eq!(search(&env, "min_rating=8").await, vec![post.id]);
	assert!(search(&env, "min_rating=10").await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn search_looks_at_title_content_and_comments() {
	let env = TestEnv::new().await;

	let desk = env.create_post(ALICE, json!({ "title": "Sunny Desk" })).await;
	let room = env
		.create_post(ALICE, json!({ "title": "meeting room", "content": "" }))
		.await;

	let response = env
		.app
		.post("/comments")
		.authorization_bearer(env.token_for(BOB))
		.json(&json!({
			"postId": room.id,
			"content": "the projector is SUNNY bright",
			"rating": 7,
		}))
		.await;

	assert_eq!(response.status_code(), StatusCode::CREATED);

	assert_eq!(search(&env, "search=sunny").await.len(), 2);
	assert_eq!(search(&env, "search=desk").await, vec![desk.id]);
}

#[tokio::test(flavor = "multi_thread")]
async fn proximity_needs_all_parameters() {
	let env = TestEnv::new().await;

	let response = env.app.get("/posts?lat=39.9&lng=116.4").await;

	assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

	let post = env.create_post(ALICE, json!({})).await;

	// The stub geocoder places every address at the origin
	assert_eq!(search(&env, "lat=0&lng=0&radius=1").await, vec![post.id]);
	assert!(search(&env, "lat=39.9&lng=116.4&radius=10").await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn pagination_limits_results() {
	let env = TestEnv::new().await;

	for i in 0..3 {
		env.create_post(ALICE, json!({ "title": format!("desk {i}") })).await;
	}

	let response = env.app.get("/posts?page=2&perPage=2").await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let body = response.json::<PaginationResponse<Vec<PostResponse>>>();

	assert_eq!(body.total, 3);
	assert_eq!(body.data.len(), 1);
	assert_eq!(body.data[0].title, "desk 0");

	let response = env.app.get("/posts?perPage=51").await;

	assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread")]
async fn only_owner_modifies_post() {
	let env = TestEnv::new().await;

	let post = env.create_post(ALICE, json!({})).await;

	let response = env
		.app
		.patch(&format!("/posts/{}", post.id))
		.authorization_bearer(env.token_for(BOB))
		.json(&json!({ "title": "stolen" }))
		.await;

	assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

	let response = env
		.app
		.patch(&format!("/posts/{}", post.id))
		.authorization_bearer(env.token_for(ALICE))
		.json(&json!({
			"title": "renamed",
			"price": "60",
			"location": { "address": "9 Pudong Avenue" },
		}))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let updated = response.json::<PostResponse>();

	assert_eq!(updated.title, "renamed");
	assert_eq!(updated.price.cents(), 6000);
	assert_eq!(updated.location.address, "9 Pudong Avenue");

	let response = env
		.app
		.delete(&format!("/posts/{}", post.id))
		.authorization_bearer(env.token_for(BOB))
		.await;

	assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

	let response = env
		.app
		.delete(&format!("/posts/{}", post.id))
		.authorization_bearer(env.token_for(ALICE))
		.await;

	assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

	let response = env.app.get(&format!("/posts/{}", post.id)).await;

	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
