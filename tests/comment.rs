use axum::http::StatusCode;
use serde_json::json;
use webizcafe::schemas::comment::CommentResponse;

mod common;

use crate::common::{ALICE, BOB, CAROL, TestEnv};

impl TestEnv {
	async fn comment(
		&self,
		author_id: i32,
		post_id: i32,
		parent_id: Option<i32>,
	) -> CommentResponse {
		let response = self
			.app
			.post("/comments")
			.authorization_bearer(self.token_for(author_id))
			.json(&json!({
				"postId": post_id,
				"parentId": parent_id,
				"content": "good coffee",
				"rating": 8,
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::CREATED);

		response.json::<CommentResponse>()
	}
}

#[tokio::test(flavor = "multi_thread")]
async fn replies_are_nested() {
	let env = TestEnv::new().await;

	let post = env.create_post(ALICE, json!({})).await;

	let root = env.comment(BOB, post.id, None).await;
	let reply = env.comment(ALICE, post.id, Some(root.id)).await;
	let nested = env.comment(CAROL, post.id, Some(reply.id)).await;
	let other_root = env.comment(CAROL, post.id, None).await;

	let response = env.app.get(&format!("/posts/{}/comments", post.id)).await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let roots = response.json::<Vec<CommentResponse>>();

	assert_eq!(roots.len(), 2);
	assert_eq!(roots[0].id, root.id);
	assert_eq!(roots[1].id, other_root.id);
	assert_eq!(roots[1].children.as_deref().map(<[_]>::len), Some(0));

	let level_one = roots[0].children.clone().unwrap();

	assert_eq!(level_one.len(), 1);
	assert_eq!(level_one[0].id, reply.id);

	let level_two = level_one[0].children.clone().unwrap();

	assert_eq!(level_two.len(), 1);
	assert_eq!(level_two[0].id, nested.id);
	assert_eq!(level_two[0].parent_id, Some(reply.id));
}

#[tokio::test(flavor = "multi_thread")]
async fn comments_of_missing_post() {
	let env = TestEnv::new().await;

	let response = env.app.get("/posts/999/comments").await;

	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

	let response = env
		.app
		.post("/comments")
		.authorization_bearer(env.token_for(BOB))
		.json(&json!({ "postId": 999, "content": "hello", "rating": 5 }))
		.await;

	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn parent_must_belong_to_same_post() {
	let env = TestEnv::new().await;

	let first = env.create_post(ALICE, json!({})).await;
	let second = env.create_post(ALICE, json!({ "title": "other" })).await;

	let root = env.comment(BOB, first.id, None).await;

	let response = env
		.app
		.post("/comments")
		.authorization_bearer(env.token_for(BOB))
		.json(&json!({
			"postId": second.id,
			"parentId": root.id,
			"content": "wrong thread",
			"rating": 5,
		}))
		.await;

	assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test(flavor = "multi_thread")]
async fn rating_out_of_range() {
	let env = TestEnv::new().await;

	let post = env.create_post(ALICE, json!({})).await;

	for rating in [-1, 11] {
		let response = env
			.app
			.post("/comments")
			.authorization_bearer(env.token_for(BOB))
			.json(&json!({
				"postId": post.id,
				"content": "hmm",
				"rating": rating,
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
	}
}

#[tokio::test(flavor = "multi_thread")]
async fn only_author_edits_comment() {
	let env = TestEnv::new().await;

	let post = env.create_post(ALICE, json!({})).await;
	let comment = env.comment(BOB, post.id, None).await;

	let response = env
		.app
		.patch(&format!("/comments/{}", comment.id))
		.authorization_bearer(env.token_for(ALICE))
		.json(&json!({ "content": "edited" }))
		.await;

	assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

	let response = env
		.app
		.patch(&format!("/comments/{}", comment.id))
		.authorization_bearer(env.token_for(BOB))
		.json(&json!({ "content": "edited", "rating": 3 }))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let updated = response.json::<CommentResponse>();

	assert_eq!(updated.content, "edited");
	assert_eq!(updated.rating, 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn deleting_comment_removes_replies() {
	let env = TestEnv::new().await;

	let post = env.create_post(ALICE, json!({})).await;
	let root = env.comment(BOB, post.id, None).await;
	let reply = env.comment(CAROL, post.id, Some(root.id)).await;

	let response = env
		.app
		.delete(&format!("/comments/{}", root.id))
		.authorization_bearer(env.token_for(BOB))
		.await;

	assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

	let response = env.app.get(&format!("/comments/{}", reply.id)).await;

	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

	let response = env.app.get(&format!("/posts/{}/comments", post.id)).await;

	assert!(response.json::<Vec<CommentResponse>>().is_empty());
}
