use chrono::NaiveDateTime;
use comment::{Comment, CommentUpdate, NewComment};
use db::CommentState;
use primitive_comment::PrimitiveComment;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator_derive::Validate;

#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
	pub id:         i32,
	pub author_id:  i32,
	pub post_id:    i32,
	pub parent_id:  Option<i32>,
	pub content:    String,
	pub rating:     i32,
	pub state:      CommentState,
	pub created_at: NaiveDateTime,
	pub updated_at: NaiveDateTime,
	/// Replies, only present when the comment is part of a tree
	pub children:   Option<Vec<CommentResponse>>,
}

impl From<PrimitiveComment> for CommentResponse {
	fn from(value: PrimitiveComment) -> Self {
		Self {
			id:         value.id,
			author_id:  value.author_id,
			post_id:    value.post_id,
			parent_id:  value.parent_id,
			content:    value.content,
			rating:     value.rating,
			state:      value.state,
			created_at: value.created_at,
			updated_at: value.updated_at,
			children:   None,
		}
	}
}

impl From<Comment> for CommentResponse {
	fn from(value: Comment) -> Self { value.primitive.into() }
}

impl CommentResponse {
	/// Response for a comment that is part of a tree, `children` are its
	/// already converted replies
	#[must_use]
	pub fn with_replies(
		comment: &PrimitiveComment,
		children: Vec<Self>,
	) -> Self {
		Self { children: Some(children), ..comment.clone().into() }
	}
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
	pub post_id:   i32,
	pub parent_id: Option<i32>,
	#[validate(length(
		min = 1,
		max = 2048,
		message = "comment must be between 1 and 2048 characters long",
		code = "content-length"
	))]
	pub content:   String,
	#[validate(range(
		min = 0,
		max = 10,
		message = "rating must be between 0 and 10",
		code = "rating-range"
	))]
	pub rating:    i32,
}

impl CreateCommentRequest {
	#[must_use]
	pub fn to_insertable(self, author_id: i32) -> NewComment {
		NewComment {
			author_id,
			post_id: self.post_id,
			parent_id: self.parent_id,
			content: self.content,
			rating: self.rating,
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct UpdateCommentRequest {
	#[validate(length(min = 1, max = 2048, code = "content-length"))]
	pub content: Option<String>,
	#[validate(range(min = 0, max = 10, code = "rating-range"))]
	pub rating:  Option<i32>,
	pub state:   Option<CommentState>,
}

impl From<UpdateCommentRequest> for CommentUpdate {
	fn from(value: UpdateCommentRequest) -> Self {
		Self { content: value.content, rating: value.rating, state: value.state }
	}
}
