use chrono::NaiveDateTime;
use db::PostState;
use image::ImageRef;
use location::NewLocation;
use post::{NewPost, Post, PostUpdate};
use primitive_post::Price;
use serde::{Deserialize, Serialize};
use validator::Validate;
use validator_derive::Validate;

use crate::schemas::image::{CreateImageRequest, ImageResponse};
use crate::schemas::location::{CreateLocationRequest, LocationResponse};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
	pub id:         i32,
	pub author_id:  i32,
	pub title:      String,
	pub content:    String,
	pub price:      Price,
	pub capacity:   i32,
	pub city:       String,
	pub post_type:  String,
	pub state:      PostState,
	pub location:   LocationResponse,
	pub images:     Vec<ImageResponse>,
	pub created_at: NaiveDateTime,
	pub updated_at: NaiveDateTime,
}

impl From<Post> for PostResponse {
	fn from(value: Post) -> Self {
		let primitive = value.primitive;

		Self {
			id:         primitive.id,
			author_id:  primitive.author_id,
			price:      primitive.price(),
			title:      primitive.title,
			content:    primitive.content,
			capacity:   primitive.capacity,
			city:       primitive.city,
			post_type:  primitive.post_type,
			state:      primitive.state,
			location:   value.location.into(),
			images:     value.images.into_iter().map(Into::into).collect(),
			created_at: primitive.created_at,
			updated_at: primitive.updated_at,
		}
	}
}

fn post_type_default() -> String { "office".to_string() }

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
	#[validate(length(
		min = 1,
		max = 255,
		message = "title must be between 1 and 255 characters long",
		code = "title-length"
	))]
	pub title:     String,
	#[serde(default)]
	pub content:   String,
	pub price:     Price,
	#[validate(range(
		min = 1,
		message = "capacity must be at least 1",
		code = "capacity-range"
	))]
	pub capacity:  i32,
	#[validate(length(min = 1, max = 64, code = "city-length"))]
	pub city:      String,
	#[serde(default = "post_type_default")]
	#[validate(length(min = 1, max = 64, code = "post-type-length"))]
	pub post_type: String,
	pub state:     Option<PostState>,
	#[validate(nested)]
	pub location:  CreateLocationRequest,
	#[serde(default)]
	#[validate(nested)]
	pub images:    Vec<CreateImageRequest>,
}

impl CreatePostRequest {
	/// Turn this request into a [`NewPost`] once its address is geocoded
	#[must_use]
	pub fn to_insertable(self, author_id: i32, location: NewLocation) -> NewPost {
		NewPost {
			author_id,
			title: self.title,
			content: self.content,
			price: self.price,
			capacity: self.capacity,
			city: self.city,
			post_type: self.post_type,
			state: self.state.unwrap_or_default(),
			location,
			images: self.images.into_iter().map(ImageRef::from).collect(),
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
	#[validate(length(min = 1, max = 255, code = "title-length"))]
	pub title:     Option<String>,
	pub content:   Option<String>,
	pub price:     Option<Price>,
	#[validate(range(min = 1, code = "capacity-range"))]
	pub capacity:  Option<i32>,
	#[validate(length(min = 1, max = 64, code = "city-length"))]
	pub city:      Option<String>,
	#[validate(length(min = 1, max = 64, code = "post-type-length"))]
	pub post_type: Option<String>,
	pub state:     Option<PostState>,
	#[validate(nested)]
	pub location:  Option<CreateLocationRequest>,
}

impl UpdatePostRequest {
	/// Turn this request into a [`PostUpdate`], `location_id` is the id of
	/// the already resolved new location if any
	#[must_use]
	pub fn to_update(self, location_id: Option<i32>) -> PostUpdate {
		PostUpdate {
			location_id,
			title: self.title,
			content: self.content,
			price_cents: self.price.map(Price::cents),
			capacity: self.capacity,
			city: self.city,
			post_type: self.post_type,
			state: self.state,
		}
	}
}
