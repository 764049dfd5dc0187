use chrono::NaiveDateTime;
use image::{ImageRef, PostImage, PostImageUpdate};
use primitive_image::PrimitivePostImage;
use serde::{Deserialize, Serialize};
use validator_derive::Validate;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
	pub id:         i32,
	pub author_id:  i32,
	pub post_id:    i32,
	pub name:       String,
	pub image_url:  String,
	pub created_at: NaiveDateTime,
	pub updated_at: NaiveDateTime,
}

impl From<PrimitivePostImage> for ImageResponse {
	fn from(value: PrimitivePostImage) -> Self {
		Self {
			id:         value.id,
			author_id:  value.author_id,
			post_id:    value.post_id,
			name:       value.name,
			image_url:  value.image_url,
			created_at: value.created_at,
			updated_at: value.updated_at,
		}
	}
}

impl From<PostImage> for ImageResponse {
	fn from(value: PostImage) -> Self { value.primitive.into() }
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateImageRequest {
	#[validate(length(min = 1, max = 255, code = "name-length"))]
	pub name:      String,
	#[validate(url(message = "image url must be a valid url", code = "url"))]
	pub image_url: String,
}

impl From<CreateImageRequest> for ImageRef {
	fn from(value: CreateImageRequest) -> Self {
		Self { name: value.name, image_url: value.image_url }
	}
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateImageRequest {
	#[validate(length(min = 1, max = 255, code = "name-length"))]
	pub name:      Option<String>,
	#[validate(url(message = "image url must be a valid url", code = "url"))]
	pub image_url: Option<String>,
}

impl From<UpdateImageRequest> for PostImageUpdate {
	fn from(value: UpdateImageRequest) -> Self {
		Self { name: value.name, image_url: value.image_url }
	}
}
