#[macro_use]
extern crate tracing;

use common::{DbConn, Error};
use db::post_image;
use diesel::pg::Pg;
use diesel::prelude::*;
use primitive_image::PrimitivePostImage;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PostImage {
	pub primitive: PrimitivePostImage,
}

impl From<PrimitivePostImage> for PostImage {
	fn from(primitive: PrimitivePostImage) -> Self { Self { primitive } }
}

impl PostImage {
	/// Get a [`PostImage`] given its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(img_id: i32, conn: &DbConn) -> Result<Self, Error> {
		Ok(PrimitivePostImage::get_by_id(img_id, conn).await?.into())
	}

	/// Get all [`PostImage`]s of the post with the given id, oldest first
	#[instrument(skip(conn))]
	pub async fn get_for_post(
		p_id: i32,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let images = conn
			.interact(move |conn| {
				use self::post_image::dsl::*;

				post_image
					.filter(post_id.eq(p_id))
					.order(id)
					.select(PrimitivePostImage::as_select())
					.get_results(conn)
			})
			.await??
			.into_iter()
			.map(Into::into)
			.collect();

		Ok(images)
	}

	/// Delete a [`PostImage`] given its id
	#[instrument(skip(conn))]
	pub async fn delete_by_id(img_id: i32, conn: &DbConn) -> Result<(), Error> {
		PrimitivePostImage::delete_by_id(img_id, conn).await
	}
}

/// An image reference that is not attached to a post yet
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
	pub name:      String,
	pub image_url: String,
}

impl ImageRef {
	#[must_use]
	pub fn attach(self, author_id: i32, post_id: i32) -> NewPostImage {
		NewPostImage {
			author_id,
			post_id,
			name: self.name,
			image_url: self.image_url,
		}
	}
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = post_image)]
#[diesel(check_for_backend(Pg))]
pub struct NewPostImage {
	pub author_id: i32,
	pub post_id:   i32,
	pub name:      String,
	pub image_url: String,
}

impl NewPostImage {
	/// Insert this [`NewPostImage`]
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<PostImage, Error> {
		let image = conn
			.interact(move |conn| {
				use self::post_image::dsl::*;

				diesel::insert_into(post_image)
					.values(self)
					.returning(PrimitivePostImage::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("added image {} to post {}", image.id, image.post_id);

		Ok(image.into())
	}

	/// Insert a list of [`NewPostImage`]s on an already checked out
	/// connection
	///
	/// # Errors
	/// Errors if the insert fails
	pub fn bulk_insert(
		v: Vec<Self>,
		conn: &mut PgConnection,
	) -> QueryResult<Vec<PrimitivePostImage>> {
		use self::post_image::dsl::*;

		if v.is_empty() {
			return Ok(vec![]);
		}

		diesel::insert_into(post_image)
			.values(v)
			.returning(PrimitivePostImage::as_returning())
			.get_results(conn)
	}
}

#[derive(AsChangeset, Clone, Debug, Default, Deserialize, Serialize)]
#[diesel(table_name = post_image)]
#[diesel(check_for_backend(Pg))]
pub struct PostImageUpdate {
	pub name:      Option<String>,
	pub image_url: Option<String>,
}

impl PostImageUpdate {
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.name.is_none() && self.image_url.is_none()
	}

	/// Apply this update to the [`PostImage`] with the given id
	#[instrument(skip(conn))]
	pub async fn apply_to(
		self,
		img_id: i32,
		conn: &DbConn,
	) -> Result<PostImage, Error> {
		if self.is_empty() {
			return PostImage::get_by_id(img_id, conn).await;
		}

		let image = conn
			.interact(move |conn| {
				use self::post_image::dsl::*;

				diesel::update(post_image.find(img_id))
					.set(self)
					.returning(PrimitivePostImage::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("updated image {img_id}");

		Ok(image.into())
	}
}
