#[macro_use]
extern crate tracing;

use std::collections::HashMap;

use ::image::{ImageRef, NewPostImage};
use ::location::NewLocation;
use common::{DbConn, Error};
use db::{PostState, location, post, post_image};
use diesel::pg::Pg;
use diesel::prelude::*;
use models_common::{PaginatedData, PaginationConfig, ToFilter};
use primitive_image::PrimitivePostImage;
use primitive_location::PrimitiveLocation;
use primitive_post::{Price, PrimitivePost};
use serde::{Deserialize, Serialize};

mod filter;

pub use filter::*;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Post {
	pub primitive: PrimitivePost,
	pub location:  PrimitiveLocation,
	pub images:    Vec<PrimitivePostImage>,
}

impl Post {
	/// Stitch separately loaded locations and images onto their posts,
	/// keeping the order of `posts`
	fn assemble(
		posts: Vec<PrimitivePost>,
		locations: Vec<PrimitiveLocation>,
		images: Vec<PrimitivePostImage>,
	) -> Vec<Self> {
		let locations: HashMap<i32, PrimitiveLocation> =
			locations.into_iter().map(|l| (l.id, l)).collect();

		let mut images_by_post: HashMap<i32, Vec<PrimitivePostImage>> =
			HashMap::new();

		for image in images {
			images_by_post.entry(image.post_id).or_default().push(image);
		}

		posts
			.into_iter()
			.filter_map(|primitive| {
				let location = locations.get(&primitive.location_id)?.clone();
				let images =
					images_by_post.remove(&primitive.id).unwrap_or_default();

				Some(Self { primitive, location, images })
			})
			.collect()
	}

	/// Get a [`Post`] with its location and images given its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(p_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let (primitive, location, images) = conn
			.interact(move |conn| {
				let (primitive, location) = post::table
					.find(p_id)
					.inner_join(location::table)
					.select((
						PrimitivePost::as_select(),
						PrimitiveLocation::as_select(),
					))
					.get_result::<(PrimitivePost, PrimitiveLocation)>(conn)?;

				let images = post_image::table
					.filter(post_image::post_id.eq(p_id))
					.order(post_image::id)
					.select(PrimitivePostImage::as_select())
					.get_results(conn)?;

				Ok::<_, diesel::result::Error>((primitive, location, images))
			})
			.await??;

		Ok(Self { primitive, location, images })
	}

	/// Search through all [`Post`]s with a [`PostFilter`], most recently
	/// updated first
	#[instrument(skip(conn))]
	pub async fn search(
		post_filter: PostFilter,
		p_cfg: PaginationConfig,
		conn: &DbConn,
	) -> Result<PaginatedData<Vec<Self>>, Error> {
		post_filter.validate()?;

		let count_filter = post_filter.to_filter();
		let page_filter = post_filter.to_filter();

		let (total, posts, locations, images) = conn
			.interact(move |conn| {
				let total = post::table
					.filter(count_filter)
					.count()
					.get_result::<i64>(conn)?;

				let posts = post::table
					.filter(page_filter)
					.order((post::updated_at.desc(), post::id.desc()))
					.limit(p_cfg.limit)
					.offset(p_cfg.offset)
					.select(PrimitivePost::as_select())
					.get_results(conn)?;

				let l_ids: Vec<i32> = posts.iter().map(|p| p.location_id).collect();
				let p_ids: Vec<i32> = posts.iter().map(|p| p.id).collect();

				let locations = location::table
					.filter(location::id.eq_any(l_ids))
					.select(PrimitiveLocation::as_select())
					.get_results(conn)?;

				let images = post_image::table
					.filter(post_image::post_id.eq_any(p_ids))
					.order(post_image::id)
					.select(PrimitivePostImage::as_select())
					.get_results(conn)?;

				Ok::<_, diesel::result::Error>((total, posts, locations, images))
			})
			.await??;

		Ok((total, Self::assemble(posts, locations, images)))
	}

	/// Delete a [`Post`] given its id
	#[instrument(skip(conn))]
	pub async fn delete_by_id(p_id: i32, conn: &DbConn) -> Result<(), Error> {
		let count = conn
			.interact(move |conn| {
				use self::post::dsl::*;

				diesel::delete(post.find(p_id)).execute(conn)
			})
			.await??;

		if count == 0 {
			return Err(Error::NotFound(format!("post with id {p_id}")));
		}

		info!("deleted post with id {p_id}");

		Ok(())
	}
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = post)]
#[diesel(check_for_backend(Pg))]
struct InsertablePost {
	author_id:   i32,
	location_id: i32,
	title:       String,
	content:     String,
	price_cents: i64,
	capacity:    i32,
	city:        String,
	post_type:   String,
	state:       PostState,
}

/// A post together with the location and images it is created with
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewPost {
	pub author_id: i32,
	pub title:     String,
	pub content:   String,
	pub price:     Price,
	pub capacity:  i32,
	pub city:      String,
	pub post_type: String,
	pub state:     PostState,
	pub location:  NewLocation,
	pub images:    Vec<ImageRef>,
}

impl NewPost {
	/// Insert this [`NewPost`], reusing the stored location for its address
	/// if there is one
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<Post, Error> {
		let Self {
			author_id,
			title,
			content,
			price,
			capacity,
			city,
			post_type,
			state,
			location,
			images,
		} = self;

		let new_post = conn
			.interact(move |conn| {
				conn.transaction::<_, diesel::result::Error, _>(|conn| {
					let location = location.get_or_insert(conn)?;

					let primitive = diesel::insert_into(post::table)
						.values(InsertablePost {
							author_id,
							location_id: location.id,
							title,
							content,
							price_cents: price.cents(),
							capacity,
							city,
							post_type,
							state,
						})
						.returning(PrimitivePost::as_returning())
						.get_result(conn)?;

					let images = NewPostImage::bulk_insert(
						images
							.into_iter()
							.map(|i| i.attach(author_id, primitive.id))
							.collect(),
						conn,
					)?;

					Ok(Post { primitive, location, images })
				})
			})
			.await??;

		info!(
			"created post {} at location {}",
			new_post.primitive.id, new_post.location.id
		);

		Ok(new_post)
	}
}

#[derive(AsChangeset, Clone, Debug, Default, Deserialize, Serialize)]
#[diesel(table_name = post)]
#[diesel(check_for_backend(Pg))]
pub struct PostUpdate {
	pub location_id: Option<i32>,
	pub title:       Option<String>,
	pub content:     Option<String>,
	pub price_cents: Option<i64>,
	pub capacity:    Option<i32>,
	pub city:        Option<String>,
	pub post_type:   Option<String>,
	pub state:       Option<PostState>,
}

impl PostUpdate {
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.location_id.is_none()
			&& self.title.is_none()
			&& self.content.is_none()
			&& self.price_cents.is_none()
			&& self.capacity.is_none()
			&& self.city.is_none()
			&& self.post_type.is_none()
			&& self.state.is_none()
	}

	/// Apply this update to the [`Post`] with the given id
	#[instrument(skip(conn))]
	pub async fn apply_to(self, p_id: i32, conn: &DbConn) -> Result<Post, Error> {
		if !self.is_empty() {
			conn.interact(move |conn| {
				use self::post::dsl::*;

				diesel::update(post.find(p_id)).set(self).execute(conn)
			})
			.await??;

			info!("updated post {p_id}");
		}

		Post::get_by_id(p_id, conn).await
	}
}
