#[macro_use]
extern crate tracing;

use common::{DbConn, Error};
use db::{CommentState, comment, post};
use diesel::pg::Pg;
use diesel::prelude::*;
use primitive_comment::{PrimitiveComment, check_rating};
use serde::{Deserialize, Serialize};

mod tree;

pub use tree::*;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Comment {
	pub primitive: PrimitiveComment,
}

impl From<PrimitiveComment> for Comment {
	fn from(primitive: PrimitiveComment) -> Self { Self { primitive } }
}

impl Comment {
	/// Get a [`Comment`] given its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(c_id: i32, conn: &DbConn) -> Result<Self, Error> {
		Ok(PrimitiveComment::get_by_id(c_id, conn).await?.into())
	}

	/// Build the reply tree for the post with the given id
	///
	/// # Errors
	/// Errors with [`Error::NotFound`] if the post does not exist
	#[instrument(skip(conn))]
	pub async fn tree_for_post(
		p_id: i32,
		conn: &DbConn,
	) -> Result<CommentTree, Error> {
		let comments = conn
			.interact(move |conn| {
				post::table.find(p_id).select(post::id).get_result::<i32>(conn)?;

				comment::table
					.filter(comment::post_id.eq(p_id))
					.order(comment::id)
					.select(PrimitiveComment::as_select())
					.get_results(conn)
			})
			.await??;

		Ok(CommentTree::build(comments))
	}

	/// Delete a [`Comment`] and all of its replies
	#[instrument(skip(conn))]
	pub async fn delete_by_id(c_id: i32, conn: &DbConn) -> Result<(), Error> {
		let count = conn
			.interact(move |conn| {
				use self::comment::dsl::*;

				diesel::delete(comment.find(c_id)).execute(conn)
			})
			.await??;

		if count == 0 {
			return Err(Error::NotFound(format!("comment with id {c_id}")));
		}

		info!("deleted comment with id {c_id}");

		Ok(())
	}
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = comment)]
#[diesel(check_for_backend(Pg))]
pub struct NewComment {
	pub author_id: i32,
	pub post_id:   i32,
	pub parent_id: Option<i32>,
	pub content:   String,
	pub rating:    i32,
}

impl NewComment {
	/// Insert this [`NewComment`]
	///
	/// # Errors
	/// Errors if the post does not exist, if the rating is out of range or if
	/// the parent comment belongs to another post
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<Comment, Error> {
		check_rating(self.rating)?;

		let new_comment = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					let target = post::table
						.find(self.post_id)
						.select(post::id)
						.get_result::<i32>(conn)
						.optional()?;

					if target.is_none() {
						return Err(Error::NotFound(format!(
							"post with id {}",
							self.post_id
						)));
					}

					if let Some(p_id) = self.parent_id {
						let parent_post = comment::table
							.find(p_id)
							.select(comment::post_id)
							.get_result::<i32>(conn)
							.optional()?;

						if parent_post != Some(self.post_id) {
							return Err(Error::ValidationError(format!(
								"parent comment {p_id} does not belong to post {}",
								self.post_id
							)));
						}
					}

					diesel::insert_into(comment::table)
						.values(self)
						.returning(PrimitiveComment::as_returning())
						.get_result(conn)
						.map_err(Into::into)
				})
			})
			.await??;

		info!(
			"author {} commented {} on post {}",
			new_comment.author_id, new_comment.id, new_comment.post_id
		);

		Ok(new_comment.into())
	}
}

#[derive(AsChangeset, Clone, Debug, Default, Deserialize, Serialize)]
#[diesel(table_name = comment)]
#[diesel(check_for_backend(Pg))]
pub struct CommentUpdate {
	pub content: Option<String>,
	pub rating:  Option<i32>,
	pub state:   Option<CommentState>,
}

impl CommentUpdate {
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.content.is_none() && self.rating.is_none() && self.state.is_none()
	}

	/// Apply this update to the [`Comment`] with the given id
	#[instrument(skip(conn))]
	pub async fn apply_to(
		self,
		c_id: i32,
		conn: &DbConn,
	) -> Result<Comment, Error> {
		if let Some(rating) = self.rating {
			check_rating(rating)?;
		}

		if self.is_empty() {
			return Comment::get_by_id(c_id, conn).await;
		}

		let updated = conn
			.interact(move |conn| {
				use self::comment::dsl::*;

				diesel::update(comment.find(c_id))
					.set(self)
					.returning(PrimitiveComment::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("updated comment {c_id}");

		Ok(updated.into())
	}
}
