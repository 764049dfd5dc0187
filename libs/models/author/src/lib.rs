#[macro_use]
extern crate tracing;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Utc};
use common::{DbConn, Error, LoginError, TokenError};
use db::{author, booking, comment, post};
use diesel::pg::Pg;
use diesel::prelude::*;
use models_common::{PaginatedData, PaginationConfig};
use primitive_author::PrimitiveAuthor;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type JoinedAuthorData =
	(PrimitiveAuthor, Option<i64>, Option<i64>, Option<i64>);

/// Hash a plain text password with argon2 and a fresh salt
///
/// # Errors
/// Errors if hashing fails
pub fn hash_password(password: &str) -> Result<String, Error> {
	let salt = SaltString::generate(&mut OsRng);
	let hash = Argon2::default()
		.hash_password(password.as_bytes(), &salt)?
		.to_string();

	Ok(hash)
}

/// Generate a random one-time activation token
#[must_use]
pub fn generate_activation_token() -> String {
	Uuid::new_v4().simple().to_string()
}

#[derive(Clone, Debug, Serialize)]
pub struct Author {
	pub primitive:     PrimitiveAuthor,
	pub post_count:    i64,
	pub booking_count: i64,
	pub comment_count: i64,
}

impl Author {
	/// Construct a full [`Author`] struct from the data returned by a
	/// joined query
	fn from_joined(data: JoinedAuthorData) -> Self {
		Self {
			primitive:     data.0,
			post_count:    data.1.unwrap_or_default(),
			booking_count: data.2.unwrap_or_default(),
			comment_count: data.3.unwrap_or_default(),
		}
	}

	/// Get an [`Author`] given its id
	#[instrument(skip(conn))]
	pub async fn get(a_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let author = conn
			.interact(move |conn| {
				author::table
					.find(a_id)
					.select((
						PrimitiveAuthor::as_select(),
						post::table
							.filter(post::author_id.eq(author::id))
							.count()
							.single_value(),
						booking::table
							.filter(booking::author_id.eq(author::id))
							.count()
							.single_value(),
						comment::table
							.filter(comment::author_id.eq(author::id))
							.count()
							.single_value(),
					))
					.get_result::<JoinedAuthorData>(conn)
			})
			.await??;

		Ok(Self::from_joined(author))
	}

	/// Get an [`Author`] given its id, hiding deactivated authors
	#[instrument(skip(conn))]
	pub async fn get_active(a_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let author = Self::get(a_id, conn).await?;

		if !author.primitive.is_active {
			return Err(Error::NotFound(format!("author with id {a_id}")));
		}

		Ok(author)
	}

	/// Get a page of active [`Author`]s ordered by id
	#[instrument(skip(conn))]
	pub async fn get_all_active(
		p_cfg: PaginationConfig,
		conn: &DbConn,
	) -> Result<PaginatedData<Vec<Self>>, Error> {
		let (total, authors) = conn
			.interact(move |conn| {
				let total = author::table
					.filter(author::is_active.eq(true))
					.count()
					.get_result::<i64>(conn)?;

				let authors = author::table
					.filter(author::is_active.eq(true))
					.order(author::id)
					.limit(p_cfg.limit)
					.offset(p_cfg.offset)
					.select((
						PrimitiveAuthor::as_select(),
						post::table
							.filter(post::author_id.eq(author::id))
							.count()
							.single_value(),
						booking::table
							.filter(booking::author_id.eq(author::id))
							.count()
							.single_value(),
						comment::table
							.filter(comment::author_id.eq(author::id))
							.count()
							.single_value(),
					))
					.get_results::<JoinedAuthorData>(conn)?;

				Ok::<_, diesel::result::Error>((total, authors))
			})
			.await??;

		let authors = authors.into_iter().map(Self::from_joined).collect();

		Ok((total, authors))
	}

	/// Check whether an author exists and is active
	#[instrument(skip(conn))]
	pub async fn is_active(a_id: i32, conn: &DbConn) -> Result<bool, Error> {
		let active = conn
			.interact(move |conn| {
				use self::author::dsl::*;

				author
					.find(a_id)
					.select(is_active)
					.get_result::<bool>(conn)
					.optional()
			})
			.await??;

		Ok(active.unwrap_or(false))
	}

	/// Check the credentials of an author and record the login
	///
	/// # Errors
	/// Errors for unknown usernames, wrong passwords and inactive authors
	#[instrument(skip(password, conn))]
	pub async fn login(
		query_username: String,
		password: String,
		conn: &DbConn,
	) -> Result<PrimitiveAuthor, Error> {
		let lookup = query_username.clone();

		let found = conn
			.interact(move |conn| {
				use self::author::dsl::*;

				author
					.filter(username.eq(lookup))
					.select(PrimitiveAuthor::as_select())
					.first(conn)
					.optional()
			})
			.await??;

		let Some(found) = found else {
			return Err(LoginError::UnknownUsername(query_username).into());
		};

		verify_password(&found, &password)?;

		if !found.is_active {
			return Err(LoginError::Inactive.into());
		}

		let a_id = found.id;
		let now = Utc::now().naive_utc();

		let found = conn
			.interact(move |conn| {
				use self::author::dsl::*;

				diesel::update(author.find(a_id))
					.set(last_login.eq(now))
					.returning(PrimitiveAuthor::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("logged in author {a_id}");

		Ok(found)
	}

	/// Activate the author owning a one-time activation token
	///
	/// # Errors
	/// Errors if no author has this token or if the token expired
	#[instrument(skip(token, conn))]
	pub async fn activate(
		token: String,
		conn: &DbConn,
	) -> Result<PrimitiveAuthor, Error> {
		let found = conn
			.interact(move |conn| {
				use self::author::dsl::*;

				author
					.filter(activation_token.eq(token))
					.select(PrimitiveAuthor::as_select())
					.first(conn)
			})
			.await??;

		if !found.activation_token_valid_at(Utc::now().naive_utc()) {
			return Err(TokenError::ExpiredActivationToken.into());
		}

		let a_id = found.id;

		let activated = conn
			.interact(move |conn| {
				use self::author::dsl::*;

				diesel::update(author.find(a_id))
					.set((
						is_active.eq(true),
						activation_token.eq(None::<String>),
						activation_token_expiry.eq(None::<NaiveDateTime>),
					))
					.returning(PrimitiveAuthor::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("activated author {a_id}");

		Ok(activated)
	}

	/// Soft delete an author, `confirmation` must repeat its username
	///
	/// # Errors
	/// Errors with a validation error if the confirmation does not match
	#[instrument(skip(conn))]
	pub async fn deactivate(
		a_id: i32,
		confirmation: String,
		conn: &DbConn,
	) -> Result<(), Error> {
		let current = PrimitiveAuthor::get_by_id(a_id, conn).await?;

		if current.username != confirmation {
			return Err(Error::ValidationError(
				"username does not match".to_string(),
			));
		}

		conn.interact(move |conn| {
			use self::author::dsl::*;

			diesel::update(author.find(a_id))
				.set(is_active.eq(false))
				.execute(conn)
		})
		.await??;

		info!("deactivated author {a_id}");

		Ok(())
	}

	/// Replace the password of an author after checking the current one
	///
	/// # Errors
	/// Errors if the current password is wrong
	#[instrument(skip(current_password, new_password, conn))]
	pub async fn change_password(
		a_id: i32,
		current_password: String,
		new_password: String,
		conn: &DbConn,
	) -> Result<(), Error> {
		let current = PrimitiveAuthor::get_by_id(a_id, conn).await?;

		verify_password(&current, &current_password)?;

		let new_hash = hash_password(&new_password)?;

		conn.interact(move |conn| {
			use self::author::dsl::*;

			diesel::update(author.find(a_id))
				.set(password_hash.eq(new_hash))
				.execute(conn)
		})
		.await??;

		info!("changed password of author {a_id}");

		Ok(())
	}
}

/// Check a plain text password against the stored hash of an author
///
/// # Errors
/// Errors with [`LoginError::InvalidPassword`] on mismatch
pub fn verify_password(
	author: &PrimitiveAuthor,
	password: &str,
) -> Result<(), Error> {
	let hash = PasswordHash::new(&author.password_hash)?;

	Argon2::default().verify_password(password.as_bytes(), &hash)?;

	Ok(())
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = author)]
#[diesel(check_for_backend(Pg))]
pub struct NewAuthor {
	pub username:                String,
	pub email:                   String,
	#[serde(skip_serializing)]
	pub password_hash:           String,
	pub first_name:              String,
	pub last_name:               String,
	pub birthday:                Option<NaiveDate>,
	pub phone_number:            Option<String>,
	pub is_active:               bool,
	#[serde(skip_serializing)]
	pub activation_token:        Option<String>,
	pub activation_token_expiry: Option<NaiveDateTime>,
}

impl NewAuthor {
	/// Give this author a fresh activation token valid for `lifetime`
	#[must_use]
	pub fn with_activation_token(mut self, lifetime: TimeDelta) -> Self {
		self.activation_token = Some(generate_activation_token());
		self.activation_token_expiry = Some(Utc::now().naive_utc() + lifetime);

		self
	}

	/// Insert this [`NewAuthor`]
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<Author, Error> {
		let new_author = conn
			.interact(|conn| {
				use self::author::dsl::*;

				diesel::insert_into(author)
					.values(self)
					.returning(PrimitiveAuthor::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("created author {} ({})", new_author.username, new_author.id);

		let author = Author {
			primitive:     new_author,
			post_count:    0,
			booking_count: 0,
			comment_count: 0,
		};

		Ok(author)
	}
}

#[derive(AsChangeset, Clone, Debug, Deserialize, Serialize)]
#[diesel(table_name = author)]
#[diesel(check_for_backend(Pg))]
pub struct AuthorUpdate {
	pub email:        Option<String>,
	pub first_name:   Option<String>,
	pub last_name:    Option<String>,
	pub birthday:     Option<NaiveDate>,
	pub phone_number: Option<String>,
}

impl AuthorUpdate {
	fn is_empty(&self) -> bool {
		self.email.is_none()
			&& self.first_name.is_none()
			&& self.last_name.is_none()
			&& self.birthday.is_none()
			&& self.phone_number.is_none()
	}

	/// Apply this update to the [`Author`] with the given id
	#[instrument(skip(conn))]
	pub async fn apply_to(
		self,
		a_id: i32,
		conn: &DbConn,
	) -> Result<Author, Error> {
		if self.is_empty() {
			return Author::get(a_id, conn).await;
		}

		conn.interact(move |conn| {
			use self::author::dsl::*;

			diesel::update(author.find(a_id)).set(self).execute(conn)
		})
		.await??;

		info!("updated author with id {a_id}");

		Author::get(a_id, conn).await
	}
}
