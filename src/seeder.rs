use std::path::PathBuf;

use ::author::hash_password;
use common::{DbConn, Error};
use db::author;
use diesel::prelude::*;
use serde::Deserialize;
use serde::de::DeserializeOwned;

pub struct Seeder<'c> {
	connection: &'c DbConn,
}

impl<'c> Seeder<'c> {
	pub fn new(connection: &'c DbConn) -> Self { Self { connection } }

	/// Read a file into a series of deserializable items
	///
	/// # Panics
	/// Panics if reading or deserializing the file fails
	fn read_file_records<T, I>(filename: &str) -> I
	where
		T: DeserializeOwned,
		I: IntoIterator<Item = T> + DeserializeOwned,
	{
		let path = std::env::var("CARGO_MANIFEST_DIR")
			.map(PathBuf::from)
			.unwrap_or_default()
			.join(filename);

		let s = std::fs::read_to_string(path)
			.unwrap_or_else(|_| panic!("COULD NOT READ SEED FILE {filename}"));

		serde_json::from_str(&s)
			.unwrap_or_else(|_| panic!("COULD NOT MAP SEED FILE {filename}"))
	}

	/// Load a file and populate the database with it
	///
	/// # Panics
	/// Panics if reading the file or interacting with the database fails
	pub async fn populate<'s, T, F>(
		&'s mut self,
		filename: &str,
		loader: F,
	) -> &'s mut Self
	where
		T: DeserializeOwned + std::fmt::Debug,
		F: AsyncFnOnce(&DbConn, Vec<T>) -> Result<(), Error>,
	{
		let records = Self::read_file_records(filename);

		loader(self.connection, records).await.unwrap_or_else(|e| {
			panic!("COULD NOT LOAD RECORDS FOR {filename} -- {e:?}")
		});

		info!("seeded database from {filename}");

		self
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedAuthor {
	pub username:   String,
	pub password:   String,
	pub email:      String,
	#[serde(default)]
	pub first_name: String,
	#[serde(default)]
	pub last_name:  String,
	#[serde(default = "active_default")]
	pub is_active:  bool,
}

const fn active_default() -> bool { true }

#[derive(Clone, Debug, Insertable, AsChangeset)]
#[diesel(table_name = author)]
struct InsertableSeedAuthor {
	username:      String,
	email:         String,
	password_hash: String,
	first_name:    String,
	last_name:     String,
	is_active:     bool,
}

impl SeedAuthor {
	/// Insert this [`SeedAuthor`], overwriting an author with the same
	/// username
	///
	/// # Errors
	/// Errors if hashing the password or inserting the author fails
	pub async fn insert(self, conn: &DbConn) -> Result<(), Error> {
		let insertable = InsertableSeedAuthor {
			password_hash: hash_password(&self.password)?,
			username:      self.username,
			email:         self.email,
			first_name:    self.first_name,
			last_name:     self.last_name,
			is_active:     self.is_active,
		};

		conn.interact(|conn| {
			use self::author::dsl::*;

			diesel::insert_into(author)
				.values(insertable.clone())
				.on_conflict(username)
				.do_update()
				.set(insertable)
				.execute(conn)
		})
		.await??;

		Ok(())
	}
}
