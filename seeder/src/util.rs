use std::collections::HashSet;

use clap::Error;
use clap::error::ErrorKind;
use common::DbConn;
use diesel::PgConnection;
use rand::distr::Alphanumeric;
use rand::{Rng, rng};

/// Generate `count` distinct strings, suffixing every generated value with a
/// short random tag
pub fn generate_unique_set<F>(count: usize, mut f: F) -> Vec<String>
where
	F: FnMut() -> String,
{
	let mut set = HashSet::with_capacity(count);
	let mut rng = rng();

	while set.len() < count {
		let mut value = f();
		value.push('_');
		value.extend((0..6).map(|_| rng.sample(Alphanumeric) as char));
		set.insert(value);
	}

	set.into_iter().collect()
}

/// Wrap any displayable failure as an IO error of the command line
pub fn io_error(err: impl std::fmt::Display) -> Error {
	Error::raw(ErrorKind::Io, format!("{err}\n"))
}

/// Insert `items` in chunks, collecting the ids the inserter returns
pub async fn batch_insert<T, F>(
	conn: &DbConn,
	label: &str,
	mut items: Vec<T>,
	chunk_size: usize,
	inserter: F,
) -> Result<Vec<i32>, Error>
where
	T: Send + 'static,
	F: Fn(&mut PgConnection, Vec<T>) -> Result<Vec<i32>, diesel::result::Error>
		+ Send
		+ Copy
		+ 'static,
{
	let size = items.len();
	let mut ids = Vec::with_capacity(size);

	while !items.is_empty() {
		let chunk =
			items.drain(..chunk_size.min(items.len())).collect::<Vec<_>>();
		let chunk_len = chunk.len();

		let inserted = conn
			.interact(move |c| inserter(c, chunk))
			.await
			.map_err(io_error)?
			.map_err(io_error)?;

		if inserted.len() != chunk_len {
			return Err(io_error(format!(
				"inserted {} {label} but expected {chunk_len}",
				inserted.len()
			)));
		}

		ids.extend(inserted);

		println!("Inserted {}/{size} {label}", ids.len());
	}

	Ok(ids)
}
