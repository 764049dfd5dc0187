use diesel::BoxableExpression;
use diesel::pg::Pg;
use diesel::sql_types::{Bool, Nullable};

pub const QUERY_HARD_LIMIT: i64 = 100;

pub type BoxedCondition<S, T = Nullable<Bool>> =
	Box<dyn BoxableExpression<S, Pg, SqlType = T>>;

pub type PaginatedData<T> = (i64, T);

pub trait ToFilter<S> {
	type SqlType;

	fn to_filter(&self) -> BoxedCondition<S, Self::SqlType>;
}

#[derive(Clone, Copy, Debug)]
pub struct PaginationConfig {
	pub limit:  i64,
	pub offset: i64,
}

/// Build an `ILIKE` pattern matching any string that contains `text`
///
/// `%`, `_` and `\` in the input are escaped so they match literally
#[must_use]
pub fn contains_pattern(text: &str) -> String {
	let mut pattern = String::with_capacity(text.len() + 2);

	pattern.push('%');

	for c in text.chars() {
		if matches!(c, '%' | '_' | '\\') {
			pattern.push('\\');
		}

		pattern.push(c);
	}

	pattern.push('%');

	pattern
}
