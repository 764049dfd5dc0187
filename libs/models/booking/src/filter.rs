use chrono::NaiveDateTime;
use common::Error;
use db::booking;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use models_common::{BoxedCondition, ToFilter};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingFilter {
	pub post_id:   Option<i32>,
	pub author_id: Option<i32>,
	pub from:      Option<NaiveDateTime>,
	pub until:     Option<NaiveDateTime>,
}

impl BookingFilter {
	/// Reject empty or inverted query windows
	///
	/// # Errors
	/// Errors with a validation error if `from` is not before `until`
	pub fn validate(&self) -> Result<(), Error> {
		if let (Some(from), Some(until)) = (self.from, self.until)
			&& from >= until
		{
			return Err(Error::ValidationError(
				"from must be before until".to_string(),
			));
		}

		Ok(())
	}
}

impl<S> ToFilter<S> for BookingFilter
where
	S: 'static,
	booking::post_id: SelectableExpression<S>,
	booking::author_id: SelectableExpression<S>,
	booking::begin_at: SelectableExpression<S>,
	booking::end_at: SelectableExpression<S>,
{
	type SqlType = Bool;

	fn to_filter(&self) -> BoxedCondition<S, Self::SqlType> {
		let mut filter: BoxedCondition<S, Self::SqlType> =
			Box::new(true.into_sql::<Bool>());

		if let Some(p_id) = self.post_id {
			filter = Box::new(filter.and(booking::post_id.eq(p_id)));
		}

		if let Some(a_id) = self.author_id {
			filter = Box::new(filter.and(booking::author_id.eq(a_id)));
		}

		// Half-open [from, until) against [begin_at, end_at)
		if let Some(from) = self.from {
			filter = Box::new(filter.and(booking::end_at.gt(from)));
		}

		if let Some(until) = self.until {
			filter = Box::new(filter.and(booking::begin_at.lt(until)));
		}

		filter
	}
}
