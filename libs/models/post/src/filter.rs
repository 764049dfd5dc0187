use chrono::NaiveDateTime;
use common::Error;
use db::{comment, location, post};
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use ::location::within_radius;
use models_common::{BoxedCondition, ToFilter, contains_pattern};
use primitive_location::GeoPoint;
use primitive_post::Price;
use serde::{Deserialize, Serialize};
use serde_with::formats::CommaSeparator;
use serde_with::{StringWithSeparator, serde_as};

/// Optional search predicates over posts, combined with `AND`
#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PostFilter {
	#[serde_as(as = "Option<StringWithSeparator<CommaSeparator, String>>")]
	pub posttype:       Option<Vec<String>>,
	#[serde_as(as = "Option<StringWithSeparator<CommaSeparator, String>>")]
	pub city:           Option<Vec<String>>,
	pub min_price:      Option<Price>,
	pub max_price:      Option<Price>,
	pub min_capacity:   Option<i32>,
	pub max_capacity:   Option<i32>,
	pub min_rating:     Option<i32>,
	pub latest_updated: Option<NaiveDateTime>,
	pub search:         Option<String>,
	pub lat:            Option<f64>,
	pub lng:            Option<f64>,
	pub radius:         Option<f64>,
}

/// Trim the members of a set filter and drop empty ones, an empty set is
/// no filter at all
fn normalize_set(values: Option<&[String]>) -> Option<Vec<String>> {
	let set: Vec<String> = values?
		.iter()
		.map(|v| v.trim())
		.filter(|v| !v.is_empty())
		.map(ToString::to_string)
		.collect();

	(!set.is_empty()).then_some(set)
}

impl PostFilter {
	#[must_use]
	pub fn post_types(&self) -> Option<Vec<String>> {
		normalize_set(self.posttype.as_deref())
	}

	#[must_use]
	pub fn cities(&self) -> Option<Vec<String>> {
		normalize_set(self.city.as_deref())
	}

	/// The trimmed search text, if there is any
	#[must_use]
	pub fn search_text(&self) -> Option<&str> {
		self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
	}

	/// The point and radius to search around, only set when all three
	/// parameters are present
	#[must_use]
	pub fn proximity(&self) -> Option<(GeoPoint, f64)> {
		match (self.lat, self.lng, self.radius) {
			(Some(lat), Some(lng), Some(radius)) => {
				Some((GeoPoint { lat, lng }, radius))
			},
			_ => None,
		}
	}

	/// Reject filters that can not be turned into a meaningful query
	///
	/// # Errors
	/// Errors if only part of the proximity parameters are given or if the
	/// radius is negative
	pub fn validate(&self) -> Result<(), Error> {
		let given = [self.lat, self.lng, self.radius]
			.iter()
			.filter(|v| v.is_some())
			.count();

		if given != 0 && given != 3 {
			return Err(Error::ValidationError(
				"lat, lng and radius must be given together".to_string(),
			));
		}

		if let Some((_, radius)) = self.proximity()
			&& (radius.is_nan() || radius < 0.0)
		{
			return Err(Error::ValidationError(
				"radius must not be negative".to_string(),
			));
		}

		Ok(())
	}
}

impl ToFilter<post::table> for PostFilter {
	type SqlType = Bool;

	fn to_filter(&self) -> BoxedCondition<post::table, Self::SqlType> {
		let mut filter: BoxedCondition<post::table, Self::SqlType> =
			Box::new(true.into_sql::<Bool>());

		if let Some(types) = self.post_types() {
			filter = Box::new(filter.and(post::post_type.eq_any(types)));
		}

		if let Some(cities) = self.cities() {
			filter = Box::new(filter.and(post::city.eq_any(cities)));
		}

		if let Some(min) = self.min_price {
			filter = Box::new(filter.and(post::price_cents.ge(min.cents())));
		}

		if let Some(max) = self.max_price {
			filter = Box::new(filter.and(post::price_cents.le(max.cents())));
		}

		if let Some(min) = self.min_capacity {
			filter = Box::new(filter.and(post::capacity.ge(min)));
		}

		if let Some(max) = self.max_capacity {
			filter = Box::new(filter.and(post::capacity.le(max)));
		}

		if let Some(rating) = self.min_rating {
			filter = Box::new(filter.and(exists(
				comment::table
					.filter(comment::post_id.eq(post::id))
					.filter(comment::rating.ge(rating))
					.select(comment::id),
			)));
		}

		if let Some(since) = self.latest_updated {
			filter = Box::new(filter.and(post::updated_at.ge(since)));
		}

		if let Some(text) = self.search_text() {
			let pattern = contains_pattern(text);

			filter = Box::new(
				filter.and(
					post::title
						.ilike(pattern.clone())
						.or(post::content.ilike(pattern.clone()))
						.or(exists(
							comment::table
								.filter(comment::post_id.eq(post::id))
								.filter(comment::content.ilike(pattern))
								.select(comment::id),
						)),
				),
			);
		}

		if let Some((center, km)) = self.proximity() {
			filter = Box::new(
				filter.and(
					post::location_id.eq_any(
						location::table
							.filter(within_radius(center, km))
							.select(location::id),
					),
				),
			);
		}

		filter
	}
}

#[cfg(test)]
mod tests {
	use diesel::debug_query;
	use diesel::pg::Pg;

	use super::*;

	fn render(filter: &PostFilter) -> String {
		let query = post::table.filter(filter.to_filter()).select(post::id);

		debug_query::<Pg, _>(&query).to_string()
	}

	#[test]
	fn set_filters_drop_empty_tokens() {
		let filter: PostFilter =
			serde_json::from_value(serde_json::json!({
				"posttype": "office,,cafe, ",
				"city": ",",
			}))
			.unwrap();

		assert_eq!(
			filter.post_types(),
			Some(vec!["office".to_string(), "cafe".to_string()])
		);
		assert_eq!(filter.cities(), None);
	}

	#[test]
	fn empty_filter_keeps_everything() {
		let sql = render(&PostFilter::default());

		assert!(!sql.contains("\"post\".\"city\""));
		assert!(!sql.contains("EXISTS"));
		assert!(!sql.contains("ILIKE"));
	}

	#[test]
	fn unknown_keys_are_ignored() {
		let filter: PostFilter =
			serde_json::from_value(serde_json::json!({
				"colour": "blue",
				"min_capacity": 3,
			}))
			.unwrap();

		assert_eq!(filter.min_capacity, Some(3));
	}

	#[test]
	fn prices_are_compared_in_cents() {
		let filter = PostFilter {
			min_price: Some(Price::from_cents(4000)),
			max_price: Some(Price::from_cents(6000)),
			..Default::default()
		};

		let sql = render(&filter);

		assert!(sql.contains("\"post\".\"price_cents\" >= $"));
		assert!(sql.contains("\"post\".\"price_cents\" <= $"));
		assert!(sql.contains("4000"));
		assert!(sql.contains("6000"));
	}

	#[test]
	fn rating_uses_any_comment() {
		let filter =
			PostFilter { min_rating: Some(4), ..Default::default() };

		let sql = render(&filter);

		assert!(sql.contains("EXISTS"));
		assert!(sql.contains("\"comment\".\"rating\" >= $"));
	}

	#[test]
	fn search_covers_title_content_and_comments() {
		let filter = PostFilter {
			search: Some("  Desk ".to_string()),
			..Default::default()
		};

		let sql = render(&filter);

		assert!(sql.contains("\"post\".\"title\" ILIKE"));
		assert!(sql.contains("\"post\".\"content\" ILIKE"));
		assert!(sql.contains("\"comment\".\"content\" ILIKE"));
		assert!(sql.contains("%Desk%"));
	}

	#[test]
	fn blank_search_is_ignored() {
		let filter =
			PostFilter { search: Some("   ".to_string()), ..Default::default() };

		assert!(filter.search_text().is_none());
		assert!(!render(&filter).contains("ILIKE"));
	}

	#[test]
	fn proximity_requires_all_parts() {
		let partial = PostFilter {
			lat: Some(1.0),
			lng: Some(2.0),
			..Default::default()
		};

		assert!(partial.validate().is_err());
		assert!(partial.proximity().is_none());

		let full = PostFilter { radius: Some(5.0), ..partial };

		assert!(full.validate().is_ok());
		assert!(render(&full).contains("\"location\".\"latitude\""));
	}

	#[test]
	fn negative_radius_is_rejected() {
		let filter = PostFilter {
			lat: Some(1.0),
			lng: Some(2.0),
			radius: Some(-1.0),
			..Default::default()
		};

		assert!(filter.validate().is_err());
	}
}
