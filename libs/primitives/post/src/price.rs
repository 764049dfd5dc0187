use std::fmt;
use std::str::FromStr;

use common::Error;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A non-negative amount with two fraction digits, kept as whole cents
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(i64);

impl Price {
	#[must_use]
	pub const fn from_cents(cents: i64) -> Self { Self(cents) }

	#[must_use]
	pub const fn cents(self) -> i64 { self.0 }
}

impl fmt::Display for Price {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
	}
}

impl FromStr for Price {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let invalid = || Error::ValidationError(format!("invalid price '{s}'"));

		let (whole, frac) = s.trim().split_once('.').unwrap_or((s.trim(), ""));

		if whole.is_empty() && frac.is_empty() {
			return Err(invalid());
		}

		if frac.len() > 2
			|| !whole.bytes().all(|b| b.is_ascii_digit())
			|| !frac.bytes().all(|b| b.is_ascii_digit())
		{
			return Err(invalid());
		}

		let whole: i64 = if whole.is_empty() {
			0
		} else {
			whole.parse().map_err(|_| invalid())?
		};

		let frac: i64 = match frac.len() {
			0 => 0,
			1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
			_ => frac.parse().map_err(|_| invalid())?,
		};

		whole
			.checked_mul(100)
			.and_then(|c| c.checked_add(frac))
			.map(Self)
			.ok_or_else(invalid)
	}
}

impl Serialize for Price {
	fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
		s.collect_str(self)
	}
}

/// Accepts `"12.50"`, `12.5` and `12`
struct PriceVisitor;

impl Visitor<'_> for PriceVisitor {
	type Value = Price;

	fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "a non-negative amount with at most two decimals")
	}

	fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
		v.parse().map_err(E::custom)
	}

	fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
		i64::try_from(v)
			.ok()
			.and_then(|v| v.checked_mul(100))
			.map(Price)
			.ok_or_else(|| E::custom("price out of range"))
	}

	fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
		if v < 0 {
			return Err(E::custom("price must not be negative"));
		}

		v.checked_mul(100)
			.map(Price)
			.ok_or_else(|| E::custom("price out of range"))
	}

	#[allow(clippy::cast_possible_truncation)]
	fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
		if !v.is_finite() || v < 0.0 || v * 100.0 > i64::MAX as f64 {
			return Err(E::custom("price must be a non-negative amount"));
		}

		Ok(Price((v * 100.0).round() as i64))
	}
}

impl<'de> Deserialize<'de> for Price {
	fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
		d.deserialize_any(PriceVisitor)
	}
}
