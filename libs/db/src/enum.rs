use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, PartialEq, Eq, Serialize,
)]
#[ExistingTypePath = "crate::sql_types::PostState"]
#[serde(rename_all = "snake_case")]
pub enum PostState {
	#[default]
	Submitted,
	Published,
	Closed,
}

impl PostState {
	/// Whether posts in this state can still be booked
	#[must_use]
	pub fn is_open(self) -> bool { self != Self::Closed }
}

#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, PartialEq, Eq, Serialize,
)]
#[ExistingTypePath = "crate::sql_types::CommentState"]
#[serde(rename_all = "snake_case")]
pub enum CommentState {
	#[default]
	Approved,
	Hidden,
}

#[derive(
	Clone,
	Copy,
	DbEnum,
	Debug,
	Default,
	Deserialize,
	PartialEq,
	Eq,
	Hash,
	Serialize,
)]
#[ExistingTypePath = "crate::sql_types::BookingState"]
#[serde(rename_all = "snake_case")]
pub enum BookingState {
	#[default]
	Proposed,
	Approved,
	Rejected,
	Cancelled,
}

impl BookingState {
	/// States that count towards the overlap invariant of a post
	pub const ACTIVE: [Self; 2] = [Self::Proposed, Self::Approved];

	#[must_use]
	pub fn is_active(self) -> bool { Self::ACTIVE.contains(&self) }

	/// Check whether a booking in this state may move to `next`
	#[must_use]
	pub fn can_transition_to(self, next: Self) -> bool {
		matches!(
			(self, next),
			(Self::Proposed, Self::Approved | Self::Rejected)
				| (
					Self::Proposed | Self::Approved | Self::Rejected,
					Self::Cancelled
				)
		)
	}
}

impl std::fmt::Display for BookingState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let repr = match self {
			Self::Proposed => "proposed",
			Self::Approved => "approved",
			Self::Rejected => "rejected",
			Self::Cancelled => "cancelled",
		};

		write!(f, "{repr}")
	}
}
