//! Operator identity.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identifier of a staff member, as issued by the surrounding application.
pub type UserId = String;

/// Role of the person operating the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	Admin,
	RestaurantOwner,
	Chef,
	/// Any role without kitchen access (waiters, customers, ...).
	#[serde(other)]
	Other,
}

impl Role {
	/// Only admins, restaurant owners and chefs may operate the kitchen board.
	pub fn is_kitchen_staff(&self) -> bool {
		matches!(self, Self::Admin | Self::RestaurantOwner | Self::Chef)
	}
}

impl FromStr for Role {
	type Err = std::convert::Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match s.trim() {
			"admin" => Self::Admin,
			"restaurant_owner" => Self::RestaurantOwner,
			"chef" => Self::Chef,
			_ => Self::Other,
		})
	}
}

/// The person acting on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
	/// Identity used to key filter preferences. Anonymous operators only get
	/// in-memory defaults.
	pub id: Option<UserId>,
	/// Display name recorded on orders they start.
	pub name: Option<String>,
	pub role: Role,
}

impl Operator {
	pub fn new(id: impl Into<UserId>, name: impl Into<String>, role: Role) -> Self {
		Self {
			id: Some(id.into()),
			name: Some(name.into()),
			role,
		}
	}

	pub fn is_kitchen_staff(&self) -> bool {
		self.role.is_kitchen_staff()
	}
}
