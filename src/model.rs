use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{Model, Projection};

/// A registered user. Owned by the account service; this API only reads it.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	pub id: Uuid,
	pub email: String,
	pub first_name: String,
	pub last_name: String,
	pub gender: Option<String>,
	pub photo_path: Option<String>,
}

impl Model for User {
	const COLLECTION: &'static str = "users";
}

/// The public face of a [`User`], as shown next to their posts.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Author {
	pub id: Uuid,
	pub first_name: String,
	pub last_name: String,
	pub gender: Option<String>,
	pub photo_path: Option<String>,
}

impl Author {
	pub const PROJECTION: Projection =
		Projection::Include(&["firstName", "lastName", "gender", "photoPath"]);
}
