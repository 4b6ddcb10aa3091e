pub use crate::route::model::{IdInput, Paginate, Search};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{Model, Projection};

/// A label that posts are grouped under.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
	/// The unique identifier of the category.
	pub id: Uuid,
	/// The display label. Matched case-insensitively when posts name new categories.
	pub label: String,
	/// The posts the category was created for.
	pub posts: Vec<Uuid>,
}

impl Model for Category {
	const COLLECTION: &'static str = "categories";
}

/// A category without its post references, as listed and embedded in posts.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
	pub id: Uuid,
	pub label: String,
}

impl CategorySummary {
	pub const PROJECTION: Projection = Projection::Exclude(&["posts"]);
}
