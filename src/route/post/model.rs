pub use crate::route::model::{IdInput, Paginate, Search};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
	model::Author,
	route::category::model::CategorySummary,
	store::{Model, Projection},
};

/// A single post, as stored.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
	/// The unique identifier of the post.
	pub id: Uuid,
	pub title: String,
	/// The content of the post in Markdown format.
	pub content: String,
	/// The public URL of the post's photo, if it has one.
	pub photo_path: Option<String>,
	/// The user that created the post.
	pub author: Uuid,
	/// The categories of the post. Never contains duplicates.
	pub categories: Vec<Uuid>,
	pub created_at: DateTime<Utc>,
}

impl Model for Post {
	const COLLECTION: &'static str = "posts";
}

/// A post as shown in listings, without its categories.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
	pub id: Uuid,
	pub title: String,
	pub content: String,
	pub photo_path: Option<String>,
	pub author: Uuid,
	pub created_at: DateTime<Utc>,
}

impl PostSummary {
	pub const PROJECTION: Projection = Projection::Exclude(&["categories"]);
}

/// A post with its author and categories filled in.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
	pub id: Uuid,
	pub title: String,
	pub content: String,
	pub photo_path: Option<String>,
	/// The author of the post. Missing if the user no longer exists.
	pub author: Option<Author>,
	pub categories: Vec<CategorySummary>,
	pub created_at: DateTime<Utc>,
}

impl PostDetail {
	pub fn new(post: Post, author: Option<Author>, categories: Vec<CategorySummary>) -> Self {
		Self {
			id: post.id,
			title: post.title,
			content: post.content,
			photo_path: post.photo_path,
			author,
			categories,
			created_at: post.created_at,
		}
	}
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
	/// The title of the post.
	#[validate(length(min = 3, max = 128))]
	pub title: String,
	/// The content of the post in Markdown format.
	pub content: String,
	/// The filename of an uploaded photo.
	#[validate(length(min = 1, max = 255))]
	pub photo: Option<String>,
	/// Ids of existing categories to attach.
	#[serde(default)]
	pub categories: Vec<Uuid>,
	/// Labels of categories to attach, created if no category has the label yet.
	#[serde(default)]
	#[validate(custom(function = "validate_labels"))]
	pub new_categories: Vec<String>,
}

#[allow(clippy::ptr_arg)]
fn validate_labels(labels: &Vec<String>) -> Result<(), ValidationError> {
	if labels.iter().any(|label| label.trim().is_empty()) {
		return Err(ValidationError::new("blank_label"));
	}

	Ok(())
}
