use chrono::Utc;
use uuid::Uuid;

use crate::{
	config::PhotoConfig,
	store::{self, Collection, Store},
};

use super::{
	model::{CreatePostInput, Post},
	reconcile::reconcile,
};

/// Creates a post written by `author`, along with any categories it introduces.
///
/// Categories and the post are two separate writes. If saving the post fails,
/// the categories created for it stay behind.
pub async fn create_post(
	store: &Store,
	photos: &PhotoConfig,
	author: Uuid,
	input: CreatePostInput,
) -> Result<Post, store::Error> {
	let id = Uuid::new_v4();
	let categories = reconcile(
		&Collection::new(store.clone()),
		id,
		&input.categories,
		&input.new_categories,
	)
	.await?;

	let post = Post {
		id,
		title: input.title,
		content: input.content,
		photo_path: input.photo.as_deref().map(|photo| photos.photo_path(photo)),
		author,
		categories,
		created_at: Utc::now(),
	};

	Collection::<Post>::new(store.clone()).insert_one(&post).await?;

	tracing::info!(post = %post.id, %author, "created post");

	Ok(post)
}
