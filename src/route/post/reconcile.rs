//! Resolves the categories a new post is filed under.
//!
//! A post names categories in two ways: ids of categories it already knows,
//! and free-text labels. Each label is looked up by case-insensitive equality.
//! Labels nobody has used yet become new categories pointing back at the post.
//!
//! Lookups that fail are treated as "not found", so a flaky store can leave
//! duplicate labels behind. Creation is not idempotent either: running this
//! twice for labels that were not found both times creates them twice.

use std::collections::HashSet;

use futures::future::join_all;
use uuid::Uuid;

use crate::{
	route::category::model::{Category, CategorySummary},
	store::{self, Collection, Filter},
};

/// Outcome of looking up a single label.
enum Lookup<'a> {
	Found(CategorySummary),
	Missing(&'a str),
}

async fn lookup<'a>(categories: &Collection<Category>, label: &'a str) -> Lookup<'a> {
	let result = categories
		.find_one::<CategorySummary>(
			Filter::equals_ignore_case("label", label),
			CategorySummary::PROJECTION,
		)
		.await;

	match result {
		Ok(Some(category)) => Lookup::Found(category),
		Ok(None) => Lookup::Missing(label),
		Err(error) => {
			tracing::warn!(%error, label, "category lookup failed, treating label as new");

			Lookup::Missing(label)
		}
	}
}

/// Returns the final category ids of post `post`, creating categories for
/// `labels` that don't exist yet.
///
/// The result holds `existing` first, then categories found by label, then
/// the ones created here, with every id appearing once. Only the insert of
/// new categories can fail.
pub async fn reconcile(
	categories: &Collection<Category>,
	post: Uuid,
	existing: &[Uuid],
	labels: &[String],
) -> Result<Vec<Uuid>, store::Error> {
	let lookups = join_all(labels.iter().map(|label| lookup(categories, label))).await;

	let mut found = Vec::new();
	let mut missing = Vec::new();

	for lookup in lookups {
		match lookup {
			Lookup::Found(category) => found.push(category),
			Lookup::Missing(label) => missing.push(label),
		}
	}

	let mut seen = found
		.iter()
		.map(|category| category.label.to_lowercase())
		.collect::<HashSet<_>>();

	let created = missing
		.into_iter()
		.filter(|label| seen.insert(label.to_lowercase()))
		.map(|label| Category {
			id: Uuid::new_v4(),
			label: label.to_owned(),
			posts: vec![post],
		})
		.collect::<Vec<_>>();

	if !created.is_empty() {
		categories.insert_many(&created).await?;

		tracing::info!(%post, count = created.len(), "created categories");
	}

	let mut ids = Vec::with_capacity(existing.len() + found.len() + created.len());

	for id in existing
		.iter()
		.copied()
		.chain(found.iter().map(|category| category.id))
		.chain(created.iter().map(|category| category.id))
	{
		if !ids.contains(&id) {
			ids.push(id);
		}
	}

	Ok(ids)
}
