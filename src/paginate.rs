use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::store::{self, Collection, Filter, FindQuery, Model, Projection};

/// One offset-based slice of a result set, with the counts needed to render a pager.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
	pub items: Vec<T>,
	/// The page number (1-indexed).
	pub page: u64,
	/// The maximum number of items per page.
	pub limit: u64,
	/// The number of items matching the filter, across all pages.
	pub total_count: u64,
	pub total_pages: u64,
}

#[derive(Debug, Default)]
pub struct FindOptions {
	pub filter: Filter,
	pub projection: Projection,
}

/// Fetches page `page` of `limit` items from `collection`, in natural order.
///
/// `page` and `limit` must both be at least 1; callers validate them before
/// getting here. Storage failures are returned as-is.
///
/// # Panics
///
/// Panics if `limit` is 0.
pub async fn find<T, V>(
	collection: &Collection<T>,
	page: u64,
	limit: u64,
	options: FindOptions,
) -> Result<Page<V>, store::Error>
where
	T: Model,
	V: DeserializeOwned,
{
	let query = FindQuery {
		skip: page.saturating_sub(1).saturating_mul(limit),
		limit: Some(limit),
		filter: options.filter,
		projection: options.projection,
	};

	let (total_count, items) =
		tokio::try_join!(collection.count(&query.filter), collection.find(&query))?;

	Ok(Page {
		items,
		page,
		limit,
		total_count,
		total_pages: total_count.div_ceil(limit),
	})
}

#[cfg(test)]
mod test {
	use std::sync::Arc;

	use serde::{Deserialize, Serialize};
	use uuid::Uuid;

	use super::*;
	use crate::store::MemoryStore;

	#[derive(Debug, Serialize, Deserialize)]
	struct Note {
		id: Uuid,
		title: String,
	}

	impl Model for Note {
		const COLLECTION: &'static str = "notes";
	}

	async fn notes(count: usize) -> Collection<Note> {
		let collection = Collection::<Note>::new(Arc::new(MemoryStore::new()));
		let notes = (0..count)
			.map(|i| Note {
				id: Uuid::new_v4(),
				title: format!("note {i}"),
			})
			.collect::<Vec<_>>();

		collection.insert_many(&notes).await.unwrap();
		collection
	}

	#[tokio::test]
	async fn test_first_page() {
		let collection = notes(12).await;
		let page: Page<Note> = find(&collection, 1, 5, FindOptions::default())
			.await
			.unwrap();

		assert_eq!(page.items.len(), 5);
		assert_eq!(page.items[0].title, "note 0");
		assert_eq!(page.total_count, 12);
		assert_eq!(page.total_pages, 3);
	}

	#[tokio::test]
	async fn test_last_page_is_partial() {
		let collection = notes(12).await;
		let page: Page<Note> = find(&collection, 3, 5, FindOptions::default())
			.await
			.unwrap();

		assert_eq!(page.items.len(), 2);
		assert_eq!(page.items[0].title, "note 10");
		assert_eq!(page.page, 3);
	}

	#[tokio::test]
	async fn test_page_past_the_end_is_empty() {
		let collection = notes(3).await;
		let page: Page<Note> = find(&collection, 4, 5, FindOptions::default())
			.await
			.unwrap();

		assert!(page.items.is_empty());
		assert_eq!(page.total_pages, 1);
	}

	#[tokio::test]
	async fn test_page_invariants_hold() {
		for count in [0, 1, 4, 5, 6, 17] {
			let collection = notes(count).await;

			for limit in 1..=7 {
				for number in 1..=4 {
					let page: Page<Note> =
						find(&collection, number, limit, FindOptions::default())
							.await
							.unwrap();

					assert!(page.items.len() as u64 <= limit);
					assert_eq!(page.total_count, count as u64);
					assert_eq!(page.total_pages, (count as u64).div_ceil(limit));
				}
			}
		}
	}

	#[tokio::test]
	async fn test_filter_narrows_count_and_items() {
		let collection = notes(12).await;
		let options = FindOptions {
			filter: Filter::matches("title", "note 1").unwrap(),
			..Default::default()
		};
		let page: Page<Note> = find(&collection, 1, 2, options).await.unwrap();

		// "note 1", "note 10", "note 11"
		assert_eq!(page.total_count, 3);
		assert_eq!(page.total_pages, 2);
		assert_eq!(page.items.len(), 2);
	}
}
