use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::RwLock;

use super::{document_id, DocumentStore, Error, Filter, FindQuery};

/// Keeps every collection as an insertion-ordered vector behind one lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
	collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[axum::async_trait]
impl DocumentStore for MemoryStore {
	async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, Error> {
		let collections = self.collections.read().await;
		let count = collections
			.get(collection)
			.map_or(0, |documents| documents.iter().filter(|d| filter.test(d)).count());

		Ok(count as u64)
	}

	async fn find(&self, collection: &str, query: &FindQuery) -> Result<Vec<Value>, Error> {
		let collections = self.collections.read().await;
		let Some(documents) = collections.get(collection) else {
			return Ok(Vec::new());
		};

		let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
		let limit = query
			.limit
			.map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));

		Ok(documents
			.iter()
			.filter(|d| query.filter.test(d))
			.skip(skip)
			.take(limit)
			.map(|d| query.projection.apply(d.clone()))
			.collect())
	}

	async fn insert_many(&self, collection: &str, documents: Vec<Value>) -> Result<(), Error> {
		if documents.iter().any(|d| document_id(d).is_none()) {
			return Err(Error::MissingId);
		}

		self.collections
			.write()
			.await
			.entry(collection.to_owned())
			.or_default()
			.extend(documents);

		Ok(())
	}
}

#[cfg(test)]
mod test {
	use serde_json::json;
	use uuid::Uuid;

	use super::*;
	use crate::store::Projection;

	fn document(title: &str) -> Value {
		json!({ "id": Uuid::new_v4(), "title": title, "categories": [] })
	}

	#[tokio::test]
	async fn test_find_keeps_insertion_order() {
		let store = MemoryStore::new();
		let titles = ["first", "second", "third", "fourth"];

		store
			.insert_many("posts", titles.iter().map(|t| document(t)).collect())
			.await
			.unwrap();

		let query = FindQuery {
			skip: 1,
			limit: Some(2),
			projection: Projection::Exclude(&["categories"]),
			..Default::default()
		};
		let found = store.find("posts", &query).await.unwrap();

		assert_eq!(found.len(), 2);
		assert_eq!(found[0]["title"], "second");
		assert_eq!(found[1]["title"], "third");
		assert!(found[0].get("categories").is_none());
	}

	#[tokio::test]
	async fn test_count_applies_filter() {
		let store = MemoryStore::new();

		store
			.insert_many(
				"posts",
				vec![document("Rust"), document("rusty"), document("Go")],
			)
			.await
			.unwrap();

		let filter = Filter::matches("title", "rust").unwrap();

		assert_eq!(store.count("posts", &filter).await.unwrap(), 2);
		assert_eq!(store.count("posts", &Filter::All).await.unwrap(), 3);
		assert_eq!(store.count("missing", &Filter::All).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_insert_rejects_documents_without_id() {
		let store = MemoryStore::new();
		let result = store
			.insert_many("posts", vec![document("ok"), json!({ "title": "no id" })])
			.await;

		assert!(matches!(result, Err(Error::MissingId)));
		assert_eq!(store.count("posts", &Filter::All).await.unwrap(), 0);
	}
}
