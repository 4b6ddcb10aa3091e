//! Document storage.
//!
//! Posts, categories and users are kept as JSON documents in named collections.
//! Every document has a UUID `id` field; cross references between collections
//! are by id, never embedded. [`DocumentStore`] is the engine seam, with an
//! in-memory engine and a Postgres engine behind it. Route code talks to the
//! typed [`Collection`] facade instead.

mod memory;
mod postgres;

use std::{marker::PhantomData, sync::Arc};

use regex::{Regex, RegexBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

pub type Store = Arc<dyn DocumentStore>;

/// A failure inside the storage engine. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("migration error: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),
	#[error("malformed document: {0}")]
	Document(#[from] serde_json::Error),
	#[error("document has no id")]
	MissingId,
	/// The engine refused a search pattern that passed validation.
	#[error("pattern rejected by the storage engine: {0}")]
	Pattern(String),
}

/// A predicate over documents. Interpreted by the engine, opaque to everyone else.
#[derive(Debug, Clone)]
pub enum Filter {
	All,
	Id(Uuid),
	IdIn(Vec<Uuid>),
	/// The string at `field` matches a case-insensitive pattern.
	Matches { field: &'static str, pattern: Regex },
	/// The string at `field` equals `value`, ignoring case.
	EqualsIgnoreCase { field: &'static str, value: String },
}

impl Filter {
	/// Builds a [`Filter::Matches`], compiling `pattern` case-insensitively.
	pub fn matches(field: &'static str, pattern: &str) -> Result<Self, regex::Error> {
		let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;

		Ok(Self::Matches { field, pattern })
	}

	pub fn equals_ignore_case(field: &'static str, value: impl Into<String>) -> Self {
		Self::EqualsIgnoreCase {
			field,
			value: value.into(),
		}
	}

	pub fn test(&self, document: &Value) -> bool {
		let string = |field: &str| document.get(field).and_then(Value::as_str);

		match self {
			Self::All => true,
			Self::Id(id) => document_id(document) == Some(*id),
			Self::IdIn(ids) => document_id(document).is_some_and(|id| ids.contains(&id)),
			Self::Matches { field, pattern } => string(*field).is_some_and(|s| pattern.is_match(s)),
			Self::EqualsIgnoreCase { field, value } => {
				string(*field).is_some_and(|s| s.to_lowercase() == value.to_lowercase())
			}
		}
	}
}

/// Which top-level fields of a document are returned. `id` is always kept.
#[derive(Debug, Clone, Copy, Default)]
pub enum Projection {
	#[default]
	All,
	Exclude(&'static [&'static str]),
	Include(&'static [&'static str]),
}

impl Projection {
	pub fn apply(&self, mut document: Value) -> Value {
		let Some(object) = document.as_object_mut() else {
			return document;
		};

		let listed = |fields: &[&str], key: &str| fields.iter().any(|field| *field == key);

		match *self {
			Self::All => {}
			Self::Exclude(fields) => object.retain(|key, _| key == "id" || !listed(fields, key.as_str())),
			Self::Include(fields) => object.retain(|key, _| key == "id" || listed(fields, key.as_str())),
		}

		document
	}
}

#[derive(Debug, Clone, Default)]
pub struct FindQuery {
	pub filter: Filter,
	pub projection: Projection,
	pub skip: u64,
	/// `None` returns every match after `skip`.
	pub limit: Option<u64>,
}

impl Default for Filter {
	fn default() -> Self {
		Self::All
	}
}

#[axum::async_trait]
pub trait DocumentStore: Send + Sync {
	async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, Error>;

	/// Returns matching documents in insertion order, windowed and projected.
	async fn find(&self, collection: &str, query: &FindQuery) -> Result<Vec<Value>, Error>;

	/// Inserts all documents or none of them.
	async fn insert_many(&self, collection: &str, documents: Vec<Value>) -> Result<(), Error>;
}

pub fn document_id(document: &Value) -> Option<Uuid> {
	document
		.get("id")
		.and_then(Value::as_str)
		.and_then(|id| Uuid::parse_str(id).ok())
}

/// A type stored as documents in a named collection.
pub trait Model: Serialize + DeserializeOwned + Send + Sync {
	const COLLECTION: &'static str;
}

/// Typed access to the collection holding `T`.
///
/// Reads may deserialize into a narrower view type when a projection
/// drops some of `T`'s fields.
pub struct Collection<T> {
	store: Store,
	_model: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
	fn clone(&self) -> Self {
		Self {
			store: self.store.clone(),
			_model: PhantomData,
		}
	}
}

impl<T: Model> Collection<T> {
	pub fn new(store: Store) -> Self {
		Self {
			store,
			_model: PhantomData,
		}
	}

	pub async fn count(&self, filter: &Filter) -> Result<u64, Error> {
		self.store.count(T::COLLECTION, filter).await
	}

	pub async fn find<V: DeserializeOwned>(&self, query: &FindQuery) -> Result<Vec<V>, Error> {
		self.store
			.find(T::COLLECTION, query)
			.await?
			.into_iter()
			.map(serde_json::from_value)
			.collect::<Result<_, _>>()
			.map_err(Error::from)
	}

	pub async fn find_one<V: DeserializeOwned>(
		&self,
		filter: Filter,
		projection: Projection,
	) -> Result<Option<V>, Error> {
		let query = FindQuery {
			filter,
			projection,
			skip: 0,
			limit: Some(1),
		};

		Ok(self.find(&query).await?.into_iter().next())
	}

	pub async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, Error> {
		self.find_one(Filter::Id(id), Projection::All).await
	}

	pub async fn insert_one(&self, document: &T) -> Result<(), Error> {
		self.insert_many(std::slice::from_ref(document)).await
	}

	pub async fn insert_many(&self, documents: &[T]) -> Result<(), Error> {
		let documents = documents
			.iter()
			.map(serde_json::to_value)
			.collect::<Result<Vec<_>, _>>()?;

		self.store.insert_many(T::COLLECTION, documents).await
	}
}
