use schemars::JsonSchema;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::store::Filter;

/// These can be removed when [`serde`] supports
/// literal defaults: <https://github.com/serde-rs/serde/issues/368>
#[inline]
fn one() -> u64 {
	1
}

#[inline]
fn five() -> u64 {
	5
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct Paginate {
	/// The page number to return (1-indexed).
	#[validate(range(min = 1, max = 10_000))]
	#[serde(default = "one")]
	pub page: u64,
	/// The number of items to return per page.
	#[validate(range(min = 1, max = 100))]
	#[serde(default = "five")]
	pub limit: u64,
}

/// A free-text search over a listing.
#[derive(Deserialize, Validate, JsonSchema)]
pub struct Search {
	/// A URL-encoded, case-insensitive regular expression. Empty matches everything.
	///
	/// Patterns are checked with the `regex` crate's syntax, but run by the
	/// storage engine: Postgres uses its POSIX flavour, where `\b` is not a
	/// word boundary. Patterns the engine refuses are rejected as invalid.
	#[serde(default)]
	pub search: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
	#[error("search is not valid UTF-8 once decoded")]
	Encoding(#[from] std::string::FromUtf8Error),
	#[error("search is not a valid pattern: {0}")]
	Pattern(#[from] regex::Error),
}

impl Search {
	/// Builds a filter matching `field` against the decoded search pattern.
	pub fn filter(&self, field: &'static str) -> Result<Filter, SearchError> {
		let pattern = urlencoding::decode(&self.search)?;

		Ok(Filter::matches(field, &pattern)?)
	}
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct IdInput {
	pub id: Uuid,
}
