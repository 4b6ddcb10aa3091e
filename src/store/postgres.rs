use serde_json::Value;
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{document_id, DocumentStore, Error, Filter, FindQuery, Projection};

/// Stores every collection in the single `document` table, one JSONB body per row.
///
/// Regex filters are evaluated by Postgres (`~*`), so patterns follow its
/// POSIX flavour rather than the `regex` crate's. Patterns it refuses come
/// back as [`Error::Pattern`].
#[derive(Debug, Clone)]
pub struct PostgresStore {
	pool: PgPool,
}

impl PostgresStore {
	/// Connects and brings the schema up to date.
	pub async fn connect(url: &str) -> Result<Self, Error> {
		let pool = PgPool::connect(url).await?;

		sqlx::migrate!().run(&pool).await?;

		Ok(Self { pool })
	}
}

/// SQLSTATE `invalid_regular_expression`.
const INVALID_REGEX: &str = "2201B";

/// Separates patterns Postgres refuses from other database failures.
fn query_error(error: sqlx::Error) -> Error {
	match &error {
		sqlx::Error::Database(database) if database.code().as_deref() == Some(INVALID_REGEX) => {
			Error::Pattern(database.message().to_owned())
		}
		_ => error.into(),
	}
}

fn clamp(value: u64) -> i64 {
	i64::try_from(value).unwrap_or(i64::MAX)
}

fn push_filter<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a Filter) {
	match filter {
		Filter::All => {
			builder.push("TRUE");
		}
		Filter::Id(id) => {
			builder.push("id = ").push_bind(*id);
		}
		Filter::IdIn(ids) => {
			builder.push("id = ANY(").push_bind(ids.clone()).push(")");
		}
		Filter::Matches { field, pattern } => {
			builder
				.push("body ->> ")
				.push_bind(*field)
				.push(" ~* ")
				.push_bind(pattern.as_str());
		}
		Filter::EqualsIgnoreCase { field, value } => {
			builder
				.push("lower(body ->> ")
				.push_bind(*field)
				.push(") = lower(")
				.push_bind(value.as_str())
				.push(")");
		}
	}
}

fn push_projection(builder: &mut QueryBuilder<'_, Postgres>, projection: Projection) {
	match projection {
		Projection::All => {
			builder.push("body");
		}
		Projection::Exclude(fields) => {
			let fields = fields.iter().filter(|f| **f != "id").copied().collect::<Vec<_>>();

			builder.push("body - ").push_bind(fields).push("::text[]");
		}
		Projection::Include(fields) => {
			let mut fields = fields.to_vec();
			fields.push("id");

			builder
				.push("COALESCE((SELECT jsonb_object_agg(key, value) FROM jsonb_each(body) WHERE key = ANY(")
				.push_bind(fields)
				.push(")), '{}'::jsonb)");
		}
	}
}

#[axum::async_trait]
impl DocumentStore for PostgresStore {
	async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, Error> {
		let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM document WHERE collection = ");
		builder.push_bind(collection).push(" AND ");
		push_filter(&mut builder, filter);

		let count: i64 = builder
			.build_query_scalar()
			.fetch_one(&self.pool)
			.await
			.map_err(query_error)?;

		Ok(u64::try_from(count).unwrap_or_default())
	}

	async fn find(&self, collection: &str, query: &FindQuery) -> Result<Vec<Value>, Error> {
		let mut builder = QueryBuilder::new("SELECT ");
		push_projection(&mut builder, query.projection);
		builder
			.push(" FROM document WHERE collection = ")
			.push_bind(collection)
			.push(" AND ");
		push_filter(&mut builder, &query.filter);
		builder.push(" ORDER BY seq OFFSET ").push_bind(clamp(query.skip));

		if let Some(limit) = query.limit {
			builder.push(" LIMIT ").push_bind(clamp(limit));
		}

		let rows: Vec<Json<Value>> = builder
			.build_query_scalar()
			.fetch_all(&self.pool)
			.await
			.map_err(query_error)?;

		Ok(rows.into_iter().map(|Json(body)| body).collect())
	}

	async fn insert_many(&self, collection: &str, documents: Vec<Value>) -> Result<(), Error> {
		if documents.is_empty() {
			return Ok(());
		}

		let rows = documents
			.into_iter()
			.map(|body| document_id(&body).map(|id| (id, body)))
			.collect::<Option<Vec<(Uuid, Value)>>>()
			.ok_or(Error::MissingId)?;

		let mut builder = QueryBuilder::new("INSERT INTO document (collection, id, body) ");
		builder.push_values(rows, |mut row, (id, body)| {
			row.push_bind(collection).push_bind(id).push_bind(Json(body));
		});

		builder.build().execute(&self.pool).await?;

		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn where_clause(filter: &Filter) -> String {
		let mut builder = QueryBuilder::<Postgres>::new("");
		push_filter(&mut builder, filter);
		builder.sql().to_owned()
	}

	#[test]
	fn test_filter_sql() {
		assert_eq!(where_clause(&Filter::All), "TRUE");
		assert_eq!(where_clause(&Filter::Id(Uuid::nil())), "id = $1");
		assert_eq!(where_clause(&Filter::IdIn(vec![])), "id = ANY($1)");
		assert_eq!(
			where_clause(&Filter::matches("title", "rust").unwrap()),
			"body ->> $1 ~* $2"
		);
		assert_eq!(
			where_clause(&Filter::equals_ignore_case("label", "Tech")),
			"lower(body ->> $1) = lower($2)"
		);
	}

	#[test]
	fn test_projection_sql() {
		let mut builder = QueryBuilder::<Postgres>::new("SELECT ");
		push_projection(&mut builder, Projection::Exclude(&["categories"]));

		assert_eq!(builder.sql(), "SELECT body - $1::text[]");
	}

	#[derive(Debug, thiserror::Error)]
	#[error("{message}")]
	struct FakeDatabaseError {
		code: &'static str,
		message: &'static str,
	}

	impl sqlx::error::DatabaseError for FakeDatabaseError {
		fn message(&self) -> &str {
			self.message
		}

		fn code(&self) -> Option<std::borrow::Cow<'_, str>> {
			Some(self.code.into())
		}

		fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
			self
		}

		fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
			self
		}

		fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
			self
		}

		fn kind(&self) -> sqlx::error::ErrorKind {
			sqlx::error::ErrorKind::Other
		}
	}

	fn database_error(code: &'static str, message: &'static str) -> sqlx::Error {
		sqlx::Error::Database(Box::new(FakeDatabaseError { code, message }))
	}

	#[test]
	fn test_refused_pattern_is_reported_as_pattern() {
		let error = query_error(database_error(
			INVALID_REGEX,
			"invalid regular expression: invalid escape \\ sequence",
		));

		let Error::Pattern(message) = error else {
			panic!("expected a pattern error");
		};

		assert!(message.starts_with("invalid regular expression"));
	}

	#[test]
	fn test_other_database_errors_pass_through() {
		let error = query_error(database_error("42P01", "relation does not exist"));

		assert!(matches!(error, Error::Database(..)));
		assert!(matches!(query_error(sqlx::Error::PoolTimedOut), Error::Database(..)));
	}
}
