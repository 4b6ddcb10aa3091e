use std::sync::Arc;

use axum::extract::State;
use macros::route;

use crate::{
	config::Config,
	extract::{Json, OptionalAuth, Path, Query, RequiredAuth},
	model::{Author, User},
	openapi::tag,
	paginate::{self, FindOptions, Page},
	route::category::model::{Category, CategorySummary},
	store::{Collection, Filter, FindQuery, Store},
};

use super::{create, model, Error, RouteError};

/// Get all posts
/// Returns a paginated response of posts whose title matches the search, oldest first.
#[route(tag = tag::POST)]
pub async fn get_posts(
	State(store): State<Store>,
	Query(paginate): Query<model::Paginate>,
	Query(search): Query<model::Search>,
) -> Result<Json<Page<model::PostSummary>>, RouteError> {
	let options = FindOptions {
		filter: search.filter("title").map_err(Error::InvalidSearch)?,
		projection: model::PostSummary::PROJECTION,
	};

	let page = paginate::find(
		&Collection::<model::Post>::new(store),
		paginate.page,
		paginate.limit,
		options,
	)
	.await?;

	Ok(Json(page))
}

/// Get single post
/// Returns a single post by its unique id, with its author and categories filled in.
#[route(tag = tag::POST, response(status = 404, description = "The post does not exist"))]
pub async fn get_post(
	State(store): State<Store>,
	OptionalAuth(auth): OptionalAuth,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::PostDetail>, RouteError> {
	let post = Collection::<model::Post>::new(store.clone())
		.find_by_id(path.id)
		.await?
		.ok_or(Error::UnknownPost(path.id))?;

	tracing::debug!(
		post = %post.id,
		viewer = ?auth.payload().map(|payload| payload.user_id),
		"viewing post"
	);

	let users = Collection::<User>::new(store.clone());
	let categories = Collection::<Category>::new(store);
	let query = FindQuery {
		filter: Filter::IdIn(post.categories.clone()),
		projection: CategorySummary::PROJECTION,
		..Default::default()
	};

	let (author, categories) = tokio::try_join!(
		users.find_one::<Author>(Filter::Id(post.author), Author::PROJECTION),
		categories.find::<CategorySummary>(&query),
	)?;

	Ok(Json(model::PostDetail::new(post, author, categories)))
}

/// Create post
/// Creates a new post, along with any categories it introduces by label.
#[route(
	tag = tag::POST,
	response(status = 401, description = "The access token is missing or not valid")
)]
pub async fn create_post(
	State(store): State<Store>,
	State(config): State<Arc<Config>>,
	auth: RequiredAuth,
	Json(input): Json<model::CreatePostInput>,
) -> Result<Json<model::Post>, RouteError> {
	let post = create::create_post(&store, &config.photos, auth.payload.user_id, input).await?;

	Ok(Json(post))
}

#[cfg(test)]
mod test {
	use std::sync::Arc;

	use chrono::Utc;

	use crate::{
		model::User,
		route::{category::model::Category, post::model::Post},
		store::Collection,
		test::*,
		token::Role,
	};

	async fn seed_posts(state: &AppState, author: Uuid, count: usize) -> Vec<Post> {
		let posts = (0..count)
			.map(|i| Post {
				id: Uuid::new_v4(),
				title: format!("Post number {i}"),
				content: "Lorem ipsum".into(),
				photo_path: None,
				author,
				categories: Vec::new(),
				created_at: Utc::now(),
			})
			.collect::<Vec<_>>();

		Collection::<Post>::new(state.store.clone())
			.insert_many(&posts)
			.await
			.unwrap();

		posts
	}

	#[tokio::test]
	async fn test_list_posts_first_page() {
		let state = state();
		seed_posts(&state, Uuid::new_v4(), 12).await;
		let app = server(state);

		let response = app
			.get("/posts")
			.add_query_params(json!({ "page": 1, "limit": 5, "search": "" }))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let body = response.json::<Value>();

		assert_eq!(body["items"].as_array().unwrap().len(), 5);
		assert_eq!(body["page"], 1);
		assert_eq!(body["limit"], 5);
		assert_eq!(body["totalCount"], 12);
		assert_eq!(body["totalPages"], 3);
		assert!(body["items"][0].get("categories").is_none());
	}

	#[tokio::test]
	async fn test_list_posts_defaults_and_search() {
		let state = state();
		seed_posts(&state, Uuid::new_v4(), 12).await;
		let app = server(state);

		let body = app
			.get("/posts")
			.add_query_param("search", "NUMBER%201")
			.await
			.json::<Value>();

		// "number 1", "number 10" and "number 11"
		assert_eq!(body["totalCount"], 3);
		assert_eq!(body["limit"], 5);
		assert_eq!(body["items"][0]["title"], "Post number 1");
	}

	#[tokio::test]
	async fn test_list_posts_rejects_zero_page() {
		let app = server(state());

		let response = app.get("/posts").add_query_param("page", 0).await;

		assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(response.json::<Value>()["errors"][0]["field"], "page");
	}

	#[tokio::test]
	async fn test_get_post_populates_references() {
		let state = state();
		let author = User {
			id: Uuid::new_v4(),
			email: "ada@example.com".into(),
			first_name: "Ada".into(),
			last_name: "Lovelace".into(),
			gender: None,
			photo_path: None,
		};
		let category = Category {
			id: Uuid::new_v4(),
			label: "Math".into(),
			posts: Vec::new(),
		};

		Collection::<User>::new(state.store.clone())
			.insert_one(&author)
			.await
			.unwrap();
		Collection::<Category>::new(state.store.clone())
			.insert_one(&category)
			.await
			.unwrap();

		let mut post = seed_posts(&state, author.id, 1).await.remove(0);
		post.id = Uuid::new_v4();
		post.categories = vec![category.id];

		Collection::<Post>::new(state.store.clone())
			.insert_one(&post)
			.await
			.unwrap();

		let app = server(state);
		let body = app.get(&format!("/posts/{}", post.id)).await.json::<Value>();

		assert_eq!(body["author"]["firstName"], "Ada");
		assert!(body["author"].get("email").is_none());
		assert_eq!(body["categories"], json!([{ "id": category.id, "label": "Math" }]));
	}

	#[tokio::test]
	async fn test_get_post_accepts_optional_token() {
		let state = state();
		let post = seed_posts(&state, Uuid::new_v4(), 1).await.remove(0);
		let app = server(state);

		let anonymous = app.get(&format!("/posts/{}", post.id)).await;
		let signed_in = app
			.get(&format!("/posts/{}", post.id))
			.add_header(header::AUTHORIZATION, bearer(&sign(Uuid::new_v4(), Role::User)))
			.await;
		let bad_token = app
			.get(&format!("/posts/{}", post.id))
			.add_header(header::AUTHORIZATION, bearer("nope"))
			.await;

		assert_eq!(anonymous.status_code(), StatusCode::OK);
		assert_eq!(anonymous.json::<Value>()["author"], Value::Null);
		assert_eq!(signed_in.status_code(), StatusCode::OK);
		assert_eq!(bad_token.status_code(), StatusCode::UNAUTHORIZED);
	}

	#[tokio::test]
	async fn test_unknown_post() {
		let app = server(state());
		let id = Uuid::new_v4();

		let response = app.get(&format!("/posts/{id}")).await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
		assert_eq!(
			response.json::<Value>(),
			json!({
				"success": false,
				"errors": [{ "content": "unknown_post", "details": { "post": id.to_string() } }],
			})
		);
	}

	#[tokio::test]
	async fn test_create_post_requires_token() {
		let app = server(state());

		let response = app
			.post("/posts")
			.json(&json!({ "title": "Hello", "content": "World" }))
			.await;

		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

		let content = response.json::<Value>()["errors"][0]["content"].clone();

		assert!(content.as_str().unwrap().contains("required"));
	}

	#[tokio::test]
	async fn test_create_post_rejects_bad_token() {
		let app = server(state());

		let response = app
			.post("/posts")
			.add_header(header::AUTHORIZATION, bearer("definitely.not.valid"))
			.json(&json!({ "title": "Hello", "content": "World" }))
			.await;

		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

		let content = response.json::<Value>()["errors"][0]["content"].clone();

		assert!(content.as_str().unwrap().contains("not valid"));
	}

	#[tokio::test]
	async fn test_create_post_reconciles_categories() {
		let state = state();
		let existing = Category {
			id: Uuid::new_v4(),
			label: "News".into(),
			posts: Vec::new(),
		};

		Collection::<Category>::new(state.store.clone())
			.insert_one(&existing)
			.await
			.unwrap();

		let app = server(state.clone());
		let user_id = Uuid::new_v4();

		let response = app
			.post("/posts")
			.add_header(header::AUTHORIZATION, bearer(&sign(user_id, Role::User)))
			.json(&json!({
				"title": "Hello",
				"content": "World",
				"photo": "hello.png",
				"categories": [existing.id],
				"newCategories": ["Tech", "tech"],
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let post = response.json::<Post>();
		let created = Collection::<Category>::new(state.store.clone())
			.count(&crate::store::Filter::equals_ignore_case("label", "tech"))
			.await
			.unwrap();

		assert_eq!(post.author, user_id);
		assert_eq!(post.categories.len(), 2);
		assert_eq!(post.categories[0], existing.id);
		assert_eq!(created, 1);
		assert_eq!(
			post.photo_path.as_deref(),
			Some("http://localhost:5000/photos/posts/hello.png")
		);
	}

	#[tokio::test]
	async fn test_create_post_validates_input() {
		let app = server(state());

		let response = app
			.post("/posts")
			.add_header(header::AUTHORIZATION, bearer(&sign(Uuid::new_v4(), Role::User)))
			.json(&json!({ "title": "Hi", "content": "World" }))
			.await;

		assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(response.json::<Value>()["errors"][0]["field"], "title");
	}

	#[tokio::test]
	async fn test_create_post_survives_failed_lookup() {
		let state = state_with(Arc::new(FlakyStore::failing(&["Rust"])));
		let app = server(state.clone());

		let response = app
			.post("/posts")
			.add_header(header::AUTHORIZATION, bearer(&sign(Uuid::new_v4(), Role::User)))
			.json(&json!({
				"title": "Hello",
				"content": "World",
				"newCategories": ["Rust", "Go"],
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert_eq!(response.json::<Post>().categories.len(), 2);
		assert_eq!(
			Collection::<Category>::new(state.store)
				.count(&crate::store::Filter::All)
				.await
				.unwrap(),
			2
		);
	}
}
