use std::sync::Arc;

use aide::{axum::ApiRouter, openapi::OpenApi};
use axum::{Extension, Router};

use crate::{openapi, AppState};

pub mod category;
pub mod docs;
pub mod model;
pub mod post;

/// Builds the application router, along with its generated `OpenAPI` document.
pub fn router(state: AppState) -> Router {
	aide::gen::extract_schemas(true);

	let mut api = OpenApi::default();

	ApiRouter::new()
		.nest("/posts", post::routes())
		.nest("/categories", category::routes())
		.nest("/docs", docs::routes())
		.finish_api_with(&mut api, openapi::docs)
		.layer(Extension(Arc::new(api)))
		.with_state(state)
}
