use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown_category")]
	UnknownCategory(Uuid),
	#[error("invalid_search")]
	InvalidSearch(#[from] crate::route::model::SearchError),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", get_with(get_categories, get_categories_docs))
		.api_route("/:id", get_with(get_category, get_category_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownCategory(..) => StatusCode::NOT_FOUND,
			Self::InvalidSearch(..) => StatusCode::BAD_REQUEST,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		let message = error::Message::new(self.to_string());

		match self {
			Self::UnknownCategory(category) => message.detail("category", category.to_string()),
			Self::InvalidSearch(error) => message.field("search").detail("reason", error.to_string()),
		}
		.into_vec()
	}
}
