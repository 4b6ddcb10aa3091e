use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, Path, Query},
	openapi::tag,
	paginate::{self, FindOptions, Page},
	store::{Collection, Store},
};

use super::{model, Error, RouteError};

/// Get categories
/// Returns a paginated response of categories whose label matches the search, oldest first.
#[route(tag = tag::CATEGORY)]
pub async fn get_categories(
	State(store): State<Store>,
	Query(paginate): Query<model::Paginate>,
	Query(search): Query<model::Search>,
) -> Result<Json<Page<model::CategorySummary>>, RouteError> {
	let options = FindOptions {
		filter: search.filter("label").map_err(Error::InvalidSearch)?,
		projection: model::CategorySummary::PROJECTION,
	};

	let page = paginate::find(
		&Collection::<model::Category>::new(store),
		paginate.page,
		paginate.limit,
		options,
	)
	.await?;

	Ok(Json(page))
}

/// Get single category
/// Returns a single category by its unique id, along with the posts it was created for.
#[route(tag = tag::CATEGORY, response(status = 404, description = "The category does not exist"))]
pub async fn get_category(
	State(store): State<Store>,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Category>, RouteError> {
	let category = Collection::<model::Category>::new(store)
		.find_by_id(path.id)
		.await?;

	Ok(Json(category.ok_or(Error::UnknownCategory(path.id))?))
}
