#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod model;
mod openapi;
mod paginate;
mod route;
mod store;
mod token;
mod trace;


use std::sync::Arc;

use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
	config::Config,
	store::{MemoryStore, PostgresStore, Store},
	token::{JwtVerifier, Verifier},
};

pub type AppState = State;

/// The shared application state.
///
/// Handlers pull out only the parts they need through [`axum::extract::FromRef`].
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub store: Store,
	pub verifier: Verifier,
	pub config: Arc<Config>,
}

#[tokio::main]
async fn main() {
	dotenvy::dotenv().ok();

	let config = Config::from_env().expect("failed to read configuration");
	let _guard =
		trace::init_tracing_subscriber(config.otlp).expect("failed to initialize tracing");

	let store: Store = match &config.database_url {
		Some(url) => Arc::new(
			PostgresStore::connect(url)
				.await
				.expect("failed to connect to database"),
		),
		None => {
			tracing::warn!("DATABASE_URL is not set, documents are kept in memory");

			Arc::new(MemoryStore::new())
		}
	};

	let state = State {
		store,
		verifier: Arc::new(JwtVerifier::new(&config.jwt)),
		config: Arc::new(config),
	};

	let app = route::router(state.clone()).layer(
		ServiceBuilder::new()
			.layer(TraceLayer::new_for_http())
			.layer(CorsLayer::permissive()),
	);

	let network = &state.config.network;
	let listener = tokio::net::TcpListener::bind((network.host.as_str(), network.port))
		.await
		.expect("failed to bind to port");

	tracing::info!(
		protocol = %network.protocol,
		domain = %network.domain,
		url = %network.url,
		"listening on port {}",
		network.port
	);

	axum::serve(listener, app).await.expect("server error");
}
