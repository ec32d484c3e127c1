//! liftops: REST backend for building and elevator maintenance records.
//!
//! Entities are typed structs with static table metadata; one generic CRUD layer and one
//! generic set of handlers serve every table through the [`store::Store`] trait.

pub mod entities;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod openapi;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;
pub mod telemetry;

pub use entities::{Action, Entity, Hooks, TABLES};
pub use error::{AppError, ConfigError};
pub use migration::{apply_migrations, schema_sql, MigrationOutcome, SCHEMA_VERSION};
pub use routes::{common_routes, docs_routes, entity_routes};
pub use service::CrudService;
pub use settings::Settings;
pub use state::AppState;
pub use store::{connect, ensure_database_exists, MemoryStore, PgStore, Store};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// The full HTTP surface: common routes, `/api/v1` entity routes and API docs.
///
/// Bodies over `body_limit` bytes are rejected by the JSON extractor with a 413 error envelope.
pub fn app(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .nest("/api/v1", entity_routes(state))
        .merge(docs_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
}
