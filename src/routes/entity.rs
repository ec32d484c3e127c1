//! Entity CRUD routes: one route group per table, named after the table.

use crate::entities::*;
use crate::handlers::entity::{bulk_create, create, delete as delete_handler, list, read, update};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

/// `/{table}`, `/{table}/bulk` and `/{table}/:key` for one entity.
fn resource<T: Entity>() -> Router<AppState> {
    let base = format!("/{}", T::name());
    Router::new()
        .route(&base, get(list::<T>).post(create::<T>))
        .route(&format!("{}/bulk", base), post(bulk_create::<T>))
        .route(
            &format!("{}/:key", base),
            get(read::<T>)
                .put(update::<T>)
                .patch(update::<T>)
                .delete(delete_handler::<T>),
        )
}

/// Route groups for every entity, in the order of [`TABLES`].
pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .merge(resource::<SchemaMigration>())
        .merge(resource::<ArInternalMetadata>())
        .merge(resource::<AdminUser>())
        .merge(resource::<User>())
        .merge(resource::<Address>())
        .merge(resource::<Customer>())
        .merge(resource::<Building>())
        .merge(resource::<BuildingDetail>())
        .merge(resource::<Battery>())
        .merge(resource::<Column>())
        .merge(resource::<Elevator>())
        .merge(resource::<Employee>())
        .merge(resource::<Intervention>())
        .merge(resource::<Lead>())
        .merge(resource::<Quote>())
        .merge(resource::<BlazerQuery>())
        .merge(resource::<BlazerDashboard>())
        .merge(resource::<BlazerDashboardQuery>())
        .merge(resource::<BlazerCheck>())
        .merge(resource::<BlazerAudit>())
        .merge(resource::<ActiveStorageBlob>())
        .merge(resource::<ActiveStorageAttachment>())
        .with_state(state)
}
