//! Router assembly: common routes, entity routes, docs.

mod common;
mod docs;
mod entity;

pub use common::common_routes;
pub use docs::docs_routes;
pub use entity::entity_routes;
