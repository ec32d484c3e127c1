//! OpenAPI document: one schema per entity plus generated paths for every route group.

use crate::entities::{self, *};
use crate::error::{ErrorBody, ErrorDetail};
use crate::model::{ColumnType, TableInfo};
use utoipa::openapi::path::{HttpMethod, OperationBuilder, ParameterBuilder, ParameterIn, PathItemBuilder};
use utoipa::openapi::request_body::RequestBodyBuilder;
use utoipa::openapi::schema::{ArrayBuilder, ObjectBuilder, Ref, Schema, Type};
use utoipa::openapi::{Content, ContentBuilder, Required, Response, ResponseBuilder};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "liftops",
        description = "CRUD API for building and elevator maintenance records"
    ),
    components(schemas(
        SchemaMigration,
        ArInternalMetadata,
        AdminUser,
        User,
        Address,
        Customer,
        Building,
        BuildingDetail,
        Battery,
        Column,
        Elevator,
        Employee,
        Intervention,
        Lead,
        Quote,
        BlazerQuery,
        BlazerDashboard,
        BlazerDashboardQuery,
        BlazerCheck,
        BlazerAudit,
        ActiveStorageBlob,
        ActiveStorageAttachment,
        ErrorBody,
        ErrorDetail
    )),
    modifiers(&EntityPaths)
)]
pub struct ApiDoc;

/// Adds `/api/v1/{table}`, `/api/v1/{table}/bulk` and `/api/v1/{table}/{key}` for every table.
struct EntityPaths;

impl Modify for EntityPaths {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        for table in entities::TABLES {
            let base = format!("/api/v1/{}", table.name);
            openapi.paths.paths.insert(base.clone(), collection_item(table));
            openapi.paths.paths.insert(format!("{}/bulk", base), bulk_item(table));
            openapi
                .paths
                .paths
                .insert(format!("{}/{{{}}}", base, table.primary_key), member_item(table));
        }
    }
}

fn json(schema: Schema) -> Content {
    ContentBuilder::new().schema(Some(schema)).build()
}

fn entity_ref(table: &TableInfo) -> Ref {
    Ref::from_schema_name(table.schema)
}

fn scalar(ty: Type) -> Schema {
    Schema::Object(ObjectBuilder::new().schema_type(ty).build())
}

fn one(table: &TableInfo) -> Schema {
    Schema::Object(
        ObjectBuilder::new()
            .property("data", entity_ref(table))
            .required("data")
            .build(),
    )
}

fn many(table: &TableInfo) -> Schema {
    let meta = ObjectBuilder::new()
        .property("count", scalar(Type::Integer))
        .required("count")
        .build();
    Schema::Object(
        ObjectBuilder::new()
            .property("data", Schema::Array(ArrayBuilder::new().items(entity_ref(table)).build()))
            .property("meta", Schema::Object(meta))
            .required("data")
            .required("meta")
            .build(),
    )
}

fn ok(description: &str, schema: Schema) -> Response {
    ResponseBuilder::new()
        .description(description)
        .content("application/json", json(schema))
        .build()
}

fn error(description: &str) -> Response {
    ResponseBuilder::new()
        .description(description)
        .content(
            "application/json",
            ContentBuilder::new()
                .schema(Some(Ref::from_schema_name("ErrorBody")))
                .build(),
        )
        .build()
}

/// Any object; unknown keys are ignored and a generated key is assigned by storage.
fn entity_body() -> Schema {
    Schema::Object(ObjectBuilder::new().build())
}

fn body(schema: Schema) -> utoipa::openapi::request_body::RequestBody {
    RequestBodyBuilder::new()
        .content("application/json", json(schema))
        .required(Some(Required::True))
        .build()
}

fn key_type(table: &TableInfo) -> Type {
    match table.key_column().map(|c| c.column_type) {
        Some(ColumnType::Integer | ColumnType::BigInt) => Type::Integer,
        _ => Type::String,
    }
}

fn operation(table: &TableInfo, id: &str, summary: String) -> OperationBuilder {
    OperationBuilder::new()
        .tags(Some(vec![table.name.to_string()]))
        .operation_id(Some(format!("{}_{}", id, table.name)))
        .summary(Some(summary))
}

fn collection_item(table: &TableInfo) -> utoipa::openapi::PathItem {
    let mut list = operation(table, "list", format!("List {}", table.name))
        .response("200", ok("Matching rows in key order", many(table)))
        .response("400", error("Malformed filter or paging value"));
    for param in ["limit", "offset"] {
        list = list.parameter(
            ParameterBuilder::new()
                .name(param)
                .parameter_in(ParameterIn::Query)
                .required(Required::False)
                .schema(Some(scalar(Type::Integer))),
        );
    }
    for column in table.columns {
        list = list.parameter(
            ParameterBuilder::new()
                .name(column.name)
                .parameter_in(ParameterIn::Query)
                .required(Required::False)
                .description(Some("Exact match"))
                .schema(Some(scalar(match column.column_type {
                    ColumnType::Integer | ColumnType::BigInt => Type::Integer,
                    ColumnType::Double => Type::Number,
                    _ => Type::String,
                }))),
        );
    }

    let create = operation(table, "create", format!("Create one {} row", table.name))
        .request_body(Some(body(entity_body())))
        .response("201", ok("Created", one(table)))
        .response("409", error("Duplicate key"))
        .response("422", error("Missing or invalid field"));

    PathItemBuilder::new()
        .operation(HttpMethod::Get, list)
        .operation(HttpMethod::Post, create)
        .build()
}

fn bulk_item(table: &TableInfo) -> utoipa::openapi::PathItem {
    let items = Schema::Array(
        ArrayBuilder::new()
            .items(ObjectBuilder::new().build())
            .max_items(Some(crate::service::BULK_LIMIT))
            .build(),
    );
    let bulk = operation(table, "bulk_create", format!("Create several {} rows at once", table.name))
        .request_body(Some(body(items)))
        .response("201", ok("Created, all or none", many(table)))
        .response("400", error("Too many items"))
        .response("422", error("Missing or invalid field"));
    PathItemBuilder::new().operation(HttpMethod::Post, bulk).build()
}

fn member_item(table: &TableInfo) -> utoipa::openapi::PathItem {
    let key = || {
        ParameterBuilder::new()
            .name(table.primary_key)
            .parameter_in(ParameterIn::Path)
            .required(Required::True)
            .schema(Some(scalar(key_type(table))))
    };
    let read = operation(table, "read", format!("Read one {} row", table.name))
        .parameter(key())
        .response("200", ok("Found", one(table)))
        .response("404", error("No row with this key"));
    let update = |id: &str| {
        operation(table, id, format!("Update one {} row", table.name))
            .parameter(key())
            .request_body(Some(body(entity_body())))
            .response("200", ok("Updated", one(table)))
            .response("400", error("Key in body differs from path"))
            .response("404", error("No row with this key"))
            .response("422", error("Missing or invalid field"))
    };
    let delete = operation(table, "delete", format!("Delete one {} row", table.name))
        .parameter(key())
        .response("204", ResponseBuilder::new().description("Deleted").build())
        .response("404", error("No row with this key"));
    PathItemBuilder::new()
        .operation(HttpMethod::Get, read)
        .operation(HttpMethod::Put, update("replace"))
        .operation(HttpMethod::Patch, update("update"))
        .operation(HttpMethod::Delete, delete)
        .build()
}
