/// Route modules

pub mod devices;
pub mod health;
pub mod owners;
pub mod version;

use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::Value;

use crate::errors::ApiError;
use crate::query::{select_fields, QueryParams};
use crate::repository::{Entity, Repository};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/healthz", web::get().to(health::healthz))
        .route("/readyz", web::get().to(health::readyz))
        .route("/version", web::get().to(version::version))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/owners")
                        .route("", web::get().to(owners::list_owners))
                        .route("", web::post().to(owners::create_owner))
                        .route("/{id}", web::get().to(owners::get_owner))
                        .route("/{id}", web::put().to(owners::put_owner))
                        .route("/{id}", web::delete().to(owners::delete_owner)),
                )
                .service(
                    web::scope("/devices")
                        .route("", web::get().to(devices::list_devices))
                        .route("", web::post().to(devices::create_device))
                        .route("/{id}", web::get().to(devices::get_device))
                        .route("/{id}", web::put().to(devices::put_device))
                        .route("/{id}", web::delete().to(devices::delete_device)),
                ),
        );
}

#[derive(Serialize)]
pub struct ListResponse {
    pub items: Vec<Value>,
    pub page: PageInfo,
}

#[derive(Serialize)]
pub struct PageInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    pub total: i64,
}

/// Shared list flow: count the match set, fetch the (possibly paged)
/// rows, apply the field projection to the serialized items.
pub(crate) async fn list_entities<E: Entity>(
    repo: &Repository<E>,
    params: &QueryParams,
) -> Result<HttpResponse, ApiError> {
    let total = repo.count(&params.filter).await?;
    let rows = repo
        .find_with(&params.filter, &params.sort, params.page())
        .await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in &rows {
        let value = serde_json::to_value(row).map_err(|e| ApiError::Internal {
            reason: format!("serialization failed: {e}"),
        })?;
        items.push(select_fields(value, &params.fields));
    }

    Ok(HttpResponse::Ok().json(ListResponse {
        items,
        page: PageInfo {
            offset: params.offset,
            limit: params.limit,
            total,
        },
    }))
}
