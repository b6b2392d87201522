/// Device resource
///
/// List queries accept `offset`/`limit`, `sort` (signed tokens),
/// `fields` projection and ad-hoc equality filters, including dotted
/// paths into the owner (`owner.name=Ada`).
use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::errors::ApiError;
use crate::query::QueryParams;
use crate::repository::{Device, NewDevice, Repository, DEVICE_SCHEMA};

fn device_repo(state: &AppState) -> Result<Repository<Device>, ApiError> {
    let pool = state.require_postgres()?;
    Ok(Repository::new(pool.clone(), &DEVICE_SCHEMA))
}

// GET /api/devices
pub async fn list_devices(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let params = QueryParams::from_request(&req)?;
    let repo = device_repo(&state)?;
    super::list_entities(&repo, &params).await
}

// GET /api/devices/{id}
pub async fn get_device(
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let repo = device_repo(&state)?;
    match repo.load(&path.into_inner()).await? {
        Some(device) => Ok(HttpResponse::Ok().json(device)),
        None => Err(ApiError::NotFound {
            resource: "device".to_string(),
        }),
    }
}

// POST /api/devices
pub async fn create_device(
    body: web::Json<NewDevice>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let repo = device_repo(&state)?;
    let device = Device::create(body.into_inner());
    repo.persist(&device).await?;
    Ok(HttpResponse::Created().json(device))
}

// PUT /api/devices/{id}
pub async fn put_device(
    path: web::Path<Uuid>,
    body: web::Json<NewDevice>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let repo = device_repo(&state)?;
    let device = Device::with_id(path.into_inner(), body.into_inner());
    let stored = repo.merge(&device).await?;
    Ok(HttpResponse::Ok().json(stored))
}

// DELETE /api/devices/{id}
pub async fn delete_device(
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let repo = device_repo(&state)?;
    repo.remove(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
