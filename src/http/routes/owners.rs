/// Owner resource
use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::errors::ApiError;
use crate::query::QueryParams;
use crate::repository::{NewOwner, Owner, Repository, OWNER_SCHEMA};

fn owner_repo(state: &AppState) -> Result<Repository<Owner>, ApiError> {
    let pool = state.require_postgres()?;
    Ok(Repository::new(pool.clone(), &OWNER_SCHEMA))
}

// GET /api/owners
pub async fn list_owners(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let params = QueryParams::from_request(&req)?;
    let repo = owner_repo(&state)?;
    super::list_entities(&repo, &params).await
}

// GET /api/owners/{id}
pub async fn get_owner(
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let repo = owner_repo(&state)?;
    match repo.load(&path.into_inner()).await? {
        Some(owner) => Ok(HttpResponse::Ok().json(owner)),
        None => Err(ApiError::NotFound {
            resource: "owner".to_string(),
        }),
    }
}

// POST /api/owners
pub async fn create_owner(
    body: web::Json<NewOwner>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let repo = owner_repo(&state)?;
    let owner = Owner::create(body.into_inner());
    repo.persist(&owner).await?;
    Ok(HttpResponse::Created().json(owner))
}

// PUT /api/owners/{id}
pub async fn put_owner(
    path: web::Path<Uuid>,
    body: web::Json<NewOwner>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let repo = owner_repo(&state)?;
    let owner = Owner::with_id(path.into_inner(), body.into_inner());
    let stored = repo.merge(&owner).await?;
    Ok(HttpResponse::Ok().json(stored))
}

// DELETE /api/owners/{id}
pub async fn delete_owner(
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let repo = owner_repo(&state)?;
    repo.remove(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
