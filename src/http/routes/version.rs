/// Version route
use actix_web::{web, HttpResponse, Responder};

use crate::app_state::AppState;

pub async fn version(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(&state.service_config)
}
