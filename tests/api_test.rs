//! HTTP shell tests: health/version routes and the degraded-mode
//! behavior of data routes when no database pool is configured.

use actix_web::{http::StatusCode, test, web, App};

use tracker_api::app_state::AppState;
use tracker_api::config::ServiceConfig;
use tracker_api::http::routes;

fn state_without_db() -> web::Data<AppState> {
    web::Data::new(AppState::new(ServiceConfig::default(), None))
}

#[actix_rt::test]
async fn healthz_answers_ok() {
    let app = test::init_service(
        App::new()
            .app_data(state_without_db())
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/healthz").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}

#[actix_rt::test]
async fn version_reports_the_service() {
    let app = test::init_service(
        App::new()
            .app_data(state_without_db())
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/version").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["name"], "tracker-api");
    assert!(body["version"].is_string());
}

#[actix_rt::test]
async fn readyz_reports_postgres_disabled() {
    let app = test::init_service(
        App::new()
            .app_data(state_without_db())
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/readyz").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["ready"], true);
    assert_eq!(body["checks"]["postgres"]["enabled"], false);
}

#[actix_rt::test]
async fn data_routes_answer_503_without_a_database() {
    let app = test::init_service(
        App::new()
            .app_data(state_without_db())
            .configure(routes::configure),
    )
    .await;

    for uri in ["/api/devices", "/api/owners"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

#[actix_rt::test]
async fn unparsable_pagination_is_not_a_client_error() {
    let app = test::init_service(
        App::new()
            .app_data(state_without_db())
            .configure(routes::configure),
    )
    .await;

    // a bad limit degrades to "unset"; the request proceeds and only
    // the missing pool turns it away
    let req = test::TestRequest::get()
        .uri("/api/devices?limit=abc&offset=3")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}
