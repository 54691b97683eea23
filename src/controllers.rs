pub mod health;
pub mod status;

use actix_cors::Cors;
use actix_web::web;

/// Mount every `/api` route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .route("/status", web::get().to(status::get_all_status))
            .route("/status/{provider}", web::get().to(status::get_provider_status))
            .route("/refresh", web::post().to(status::refresh_now)),
    );
}

/// Cross-origin policy for browser clients served from another origin.
pub fn cors(allowed_origin: Option<&str>) -> Cors {
    match allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allowed_methods(vec!["GET", "POST"])
            .allow_any_header()
            .max_age(3600),
        None => Cors::permissive(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::refresh::Refresher;
    use crate::state::{AppState, StatusCache};
    use actix_web::http::{Method, StatusCode, header};
    use actix_web::{App, test};
    use std::sync::Arc;

    fn app_state() -> web::Data<AppState> {
        let cache = Arc::new(StatusCache::new());
        let refresher = Arc::new(Refresher::new(Vec::new(), Arc::clone(&cache)));
        web::Data::new(AppState::new(cache, refresher))
    }

    #[actix_web::test]
    async fn test_any_origin_by_default() {
        let app = test::init_service(
            App::new()
                .app_data(app_state())
                .wrap(cors(None))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/status")
            .insert_header((header::ORIGIN, "http://localhost:3000"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:3000"
        );
    }

    #[actix_web::test]
    async fn test_preflight_for_configured_origin() {
        let app = test::init_service(
            App::new()
                .app_data(app_state())
                .wrap(cors(Some("https://status.example.com")))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/api/refresh")
            .insert_header((header::ORIGIN, "https://status.example.com"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://status.example.com"
        );
    }
}
