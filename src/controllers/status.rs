use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::models::Provider;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct RefreshResponse {
    message: &'static str,
    timestamp: DateTime<Utc>,
    refreshed: Vec<&'static str>,
}

// Latest entry for every provider
pub async fn get_all_status(data: web::Data<AppState>) -> impl Responder {
    info!("Request for all provider status");
    HttpResponse::Ok().json(data.cache.snapshot().await)
}

// Latest entry for one provider
pub async fn get_provider_status(
    data: web::Data<AppState>,
    provider: web::Path<String>,
) -> impl Responder {
    let key = provider.into_inner();
    info!("Request for provider status: {}", key);

    match key.parse::<Provider>() {
        Ok(provider) => HttpResponse::Ok().json(data.cache.get(provider).await),
        Err(e) => {
            info!("Provider not found: {}", key);
            HttpResponse::NotFound().json(json!({ "error": e }))
        }
    }
}

// Run a refresh cycle and wait for it
pub async fn refresh_now(data: web::Data<AppState>) -> impl Responder {
    info!("Manual refresh requested");
    let report = data.refresher.refresh_all().await;

    HttpResponse::Ok().json(RefreshResponse {
        message: "Refreshed",
        timestamp: report.completed_at,
        refreshed: report.refreshed.iter().map(|p| p.key()).collect(),
    })
}
