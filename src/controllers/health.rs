use actix_web::{HttpResponse, Responder, web};

use crate::services::health::health_report;
use crate::state::AppState;

// Health check endpoint
pub async fn health_check(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(health_report(data.started_at))
}
