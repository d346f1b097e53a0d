// API routes configuration
// Author: Gabriel Demetrios Lafis

use actix_web::{web, HttpResponse, Responder};

use super::handlers;

/// Configure API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            // Health check
            .route("/health", web::get().to(health_check))

            // Upload sessions
            .service(
                web::scope("/sessions")
                    .route("", web::post().to(handlers::create_session))
                    .route("/{id}", web::get().to(handlers::get_session))
                    .route("/{id}", web::put().to(handlers::replace_session))
                    .route("/{id}", web::delete().to(handlers::delete_session))
                    .route("/{id}/clean", web::post().to(handlers::clean_session))
                    .route("/{id}/chart/options", web::post().to(handlers::chart_options))
                    .route("/{id}/chart", web::post().to(handlers::build_chart))
                    .route("/{id}/chart/svg", web::post().to(handlers::render_chart))
                    .route("/{id}/export/{format}", web::post().to(handlers::export_session))
            )
    );
}

/// Health check handler
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
