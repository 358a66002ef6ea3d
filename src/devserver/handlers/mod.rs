pub mod admin;
pub mod auth;
pub mod favorites;
pub mod inquiries;
pub mod notifications;
pub mod pets;

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::json;

use crate::error::ApiError;

pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "success": true, "data": data }))
}

pub fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(json!({ "success": true, "data": data }))
}

pub fn fail(status: u16, code: &str, message: &str) -> HttpResponse {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(json!({
        "success": false,
        "error": { "code": code, "message": message }
    }))
}

pub fn invalid(err: ApiError) -> HttpResponse {
    let message = match err {
        ApiError::Validation(message) => message,
        other => other.to_string(),
    };
    fail(400, "VALIDATION_ERROR", &message)
}

pub fn not_found(what: &str) -> HttpResponse {
    fail(404, "NOT_FOUND", &format!("{} not found", what))
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/auth/register", web::post().to(auth::register))
        .route("/auth/login", web::post().to(auth::login))
        .route("/auth/refresh", web::post().to(auth::refresh))
        .route("/auth/logout", web::post().to(auth::logout))
        .route("/auth/profile", web::get().to(auth::get_profile))
        .route("/auth/profile", web::put().to(auth::update_profile))
        .route("/auth/password", web::put().to(auth::change_password))

        .route("/pets", web::get().to(pets::list_pets))
        .route("/pets", web::post().to(pets::create_pet))
        .route("/pets/{id}", web::get().to(pets::get_pet))
        .route("/pets/{id}", web::put().to(pets::update_pet))
        .route("/pets/{id}", web::delete().to(pets::delete_pet))
        .route("/pets/{id}/images", web::get().to(pets::list_images))
        .route("/pets/{id}/images", web::post().to(pets::upload_image))
        .route("/pets/{id}/images/{image_id}", web::delete().to(pets::delete_image))
        .route("/uploads/{image_id}", web::get().to(pets::download_image))

        .route("/matches/favorites", web::get().to(favorites::list_favorites))
        .route("/matches/favorites", web::post().to(favorites::add_favorite))
        .route("/matches/favorites/{pet_id}", web::delete().to(favorites::remove_favorite))

        .route("/v1/inquiries", web::get().to(inquiries::list_sent))
        .route("/v1/inquiries", web::post().to(inquiries::create_inquiry))
        .route("/v1/inquiries/received", web::get().to(inquiries::list_received))
        .route("/v1/inquiries/{id}", web::get().to(inquiries::get_inquiry))
        .route("/v1/inquiries/{id}/status", web::put().to(inquiries::update_status))
        .route("/v1/inquiries/{id}/reply", web::post().to(inquiries::reply))

        .route("/v1/notifications", web::get().to(notifications::list_notifications))
        .route("/v1/notifications/unread-count", web::get().to(notifications::unread_count))
        .route("/v1/notifications/read-all", web::put().to(notifications::mark_all_read))
        .route("/v1/notifications/{id}/read", web::put().to(notifications::mark_read))
        .route("/v1/notifications/{id}", web::delete().to(notifications::delete_notification))

        .route("/admin/stats", web::get().to(admin::stats))
        .route("/admin/users", web::get().to(admin::list_users))
        .route("/admin/users/{id}/status", web::put().to(admin::set_user_status))
        .route("/admin/users/{id}", web::delete().to(admin::delete_user))
        .route("/admin/pets", web::get().to(admin::list_pets))
        .route("/admin/pets/{id}", web::delete().to(admin::delete_pet));
}
