mod auth;
mod error;
mod extract;
mod handler;
mod request;
mod response;
mod wrapper;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{middleware, Extension, Router};
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use handler::ApiDoc;

use crate::auth::SessionStore;
use crate::config::RentalPolicy;

/// 组装全部接口路由，是否需要登录由各接口的 CurrentUser 参数决定
pub fn router(db: Arc<DatabaseConnection>, sessions: SessionStore, policy: Arc<RentalPolicy>) -> Router {
    Router::new()
        .route("/api/auth/register", post(handler::register))
        .route("/api/auth/login", post(handler::login))
        .route("/api/auth/logout", post(handler::logout))
        .route("/api/auth/me", get(handler::me))
        .route("/api/cars", get(handler::get_cars).post(handler::create_car))
        .route("/api/cars/available", get(handler::get_available_cars))
        .route("/api/cars/occupancy", get(handler::get_occupancy))
        .route(
            "/api/cars/{id}",
            get(handler::get_car).put(handler::update_car).delete(handler::delete_car),
        )
        .route("/api/cars/{id}/price", get(handler::get_car_price))
        .route("/api/cars/{id}/financial-report", get(handler::get_financial_report))
        .route(
            "/api/car-types",
            get(handler::get_car_types).post(handler::create_car_type),
        )
        .route(
            "/api/car-types/{id}",
            put(handler::update_car_type).delete(handler::delete_car_type),
        )
        .route("/api/rentals", get(handler::get_rentals).post(handler::create_rental))
        .route("/api/rentals/{id}", get(handler::get_rental))
        .route("/api/rentals/{id}/complete", post(handler::complete_rental))
        .route("/api/rentals/{id}/cancel", post(handler::cancel_rental))
        .route("/api/clients", get(handler::get_clients))
        .route("/api/clients/me", put(handler::update_my_profile))
        .route(
            "/api/clients/{id}",
            get(handler::get_client)
                .put(handler::update_client)
                .delete(handler::delete_client),
        )
        .route("/api/statistics/dashboard", get(handler::get_dashboard))
        .route("/api/statistics/revenue", get(handler::get_revenue))
        .route("/api/statistics/rentals", get(handler::get_rental_statistics))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(auth::auth))
        .layer(Extension(db))
        .layer(Extension(sessions))
        .layer(Extension(policy))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
