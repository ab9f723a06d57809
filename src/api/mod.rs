mod handlers;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;

pub fn create_router(db: Database) -> Router {
    let api = Router::new()
        // Vehicle models (all accept ?view=ids|nested|names)
        .route("/models", get(handlers::list_models))
        .route("/models", post(handlers::create_model))
        .route("/models/{id}", get(handlers::get_model))
        .route("/models/{id}", put(handlers::replace_model))
        .route("/models/{id}", patch(handlers::patch_model))
        .route("/models/{id}", delete(handlers::delete_model))
        // Manufacturers
        .route("/manufacturers", get(handlers::list_manufacturers))
        .route("/manufacturers", post(handlers::create_manufacturer))
        .route("/manufacturers/{id}", get(handlers::get_manufacturer))
        .route("/manufacturers/{id}", delete(handlers::delete_manufacturer))
        // Engines
        .route("/engines", get(handlers::list_engines))
        .route("/engines", post(handlers::create_engine))
        .route("/engines/{id}", get(handlers::get_engine))
        .route("/engines/{id}", delete(handlers::delete_engine))
        // Projects
        .route("/projects", get(handlers::list_projects))
        .route("/projects", post(handlers::create_project))
        .route("/projects/{id}", get(handlers::get_project))
        .route("/projects/{id}", delete(handlers::delete_project))
        // Vehicles
        .route("/vehicles", get(handlers::list_vehicles))
        .route("/vehicles", post(handlers::create_vehicle))
        .route("/vehicles/{id}", get(handlers::get_vehicle))
        .route("/vehicles/{id}", delete(handlers::delete_vehicle))
        // Engineers
        .route("/engineers", get(handlers::list_engineers))
        .route("/engineers", post(handlers::create_engineer))
        .route("/engineers/{id}", get(handlers::get_engineer))
        .route("/engineers/{id}", delete(handlers::delete_engineer))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(db)
}
