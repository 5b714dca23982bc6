use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod repository;
pub mod services;

pub use config::Config;
pub use error::{QuizError, QuizResult};
pub use services::AppState;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any);

    Router::new()
        // Public endpoints
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api/v1/auth", auth_routes(app_state.clone()))
        // Protected endpoints (require JWT)
        .nest(
            "/api/v1/quizzes",
            quiz_routes().layer(middleware::from_fn_with_state(
                app_state.clone(),
                middlewares::auth::auth_middleware,
            )),
        )
        .nest(
            "/api/v1/attempts",
            attempt_routes().layer(middleware::from_fn_with_state(
                app_state.clone(),
                middlewares::auth::auth_middleware,
            )),
        )
        .nest(
            "/api/v1/admin",
            admin_routes()
                .layer(middleware::from_fn(
                    middlewares::auth::admin_guard_middleware,
                ))
                .layer(middleware::from_fn_with_state(
                    app_state.clone(),
                    middlewares::auth::auth_middleware,
                )),
        )
        .with_state(app_state)
        .layer(cors)
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(middleware::from_fn(
            middlewares::trace::trace_context_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

fn quiz_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::quizzes::list_quizzes))
        .route("/{id}", get(handlers::quizzes::get_quiz))
}

fn attempt_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::attempts::all_attempts))
        .route("/my", get(handlers::attempts::my_attempts))
        .route(
            "/{id}",
            get(handlers::attempts::get_attempt).post(handlers::attempts::submit_attempt),
        )
}

fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/quizzes", post(handlers::admin::create_quiz))
        .route(
            "/quizzes/{id}",
            put(handlers::admin::update_quiz).delete(handlers::admin::delete_quiz),
        )
        .route("/quizzes/{id}/questions", post(handlers::admin::add_question))
        .route(
            "/questions/{id}",
            put(handlers::admin::update_question).delete(handlers::admin::delete_question),
        )
}

fn auth_routes(app_state: Arc<AppState>) -> Router<Arc<AppState>> {
    let public_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let protected_routes = Router::new()
        .route("/me", get(handlers::auth::get_current_user))
        .route_layer(middleware::from_fn_with_state(
            app_state,
            middlewares::auth::auth_middleware,
        ));

    public_routes.merge(protected_routes)
}
