/// API route modules
pub mod auth;
pub mod books;
pub mod health;
pub mod users;

use crate::{middleware, state::AppState};
use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::path::PathBuf;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Router knobs that do not belong in [`AppState`]
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub max_body_bytes: usize,
    /// Serve this directory under `/images` (local image store)
    pub images_dir: Option<PathBuf>,
}

/// Build the full application router
pub fn router(app_state: AppState, options: &RouterOptions) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/user", get(books::list_user_books))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        // Profile
        .route(
            "/users/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route("/users/profile/image", put(users::update_profile_image))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth_middleware,
        ));

    let mut app = Router::new().nest("/api", public_routes.merge(protected_routes));

    if let Some(dir) = &options.images_dir {
        app = app.nest_service("/images", ServeDir::new(dir));
    }

    app.layer(DefaultBodyLimit::max(options.max_body_bytes))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
